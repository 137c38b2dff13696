use anyhow::{Context, Result};
use chrono::NaiveDate;
use identity::{PhoneRegion, UserFields, UserStore};
use model::entities::user;
use tracing::{info, trace};

use super::initdb::connect_and_migrate;

/// Command-line input for a new superuser.
#[derive(Clone)]
pub struct SuperuserArgs {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub password: Option<String>,
}

impl From<SuperuserArgs> for UserFields {
    fn from(args: SuperuserArgs) -> Self {
        Self {
            email: args.email,
            username: args.username,
            full_name: args.full_name,
            phone_number: args.phone_number,
            date_of_birth: args.date_of_birth,
            password: args.password,
        }
    }
}

pub async fn create_superuser_in(store: &UserStore, args: SuperuserArgs) -> Result<user::Model> {
    trace!("Entering create_superuser_in function");
    let username = args.username.clone();
    let created = store
        .create_superuser(args.into())
        .await
        .with_context(|| format!("Failed to create superuser '{}'", username))?;

    info!("Superuser '{}' created with ID {}", created.username, created.id);
    Ok(created)
}

pub async fn create_superuser(
    database_url: &str,
    args: SuperuserArgs,
    phone_region: PhoneRegion,
) -> Result<()> {
    let db = connect_and_migrate(database_url).await?;
    let store = UserStore::new(db, phone_region);
    let created = create_superuser_in(&store, args).await?;
    println!("Superuser {} created successfully.", created.username);
    Ok(())
}
