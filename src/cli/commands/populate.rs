use std::io::Write;

use anyhow::{Context, Result};
use identity::{PLACEHOLDER_PASSWORD, PhoneRegion, SyntheticUsers, UserStore, create_user, password};
use tracing::{debug, info, trace};

use super::initdb::connect_and_migrate;

/// Generate `total` users and insert them, skipping any that collide with
/// existing rows. Reports and returns the number actually inserted.
pub async fn populate_users(store: &UserStore, total: usize, out: &mut impl Write) -> Result<usize> {
    trace!("Entering populate_users function");
    debug!("Generating {} synthetic users", total);

    // One hash shared by every generated user.
    let placeholder_hash = password::hash_password(PLACEHOLDER_PASSWORD)?;

    let mut generator = SyntheticUsers::new(store.phone_region());
    let users = generator
        .generate(total)
        .into_iter()
        .map(|fields| {
            create_user(fields, store.phone_region())
                .map(|new_user| new_user.with_password_hash(placeholder_hash.clone()))
        })
        .collect::<identity::Result<Vec<_>>>()
        .context("Generated user failed validation")?;

    let created = store.create_many_ignore_conflicts(users).await?;

    info!("Inserted {} of {} synthetic users", created.len(), total);
    writeln!(
        out,
        "Successfully populated the database with {} fake users",
        created.len()
    )?;
    Ok(created.len())
}

pub async fn populate(database_url: &str, total: usize, phone_region: PhoneRegion) -> Result<()> {
    let db = connect_and_migrate(database_url).await?;
    let store = UserStore::new(db, phone_region);
    populate_users(&store, total, &mut std::io::stdout()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::setup_test_db;
    use identity::Credentials;
    use model::entities::prelude::*;
    use sea_orm::{EntityTrait, PaginatorTrait};
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_populates_exactly_total_users_with_profiles() {
        let store = UserStore::new(setup_test_db().await, PhoneRegion::In);
        let mut out = Vec::new();

        let inserted = populate_users(&store, 25, &mut out).await.unwrap();

        assert_eq!(inserted, 25);
        let users = User::find().all(store.connection()).await.unwrap();
        assert_eq!(users.len(), 25);
        let usernames: HashSet<_> = users.iter().map(|u| u.username.clone()).collect();
        assert_eq!(usernames.len(), 25);
        assert_eq!(Profile::find().count(store.connection()).await.unwrap(), 25);

        assert!(users.iter().all(|u| !u.is_staff && !u.is_superuser));
        assert!(users[0].check_password(PLACEHOLDER_PASSWORD));

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Successfully populated the database with 25 fake users\n"
        );
    }

    #[tokio::test]
    async fn test_zero_users_is_a_noop() {
        let store = UserStore::new(setup_test_db().await, PhoneRegion::Us);
        let mut out = Vec::new();

        assert_eq!(populate_users(&store, 0, &mut out).await.unwrap(), 0);
        assert_eq!(User::find().count(store.connection()).await.unwrap(), 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Successfully populated the database with 0 fake users\n"
        );
    }

    #[tokio::test]
    async fn test_large_run_spans_several_statements() {
        let store = UserStore::new(setup_test_db().await, PhoneRegion::Gb);
        let total = identity::store::INSERT_BATCH_SIZE + 7;

        let inserted = populate_users(&store, total, &mut Vec::new()).await.unwrap();

        assert_eq!(inserted, total);
        assert_eq!(Profile::find().count(store.connection()).await.unwrap() as usize, total);
    }
}
