//! Persistence of users.
//!
//! Every insert goes through [`UserStore`], which runs the registered
//! [`OnCreate`] hooks inside the insert's transaction. Updates never fire
//! hooks. Dependent rows are removed by the database's cascade rules when a
//! user is deleted.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use model::entities::{profile, user};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, trace, warn};

use crate::auth::Credentials;
use crate::email::clean_email;
use crate::error::{IdentityError, Result};
use crate::factory::{self, NewUser, UserFields, clean_full_name, clean_username};
use crate::password;
use crate::phone::{PhoneRegion, clean_phone_number};

/// Rows per multi-row `INSERT` statement.
pub const INSERT_BATCH_SIZE: usize = 500;

/// Callback run after a user row has been inserted.
///
/// Hooks share the insert's transaction; an error from any hook rolls the
/// insert back.
#[async_trait::async_trait]
pub trait OnCreate: Send + Sync + fmt::Debug {
    async fn on_create(&self, txn: &DatabaseTransaction, user: &user::Model) -> std::result::Result<(), DbErr>;
}

/// Creates the empty profile every user owns.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateProfile;

#[async_trait::async_trait]
impl OnCreate for CreateProfile {
    async fn on_create(&self, txn: &DatabaseTransaction, user: &user::Model) -> std::result::Result<(), DbErr> {
        trace!("Creating profile for user {}", user.id);
        profile::ActiveModel {
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        Ok(())
    }
}

/// Partial update of a user. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct UserStore {
    db: DatabaseConnection,
    phone_region: PhoneRegion,
    hooks: Vec<Arc<dyn OnCreate>>,
}

impl UserStore {
    /// Store with the profile-creating hook registered.
    pub fn new(db: DatabaseConnection, phone_region: PhoneRegion) -> Self {
        let mut store = Self::without_hooks(db, phone_region);
        store.register_hook(Arc::new(CreateProfile));
        store
    }

    pub fn without_hooks(db: DatabaseConnection, phone_region: PhoneRegion) -> Self {
        Self {
            db,
            phone_region,
            hooks: Vec::new(),
        }
    }

    pub fn register_hook(&mut self, hook: Arc<dyn OnCreate>) {
        debug!("Registering on-create hook {:?}", hook);
        self.hooks.push(hook);
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn phone_region(&self) -> PhoneRegion {
        self.phone_region
    }

    /// Validate `fields` as an ordinary user and insert it.
    pub async fn create_user(&self, fields: UserFields) -> Result<user::Model> {
        let new_user = factory::create_user(fields, self.phone_region)?;
        self.create(new_user).await
    }

    /// Validate `fields` as a superuser and insert it.
    pub async fn create_superuser(&self, fields: UserFields) -> Result<user::Model> {
        let new_user = factory::create_superuser(fields, self.phone_region)?;
        self.create(new_user).await
    }

    /// Insert one user and run the on-create hooks.
    pub async fn create(&self, new_user: NewUser) -> Result<user::Model> {
        trace!("Entering UserStore::create for '{}'", new_user.username);

        let txn = self.db.begin().await?;
        let created = new_user.into_active_model().insert(&txn).await?;
        self.run_hooks(&txn, &created).await?;
        txn.commit().await?;

        info!("Created user {} ('{}')", created.id, created.username);
        Ok(created)
    }

    /// Insert many users in one transaction, silently skipping rows that hit a
    /// uniqueness constraint. Hooks run for the inserted rows only.
    ///
    /// Rows are sent in statements of [`INSERT_BATCH_SIZE`] to stay under the
    /// bind parameter limits of SQLite and PostgreSQL.
    ///
    /// Returns the rows that were actually inserted.
    pub async fn create_many_ignore_conflicts(&self, users: Vec<NewUser>) -> Result<Vec<user::Model>> {
        trace!("Entering UserStore::create_many_ignore_conflicts");
        if users.is_empty() {
            return Ok(Vec::new());
        }

        let requested = users.len();
        let txn = self.db.begin().await?;
        let mut created = Vec::with_capacity(requested);
        let mut remaining = users.into_iter().peekable();
        while remaining.peek().is_some() {
            let batch: Vec<_> = remaining
                .by_ref()
                .take(INSERT_BATCH_SIZE)
                .map(NewUser::into_active_model)
                .collect();
            let inserted = user::Entity::insert_many(batch)
                .on_conflict(OnConflict::new().do_nothing().to_owned())
                .exec_with_returning_many(&txn)
                .await?;
            created.extend(inserted);
        }

        for new_user in &created {
            self.run_hooks(&txn, new_user).await?;
        }
        txn.commit().await?;

        if created.len() < requested {
            debug!("Skipped {} conflicting users", requested - created.len());
        }
        info!("Batch-created {} users", created.len());
        Ok(created)
    }

    async fn run_hooks(&self, txn: &DatabaseTransaction, created: &user::Model) -> Result<()> {
        for hook in &self.hooks {
            hook.on_create(txn, created).await?;
        }
        Ok(())
    }

    pub async fn get(&self, id: i32) -> Result<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    pub async fn list(&self) -> Result<Vec<user::Model>> {
        Ok(user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Apply `changes` to user `id`, validating them like a new user.
    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<user::Model> {
        trace!("Entering UserStore::update for user {}", id);

        let existing = self.get(id).await?.ok_or(IdentityError::NotFound(id))?;
        let mut active: user::ActiveModel = existing.into();

        if let Some(email) = changes.email {
            active.email = Set(clean_email(&email)?);
        }
        if let Some(username) = changes.username {
            active.username = Set(clean_username(&username)?);
        }
        if let Some(full_name) = changes.full_name {
            active.full_name = Set(clean_full_name(&full_name)?);
        }
        if let Some(phone_number) = changes.phone_number {
            active.phone_number = Set(clean_phone_number(&phone_number, self.phone_region)?);
        }
        if let Some(date_of_birth) = changes.date_of_birth {
            active.date_of_birth = Set(date_of_birth);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(is_staff) = changes.is_staff {
            active.is_staff = Set(is_staff);
        }
        if let Some(is_superuser) = changes.is_superuser {
            active.is_superuser = Set(is_superuser);
        }

        let updated = active.update(&self.db).await?;
        info!("Updated user {}", id);
        Ok(updated)
    }

    /// Hash `raw` and store it as the password of user `id`.
    pub async fn set_password(&self, id: i32, raw: &str) -> Result<user::Model> {
        let existing = self.get(id).await?.ok_or(IdentityError::NotFound(id))?;
        let mut active: user::ActiveModel = existing.into();
        active.password = Set(password::hash_password(raw)?);

        let updated = active.update(&self.db).await?;
        info!("Changed password of user {}", id);
        Ok(updated)
    }

    /// Delete user `id`. Returns `false` when no such user existed.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            warn!("User {} not found for deletion", id);
            return Ok(false);
        }
        info!("Deleted user {}", id);
        Ok(true)
    }

    /// Check `username`/`password` and record the login time on success.
    ///
    /// Inactive users never authenticate.
    pub async fn authenticate(&self, username: &str, raw_password: &str) -> Result<Option<user::Model>> {
        let Some(found) = self.find_by_username(username).await? else {
            debug!("Unknown username '{}'", username);
            return Ok(None);
        };

        if !found.is_active || !found.check_password(raw_password) {
            debug!("Rejected credentials for '{}'", username);
            return Ok(None);
        }

        let mut active: user::ActiveModel = found.into();
        active.last_login = Set(Some(Utc::now()));
        Ok(Some(active.update(&self.db).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::setup_db;
    use model::entities::prelude::*;
    use sea_orm::{ModelTrait, PaginatorTrait};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fields(username: &str) -> UserFields {
        UserFields {
            email: format!("{}@Example.COM", username),
            username: username.to_string(),
            full_name: "Test User".to_string(),
            phone_number: "9876543217".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1992, 6, 15).unwrap(),
            password: Some("testpass@123".to_string()),
        }
    }

    #[derive(Debug, Default)]
    struct CountingHook(AtomicUsize);

    #[async_trait::async_trait]
    impl OnCreate for CountingHook {
        async fn on_create(&self, _txn: &DatabaseTransaction, _user: &user::Model) -> std::result::Result<(), DbErr> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingHook;

    #[async_trait::async_trait]
    impl OnCreate for FailingHook {
        async fn on_create(&self, _txn: &DatabaseTransaction, _user: &user::Model) -> std::result::Result<(), DbErr> {
            Err(DbErr::Custom("hook failed".to_string()))
        }
    }

    #[tokio::test]
    async fn test_create_makes_exactly_one_profile() {
        let store = UserStore::new(setup_db().await, PhoneRegion::In);

        let created = store.create_user(fields("alice")).await.unwrap();

        let profiles = Profile::find().all(store.connection()).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].user_id, created.id);
        assert_eq!(created.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_update_does_not_fire_hooks() {
        let counter = Arc::new(CountingHook::default());
        let mut store = UserStore::new(setup_db().await, PhoneRegion::In);
        store.register_hook(counter.clone());

        let created = store.create_user(fields("bob")).await.unwrap();
        store
            .update(
                created.id,
                UserChanges {
                    full_name: Some("Robert".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(Profile::find().count(store.connection()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failing_hook_rolls_back_insert() {
        let mut store = UserStore::new(setup_db().await, PhoneRegion::In);
        store.register_hook(Arc::new(FailingHook));

        let result = store.create_user(fields("carol")).await;

        assert!(matches!(result, Err(IdentityError::Database(_))));
        assert_eq!(User::find().count(store.connection()).await.unwrap(), 0);
        assert_eq!(Profile::find().count(store.connection()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let store = UserStore::new(setup_db().await, PhoneRegion::In);

        store.create_user(fields("dave")).await.unwrap();

        let mut again = fields("dave");
        again.email = "dave2@example.com".to_string();
        let result = store.create_user(again).await;

        assert!(matches!(result, Err(IdentityError::Conflict(_))));
        assert_eq!(User::find().count(store.connection()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = UserStore::new(setup_db().await, PhoneRegion::In);

        store.create_user(fields("erin")).await.unwrap();

        let mut again = fields("erin2");
        again.email = "erin@example.com".to_string();
        assert!(matches!(
            store.create_user(again).await,
            Err(IdentityError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_create_superuser_flags() {
        let store = UserStore::new(setup_db().await, PhoneRegion::In);

        let root = store.create_superuser(fields("root")).await.unwrap();

        assert!(root.is_active);
        assert!(root.is_staff);
        assert!(root.is_superuser);
        assert!(root.check_password("testpass@123"));
    }

    #[tokio::test]
    async fn test_batch_create_skips_conflicts_and_runs_hooks() {
        let store = UserStore::new(setup_db().await, PhoneRegion::In);
        store.create_user(fields("existing")).await.unwrap();

        let batch = ["existing", "fresh1", "fresh2"]
            .into_iter()
            .map(|name| factory::create_user(fields(name), PhoneRegion::In).unwrap())
            .collect();

        let created = store.create_many_ignore_conflicts(batch).await.unwrap();

        let names: Vec<_> = created.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["fresh1", "fresh2"]);
        assert_eq!(User::find().count(store.connection()).await.unwrap(), 3);
        assert_eq!(Profile::find().count(store.connection()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_validates_and_normalizes() {
        let store = UserStore::new(setup_db().await, PhoneRegion::In);
        let created = store.create_user(fields("frank")).await.unwrap();

        let bad_phone = store
            .update(
                created.id,
                UserChanges {
                    phone_number: Some("555".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(bad_phone, Err(IdentityError::Validation { field: "phone_number", .. })));

        let updated = store
            .update(
                created.id,
                UserChanges {
                    email: Some("Frank@NEW.example".to_string()),
                    is_staff: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "Frank@new.example");
        assert!(updated.is_staff);
        assert_eq!(updated.joined_at, created.joined_at);

        assert!(matches!(
            store.update(9999, UserChanges::default()).await,
            Err(IdentityError::NotFound(9999))
        ));
    }

    #[tokio::test]
    async fn test_set_password_and_authenticate() {
        let store = UserStore::new(setup_db().await, PhoneRegion::In);
        let created = store.create_user(fields("grace")).await.unwrap();
        assert!(created.last_login.is_none());

        store.set_password(created.id, "n3w-Secret").await.unwrap();

        assert!(store.authenticate("grace", "testpass@123").await.unwrap().is_none());
        let logged_in = store
            .authenticate("grace", "n3w-Secret")
            .await
            .unwrap()
            .expect("valid credentials");
        assert!(logged_in.last_login.is_some());

        assert!(store.authenticate("nobody", "n3w-Secret").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_authenticate() {
        let store = UserStore::new(setup_db().await, PhoneRegion::In);
        let created = store.create_user(fields("heidi")).await.unwrap();
        store
            .update(
                created.id,
                UserChanges {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(store.authenticate("heidi", "testpass@123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_profile() {
        let store = UserStore::new(setup_db().await, PhoneRegion::In);
        let created = store.create_user(fields("ivan")).await.unwrap();
        let profile = created
            .find_related(Profile)
            .one(store.connection())
            .await
            .unwrap();
        assert!(profile.is_some());

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert_eq!(Profile::find().count(store.connection()).await.unwrap(), 0);
    }
}
