//! User identity: construction, credentials, permissions and persistence.
//!
//! New users are built by the stateless factory functions in [`factory`],
//! which validate and hash the raw input. [`store::UserStore`] writes them and
//! runs its registered [`store::OnCreate`] hooks in the same transaction; the
//! default hook creates the user's profile.

pub mod auth;
pub mod email;
pub mod error;
pub mod factory;
pub mod password;
pub mod phone;
pub mod store;
pub mod synthetic;

pub use auth::{Credentials, Permissions};
pub use error::{IdentityError, Result};
pub use factory::{NewUser, UserFields, create_superuser, create_user};
pub use phone::PhoneRegion;
pub use store::{CreateProfile, OnCreate, UserChanges, UserStore};
pub use synthetic::{PLACEHOLDER_PASSWORD, SyntheticUsers};

#[cfg(test)]
pub(crate) mod testing {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

    /// Create an in-memory SQLite database with all migrations applied.
    pub async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        db.execute_unprepared("PRAGMA foreign_keys = ON;")
            .await
            .expect("Failed to enable foreign keys");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        db
    }
}
