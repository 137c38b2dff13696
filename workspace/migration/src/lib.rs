pub use sea_orm_migration::prelude::*;

mod m20230801_000001_create_legacy_users;
mod m20230820_000002_create_users_and_profiles;
pub mod m20230820_000003_copy_legacy_users;
mod m20230905_000004_create_addresses_and_notifications;

pub use m20230820_000003_copy_legacy_users::copy_legacy_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20230801_000001_create_legacy_users::Migration),
            Box::new(m20230820_000002_create_users_and_profiles::Migration),
            Box::new(m20230820_000003_copy_legacy_users::Migration),
            Box::new(m20230905_000004_create_addresses_and_notifications::Migration),
        ]
    }
}
