//! Root of all SeaORM entity modules.
//!
//! `user` is the current identity table; `profile`, `activity`, `address` and
//! `notification` hang off it and are removed with it by `ON DELETE CASCADE`.
//! `legacy_user` is the identity table of the previous schema version and is
//! only read by the data migration.

pub mod activity;
pub mod address;
pub mod legacy_user;
pub mod notification;
pub mod profile;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::activity::Entity as Activity;
    pub use super::address::Entity as Address;
    pub use super::legacy_user::Entity as LegacyUser;
    pub use super::notification::Entity as Notification;
    pub use super::profile::Entity as Profile;
    pub use super::user::Entity as User;
}
