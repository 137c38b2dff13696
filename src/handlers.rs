pub mod activities;
pub mod addresses;
pub mod auth;
pub mod health;
pub mod notifications;
pub mod profiles;
pub mod users;
