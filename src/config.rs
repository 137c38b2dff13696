use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use identity::{PhoneRegion, UserStore};
use sea_orm::Database;
use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://accounts.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Application settings.
///
/// Sources, later ones winning: built-in defaults, an optional
/// `accounts.toml` in the working directory, `ACCOUNTS__*` environment
/// variables (`ACCOUNTS__BACKUP__DB_HOST` sets `backup.db_host`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub phone_region: PhoneRegion,
    pub backup: BackupSettings,
}

/// Connection parameters and output location for `pg_dump`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackupSettings {
    pub db_name: String,
    pub db_user: String,
    pub db_host: String,
    pub db_port: u16,
    pub output_dir: PathBuf,
    pub file_name: String,
    pub dump_command: String,
}

impl BackupSettings {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        trace!("Loading settings");
        dotenvy::dotenv().ok();

        let settings: Settings = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("phone_region", "IN")?
            .set_default("backup.db_name", "accounts")?
            .set_default("backup.db_user", "postgres")?
            .set_default("backup.db_host", "localhost")?
            .set_default("backup.db_port", 5432)?
            .set_default("backup.output_dir", "data_backups")?
            .set_default("backup.file_name", "backup_sql_postgres.sql")?
            .set_default("backup.dump_command", "pg_dump")?
            .add_source(File::with_name("accounts").required(false))
            .add_source(
                Environment::with_prefix("ACCOUNTS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}

/// Connect to `database_url` and build the shared handler state.
pub async fn initialize_app_state_with_url(
    database_url: &str,
    phone_region: PhoneRegion,
) -> Result<AppState> {
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let store = UserStore::new(db.clone(), phone_region);
    Ok(AppState { db, store })
}
