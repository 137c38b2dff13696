use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitStatus;

use anyhow::Result;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info, trace};

use crate::config::BackupSettings;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("could not create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("could not run '{command}': {source}")]
    Spawn { command: String, source: io::Error },

    #[error("'{command}' exited with {status}")]
    Failed { command: String, status: ExitStatus },
}

/// Run the dump tool and return the path of the written file.
pub async fn run_backup(settings: &BackupSettings) -> Result<PathBuf, BackupError> {
    trace!("Entering run_backup function");

    std::fs::create_dir_all(&settings.output_dir).map_err(|source| BackupError::CreateDir {
        path: settings.output_dir.clone(),
        source,
    })?;

    let output = settings.output_path();
    debug!(
        "Dumping database '{}' on {}:{} as '{}' to {}",
        settings.db_name,
        settings.db_host,
        settings.db_port,
        settings.db_user,
        output.display()
    );

    // Inherits the terminal so pg_dump can prompt for the password.
    let status = Command::new(&settings.dump_command)
        .arg("-U")
        .arg(&settings.db_user)
        .arg("-d")
        .arg(&settings.db_name)
        .arg("--host")
        .arg(&settings.db_host)
        .arg("--port")
        .arg(settings.db_port.to_string())
        .arg("-f")
        .arg(&output)
        .status()
        .await
        .map_err(|source| BackupError::Spawn {
            command: settings.dump_command.clone(),
            source,
        })?;

    if !status.success() {
        return Err(BackupError::Failed {
            command: settings.dump_command.clone(),
            status,
        });
    }

    Ok(output)
}

/// Run the backup and report the outcome on `out`.
///
/// A failed dump is reported, not returned: only a failure to write the
/// report itself is an error.
pub async fn backup(settings: &BackupSettings, out: &mut impl Write) -> Result<()> {
    match run_backup(settings).await {
        Ok(path) => {
            info!("Backup written to {}", path.display());
            writeln!(out, "Backup file {} created successfully", path.display())?;
        }
        Err(e) => {
            error!("Backup failed: {}", e);
            writeln!(out, "Error in creating backup: {}", e)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(dump_command: &str, dir_name: &str) -> BackupSettings {
        BackupSettings {
            db_name: "accounts".to_string(),
            db_user: "postgres".to_string(),
            db_host: "localhost".to_string(),
            db_port: 5432,
            output_dir: std::env::temp_dir()
                .join(format!("accounts-backup-{}-{}", std::process::id(), dir_name)),
            file_name: "backup_sql_postgres.sql".to_string(),
            dump_command: dump_command.to_string(),
        }
    }

    #[tokio::test]
    async fn test_successful_dump_is_reported() {
        // `true` ignores its arguments and exits 0
        let settings = settings("true", "ok");
        let mut out = Vec::new();

        backup(&settings, &mut out).await.unwrap();

        let report = String::from_utf8(out).unwrap();
        assert_eq!(
            report.trim_end(),
            format!(
                "Backup file {} created successfully",
                settings.output_path().display()
            )
        );
        assert!(settings.output_dir.is_dir());
        std::fs::remove_dir_all(&settings.output_dir).ok();
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported_not_returned() {
        let settings = settings("false", "fail");
        let mut out = Vec::new();

        backup(&settings, &mut out).await.unwrap();

        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with("Error in creating backup: 'false' exited with"));
        std::fs::remove_dir_all(&settings.output_dir).ok();
    }

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let settings = settings("accounts-no-such-dump-tool", "missing");

        let result = run_backup(&settings).await;
        assert!(matches!(result, Err(BackupError::Spawn { .. })));

        let mut out = Vec::new();
        backup(&settings, &mut out).await.unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with("Error in creating backup: could not run"));
        std::fs::remove_dir_all(&settings.output_dir).ok();
    }
}
