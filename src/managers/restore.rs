//! Restore manager - picks a dump file and loads it back into a database

use crate::config::TargetConfig;
use crate::error::{DumpError, Result};
use crate::strategies::strategy_for;
use crate::utils::environment::{Environment, ExecContext};
use crate::utils::executor::{CommandExecutor, RealExecutor};
use crate::utils::selector::{choose_latest, database_from_file, list_backup_files, list_candidates, BackupFile};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub struct RestoreManager {
    executor: Arc<dyn CommandExecutor>,
    timeout: Option<Duration>,
}

impl RestoreManager {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self::with_executor(Arc::new(RealExecutor::new()), timeout)
    }

    pub fn with_executor(executor: Arc<dyn CommandExecutor>, timeout: Option<Duration>) -> Self {
        Self { executor, timeout }
    }

    /// Restore one database; returns the file used, or `None` on any failure
    ///
    /// The database name comes from `database`, then the target's `db`, then
    /// the prefix of `file`. Errors are logged here and never returned.
    pub fn restore(
        &self,
        target: &TargetConfig,
        database: Option<&str>,
        file: Option<&Path>,
    ) -> Option<PathBuf> {
        match self.try_restore(target, database, file) {
            Ok(used) => Some(used),
            Err(e @ DumpError::CommandFailed { .. }) => {
                error!("Restore failed for {}: {}", target, e);
                None
            }
            Err(e) => {
                error!("Restore error for {}: {:?}", target, e);
                None
            }
        }
    }

    fn try_restore(
        &self,
        target: &TargetConfig,
        database: Option<&str>,
        file: Option<&Path>,
    ) -> Result<PathBuf> {
        let database = database
            .map(str::to_string)
            .or_else(|| target.database.clone())
            .or_else(|| file.and_then(database_from_file))
            .ok_or(DumpError::MissingDatabase)?;

        let strategy = strategy_for(target);

        let chosen = match file {
            Some(path) if path.is_file() => path.to_path_buf(),
            Some(path) => {
                return Err(DumpError::Selection {
                    database,
                    dir: path.to_path_buf(),
                })
            }
            None => {
                let candidates =
                    list_candidates(&target.backup_dir, &database, strategy.restore_extensions());
                choose_latest(&candidates, strategy.restore_extensions()).ok_or_else(|| {
                    DumpError::Selection {
                        database: database.clone(),
                        dir: target.backup_dir.clone(),
                    }
                })?
            }
        };

        info!("Restoring {} database '{}' from {:?}", strategy.name(), database, chosen);

        let ctx = ExecContext::new(
            self.executor.as_ref(),
            Environment::from_container(target.container.as_deref()),
            self.timeout,
        );
        strategy.restore_database(&ctx, &database, &chosen)?;

        info!("Restore of '{}' completed from {:?}", database, chosen);
        Ok(chosen)
    }
}

/// Dump files for one database in a target's backup directory, newest first
///
/// Only extensions the target's engine can restore are listed.
pub fn list_backups(target: &TargetConfig, database: &str) -> Vec<BackupFile> {
    list_backup_files(&target.backup_dir, database, strategy_for(target).restore_extensions())
}
