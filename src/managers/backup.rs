//! Backup manager - runs one backup cycle over every configured target

use crate::config::{Config, TargetConfig};
use crate::error::{DumpError, Result};
use crate::strategies::strategy_for;
use crate::utils::artifacts::{has_today_backup, now_timestamp};
use crate::utils::environment::{Environment, ExecContext};
use crate::utils::executor::{CommandExecutor, RealExecutor};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// What happened to one target during a cycle
#[derive(Debug)]
pub enum TargetOutcome {
    /// A backup from today already exists
    Skipped,
    /// Artifacts written this cycle
    Completed(Vec<PathBuf>),
    Failed(DumpError),
}

/// Per-target outcomes of one cycle, in configuration order
#[derive(Debug, Default)]
pub struct CycleReport {
    pub outcomes: Vec<(String, TargetOutcome)>,
}

impl CycleReport {
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TargetOutcome::Skipped))
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, TargetOutcome::Completed(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TargetOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Every artifact written during the cycle
    pub fn files(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                TargetOutcome::Completed(files) => Some(files.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn count(&self, predicate: impl Fn(&TargetOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

pub struct BackupManager {
    config: Config,
    executor: Arc<dyn CommandExecutor>,
}

impl BackupManager {
    /// Create new backup manager using real subprocesses
    pub fn new(config: Config) -> Self {
        Self::with_executor(config, Arc::new(RealExecutor::new()))
    }

    /// Create backup manager with a specific executor
    pub fn with_executor(config: Config, executor: Arc<dyn CommandExecutor>) -> Self {
        Self { config, executor }
    }

    pub fn targets(&self) -> &[TargetConfig] {
        &self.config.databases
    }

    /// Back up every configured target once
    ///
    /// A failing target is recorded and the cycle moves on.
    pub fn run_cycle(&self) -> CycleReport {
        let start_time = Instant::now();
        let mut report = CycleReport::default();

        if self.config.databases.is_empty() {
            warn!("No database targets configured");
            return report;
        }

        info!("Starting backup cycle for {} target(s)", self.config.databases.len());

        for target in &self.config.databases {
            let outcome = match self.backup_target(target) {
                Ok(Some(files)) => TargetOutcome::Completed(files),
                Ok(None) => TargetOutcome::Skipped,
                Err(e) => {
                    log_failure(target, &e);
                    TargetOutcome::Failed(e)
                }
            };
            report.outcomes.push((target.to_string(), outcome));
        }

        info!(
            "Backup cycle finished in {:.2}s: {} completed, {} skipped, {} failed",
            start_time.elapsed().as_secs_f64(),
            report.completed(),
            report.skipped(),
            report.failed()
        );

        report
    }

    /// Back up one target; `None` means today's backup already exists
    pub fn backup_target(&self, target: &TargetConfig) -> Result<Option<Vec<PathBuf>>> {
        let dir = &target.backup_dir;

        if has_today_backup(dir, target.database.as_deref()) {
            info!(
                "Backup from today already present in {:?} for {}, skipping",
                dir,
                target.database.as_deref().unwrap_or("all databases")
            );
            return Ok(None);
        }

        fs::create_dir_all(dir)?;

        let strategy = strategy_for(target);
        let ctx = ExecContext::new(
            self.executor.as_ref(),
            Environment::from_container(target.container.as_deref()),
            self.config.global.command_timeout(),
        );

        let databases = match target.database {
            Some(ref db) => vec![db.clone()],
            None => strategy.list_databases(&ctx)?,
        };

        if databases.is_empty() {
            warn!("No user databases found for {}", target);
        }

        let mut files = Vec::new();
        for database in &databases {
            info!("Backing up {} database '{}'", strategy.name(), database);
            let timestamp = now_timestamp();
            files.extend(strategy.backup_database(&ctx, database, dir, &timestamp)?);
        }

        info!("Backup of {} completed: {} file(s)", target, files.len());
        Ok(Some(files))
    }
}

fn log_failure(target: &TargetConfig, e: &DumpError) {
    match e {
        DumpError::CommandFailed {
            command,
            exit_code,
            stderr,
        } => error!(
            "Backup failed for {}: `{}` exited with {:?}: {}",
            target,
            command,
            exit_code,
            stderr.trim()
        ),
        other => error!("Backup failed for {}: {}", target, other),
    }
}
