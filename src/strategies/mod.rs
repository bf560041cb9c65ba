pub mod mysql;
pub mod postgres;

use crate::config::{EngineFamily, TargetConfig};
use crate::error::Result;
use crate::utils::environment::ExecContext;
use std::path::{Path, PathBuf};

pub use mysql::MySqlStrategy;
pub use postgres::PostgresStrategy;

/// Trait for per-engine dump/restore strategies
pub trait EngineStrategy {
    /// List user databases, excluding system schemas
    fn list_databases(&self, ctx: &ExecContext<'_>) -> Result<Vec<String>>;

    /// Dump one database into `dir`; returns the artifacts written
    fn backup_database(
        &self,
        ctx: &ExecContext<'_>,
        database: &str,
        dir: &Path,
        timestamp: &str,
    ) -> Result<Vec<PathBuf>>;

    /// Drop, recreate and load one database from `file`
    fn restore_database(&self, ctx: &ExecContext<'_>, database: &str, file: &Path) -> Result<()>;

    /// Restore file extensions, most preferred first
    fn restore_extensions(&self) -> &'static [&'static str];

    /// Get strategy name (for logging)
    fn name(&self) -> &'static str;
}

/// Build the strategy for a target's engine
pub fn strategy_for(target: &TargetConfig) -> Box<dyn EngineStrategy> {
    match target.engine.family() {
        EngineFamily::Postgres => Box::new(PostgresStrategy::from_target(target)),
        EngineFamily::MySql => Box::new(MySqlStrategy::from_target(target)),
    }
}
