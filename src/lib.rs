//! Database Backup Manager Library
//!
//! Dumps and restores PostgreSQL and MySQL/MariaDB databases, running the
//! client tools on the host or inside a Docker container.

pub mod config;
pub mod error;
pub mod managers;
pub mod strategies;
pub mod utils;

// Re-export commonly used types
pub use config::{load_config, load_config_or_empty, select_target, Config, Engine, TargetConfig};
pub use error::{DumpError, Result};
pub use managers::backup::{BackupManager, CycleReport, TargetOutcome};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use managers::restore::RestoreManager;
pub use managers::scheduler::Scheduler;
