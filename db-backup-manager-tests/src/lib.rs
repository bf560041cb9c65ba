//! Test utilities for db-backup-manager
//!
//! This crate provides shared test utilities, fixtures and helper functions
//! for testing the db-backup-manager application.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ConfigBuilder, MockExecutor, TestContext};
//!
//! #[test]
//! fn my_test() {
//!     let ctx = TestContext::from_builder(ConfigBuilder::new().add_postgres("pg", None));
//!     let mock = MockExecutor::new();
//!     // ... test code
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::{write_config_json, write_config_toml, ConfigBuilder};
pub use fixtures::*;
pub use test_context::TestContext;

// Re-export types from the main crate for convenience
pub use db_backup_manager::config::{Config, Engine, GlobalConfig, Secret, TargetConfig};
pub use db_backup_manager::managers::backup::{BackupManager, CycleReport, TargetOutcome};
pub use db_backup_manager::managers::restore::RestoreManager;

// Re-export mock implementations from the main crate
pub use db_backup_manager::utils::executor::mock::{CommandCall, MockExecutor, MockResponse};
pub use db_backup_manager::utils::executor::CommandExecutor;

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
