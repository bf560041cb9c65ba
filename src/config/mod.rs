//! Configuration module for db-backup-manager
//!
//! This module handles loading and validating the list of database targets
//! from a TOML file (or a `.json` file with the same shape).
//!
//! ## Example Usage
//!
//! ```no_run
//! use db_backup_manager::config;
//!
//! let config = config::load_config("databases.toml")?;
//!
//! for target in &config.databases {
//!     println!("Target: {}", target);
//! }
//! # Ok::<(), db_backup_manager::config::ConfigError>(())
//! ```

mod loader;
mod types;

pub use loader::{load_config, load_config_or_empty, select_target, ConfigError, Result};
pub use types::*;

/// Expand tilde (~) in path
pub fn expand_tilde(path: &std::path::Path) -> std::path::PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
