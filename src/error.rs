//! Error types for backup and restore operations

use crate::config::ConfigError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command failed ({}): {command}: {stderr}", exit_code_label(.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("No backup found for '{database}' in {dir:?}")]
    Selection { database: String, dir: PathBuf },

    #[error("A database name or a backup file is required to restore")]
    MissingDatabase,

    #[error("Unsupported database engine: {0}")]
    UnsupportedEngine(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DumpError {
    /// Whether this error came from an external tool
    pub fn is_command_failure(&self) -> bool {
        matches!(self, DumpError::CommandFailed { .. })
    }
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, DumpError>;
