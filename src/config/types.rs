use crate::error::DumpError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub databases: Vec<TargetConfig>,
}

/// Global configuration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Logging configuration
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,

    /// Upper bound for every external tool invocation
    #[serde(default = "default_command_timeout")]
    pub command_timeout_seconds: u64,

    /// Seconds between two daemon cycles
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// Where the instance lock file lives
    #[serde(default = "default_lock_directory")]
    pub lock_directory: PathBuf,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_level: default_log_level(),
            log_max_files: default_log_max_files(),
            command_timeout_seconds: default_command_timeout(),
            interval_seconds: default_interval(),
            lock_directory: default_lock_directory(),
        }
    }
}

impl GlobalConfig {
    /// Per-command timeout; zero disables it
    pub fn command_timeout(&self) -> Option<Duration> {
        match self.command_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Database engine tag as written in the configuration
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Engine {
    Postgres,
    MySql,
    MariaDb,
}

/// Engine family, which decides the dump/restore tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFamily {
    Postgres,
    MySql,
}

impl Engine {
    pub fn family(self) -> EngineFamily {
        match self {
            Engine::Postgres => EngineFamily::Postgres,
            Engine::MySql | Engine::MariaDb => EngineFamily::MySql,
        }
    }

    pub fn default_port(self) -> u16 {
        match self.family() {
            EngineFamily::Postgres => 5432,
            EngineFamily::MySql => 3306,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
            Engine::MySql => "mysql",
            Engine::MariaDb => "mariadb",
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::Postgres
    }
}

impl FromStr for Engine {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Engine::Postgres),
            "mysql" => Ok(Engine::MySql),
            "mariadb" => Ok(Engine::MariaDb),
            other => Err(DumpError::UnsupportedEngine(other.to_string())),
        }
    }
}

impl TryFrom<String> for Engine {
    type Error = DumpError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Engine> for String {
    fn from(engine: Engine) -> Self {
        engine.as_str().to_string()
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A password that never shows up in Debug output
#[derive(Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// One configured database target
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    #[serde(rename = "type", default)]
    pub engine: Engine,

    pub username: String,

    #[serde(default)]
    pub password: Secret,

    #[serde(default = "default_host")]
    pub host: String,

    /// Falls back to the engine's default port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Run every command inside this container instead of on the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    /// Explicit database; all user databases when absent
    #[serde(default, rename = "db", skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
}

impl TargetConfig {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }
}

impl fmt::Display for TargetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{type: {}, username: {}, password: ***, host: {}, port: {}",
            self.engine,
            self.username,
            self.host,
            self.port()
        )?;
        if let Some(ref container) = self.container {
            write!(f, ", container: {}", container)?;
        }
        if let Some(ref database) = self.database {
            write!(f, ", db: {}", database)?;
        }
        write!(f, ", backup_dir: {}}}", self.backup_dir.display())
    }
}

// Default value functions

fn default_log_directory() -> PathBuf { PathBuf::from("~/logs") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
fn default_command_timeout() -> u64 { 3600 }
fn default_interval() -> u64 { 600 }
fn default_lock_directory() -> PathBuf { std::env::temp_dir() }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_backup_dir() -> PathBuf { PathBuf::from("./") }
