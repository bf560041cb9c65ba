//! Fluent API for building test configurations
//!
//! Provides a builder pattern for creating test configurations with sensible defaults.

use db_backup_manager::config::{Config, Engine, GlobalConfig, Secret, TargetConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    global: GlobalConfig,
    databases: Vec<TargetConfig>,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with no targets
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let log_directory = temp_dir.path().join("logs");
        fs::create_dir_all(&log_directory).expect("Failed to create log_directory");

        let lock_directory = temp_dir.path().join("locks");
        fs::create_dir_all(&lock_directory).expect("Failed to create lock_directory");

        let global = GlobalConfig {
            log_directory,
            log_level: "debug".to_string(),
            log_max_files: 5,
            command_timeout_seconds: 60,
            interval_seconds: 1,
            lock_directory,
        };

        Self {
            temp_dir,
            global,
            databases: Vec::new(),
        }
    }

    fn target(&self, engine: Engine, container: Option<&str>, db: Option<&str>) -> TargetConfig {
        let dir_name = match (container, db) {
            (Some(c), Some(d)) => format!("{}-{}", c, d),
            (Some(c), None) => c.to_string(),
            (None, Some(d)) => format!("{}-{}", engine, d),
            (None, None) => engine.to_string(),
        };

        TargetConfig {
            engine,
            username: match engine {
                Engine::Postgres => "postgres".to_string(),
                _ => "root".to_string(),
            },
            password: Secret::new("test-password-123"),
            host: "127.0.0.1".to_string(),
            port: None,
            container: container.map(str::to_string),
            database: db.map(str::to_string),
            backup_dir: self.temp_dir.path().join("backups").join(dir_name),
        }
    }

    /// Add a PostgreSQL target; `None` container means host mode
    pub fn add_postgres(mut self, container: Option<&str>, db: Option<&str>) -> Self {
        let target = self.target(Engine::Postgres, container, db);
        self.databases.push(target);
        self
    }

    /// Add a MySQL target
    pub fn add_mysql(mut self, container: Option<&str>, db: Option<&str>) -> Self {
        let target = self.target(Engine::MySql, container, db);
        self.databases.push(target);
        self
    }

    /// Add a MariaDB target
    pub fn add_mariadb(mut self, container: Option<&str>, db: Option<&str>) -> Self {
        let target = self.target(Engine::MariaDb, container, db);
        self.databases.push(target);
        self
    }

    /// Add a fully custom target
    pub fn add_target(mut self, target: TargetConfig) -> Self {
        self.databases.push(target);
        self
    }

    /// Point the most recently added target at `dir`
    pub fn with_backup_dir(mut self, dir: &Path) -> Self {
        if let Some(target) = self.databases.last_mut() {
            target.backup_dir = dir.to_path_buf();
        }
        self
    }

    /// Set the command timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.global.command_timeout_seconds = seconds;
        self
    }

    /// Set the daemon interval
    pub fn with_interval(mut self, seconds: u64) -> Self {
        self.global.interval_seconds = seconds;
        self
    }

    /// Get the temp directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Backup directory of the target at `index`
    pub fn backup_dir(&self, index: usize) -> Option<PathBuf> {
        self.databases.get(index).map(|t| t.backup_dir.clone())
    }

    /// Build the configuration (temp dir is dropped)
    pub fn build(self) -> Config {
        self.persist().0
    }

    /// Build the configuration and keep the temp directory alive
    pub fn persist(self) -> (Config, TempDir) {
        let config = Config {
            global: self.global,
            databases: self.databases,
        };
        (config, self.temp_dir)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a configuration as TOML and return its path
pub fn write_config_toml(config: &Config, dir: &Path) -> PathBuf {
    let path = dir.join("databases.toml");
    let toml_str = toml::to_string_pretty(config).expect("Failed to serialize config");
    fs::write(&path, toml_str).expect("Failed to write config");
    path
}

/// Write a configuration as JSON and return its path
pub fn write_config_json(config: &Config, dir: &Path) -> PathBuf {
    let path = dir.join("databases.json");
    let json = serde_json::to_string_pretty(config).expect("Failed to serialize config");
    fs::write(&path, json).expect("Failed to write config");
    path
}
