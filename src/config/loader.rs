use super::types::*;
use super::expand_tilde;
use crate::error::DumpError;
use std::fs;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse JSON config file: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML (or `.json`) file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut config: Config = if is_json {
        serde_json::from_str(&contents)?
    } else {
        toml::from_str(&contents)?
    };

    validate_config(&config)?;

    for target in &mut config.databases {
        target.backup_dir = expand_tilde(&target.backup_dir);
    }

    Ok(config)
}

/// Load configuration, falling back to an empty target list on any error
///
/// The backup cycle keeps running with nothing to do rather than exiting.
pub fn load_config_or_empty<P: AsRef<Path>>(path: P) -> Config {
    let path = path.as_ref();
    match load_config(path) {
        Ok(config) => {
            info!(
                "Loaded {} database target(s) from {:?}",
                config.databases.len(),
                path
            );
            config
        }
        Err(e) => {
            error!("Config error ({:?}): {}", path, e);
            Config::default()
        }
    }
}

/// Validate the configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.global.interval_seconds == 0 {
        return Err(ConfigError::ValidationError(
            "global.interval_seconds must be greater than zero".to_string(),
        ));
    }

    for (index, target) in config.databases.iter().enumerate() {
        validate_target(index, target)?;
    }

    Ok(())
}

fn validate_target(index: usize, target: &TargetConfig) -> Result<()> {
    if target.username.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "databases[{}]: username must not be empty",
            index
        )));
    }

    if target.backup_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "databases[{}]: backup_dir must not be empty",
            index
        )));
    }

    if matches!(target.container.as_deref(), Some(c) if c.trim().is_empty()) {
        return Err(ConfigError::ValidationError(format!(
            "databases[{}]: container must not be empty when set",
            index
        )));
    }

    if matches!(target.database.as_deref(), Some(d) if d.trim().is_empty()) {
        return Err(ConfigError::ValidationError(format!(
            "databases[{}]: db must not be empty when set",
            index
        )));
    }

    Ok(())
}

/// Pick the single target matching an engine and optional container
pub fn select_target<'a>(
    config: &'a Config,
    engine: Engine,
    container: Option<&str>,
) -> std::result::Result<&'a TargetConfig, DumpError> {
    let matches: Vec<&TargetConfig> = config
        .databases
        .iter()
        .filter(|t| t.engine == engine)
        .filter(|t| container.map_or(true, |c| t.container.as_deref() == Some(c)))
        .collect();

    match matches.as_slice() {
        [] => Err(ConfigError::ValidationError(format!(
            "No configuration matches type={} container={}",
            engine,
            container.unwrap_or("-")
        ))
        .into()),
        [single] => Ok(single),
        many => {
            let listed: Vec<String> = many.iter().map(|t| t.to_string()).collect();
            Err(ConfigError::ValidationError(format!(
                "Multiple configurations match, specify --container. Matches: {}",
                listed.join("; ")
            ))
            .into())
        }
    }
}
