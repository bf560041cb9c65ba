//! Check that the external tools a target needs are installed

use crate::config::{EngineFamily, TargetConfig};

/// Tools the target needs on the local `PATH`
pub fn required_tools(target: &TargetConfig) -> &'static [&'static str] {
    if target.container.is_some() {
        return &["docker"];
    }
    match target.engine.family() {
        EngineFamily::Postgres => &["psql", "pg_dump", "pg_restore"],
        EngineFamily::MySql => &["mysql", "mysqldump"],
    }
}

/// Required tools that cannot be found
pub fn missing_tools(target: &TargetConfig) -> Vec<&'static str> {
    required_tools(target)
        .iter()
        .copied()
        .filter(|tool| which::which(tool).is_err())
        .collect()
}
