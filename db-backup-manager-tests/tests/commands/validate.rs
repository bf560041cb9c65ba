//! Tests for the 'validate' command
//!
//! The validate command loads the configuration and checks required tools.

use db_backup_manager::config::load_config;
use db_backup_manager::utils::preflight::{missing_tools, required_tools};
use test_utils::{ConfigBuilder, TestContext};

#[test]
fn test_validate_valid_config() {
    let ctx = TestContext::from_builder(
        ConfigBuilder::new()
            .add_postgres(Some("pg"), None)
            .add_mysql(None, Some("shop")),
    );
    let path = ctx.write_config();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.databases.len(), 2);
}

#[test]
fn test_validate_invalid_toml() {
    let ctx = TestContext::new();
    let path = ctx.create_file("databases.toml", "invalid { toml content");
    assert!(load_config(&path).is_err(), "Invalid TOML should fail");
}

#[test]
fn test_validate_empty_config_has_no_targets() {
    let ctx = TestContext::new();
    let path = ctx.create_file("databases.toml", "");
    let config = load_config(&path).unwrap();
    assert!(config.databases.is_empty());
}

#[test]
fn test_validate_nonexistent_file() {
    let result = load_config(std::path::Path::new("/nonexistent/databases.toml"));
    assert!(result.is_err(), "Nonexistent file should fail");
}

#[test]
fn test_preflight_reports_only_required_tools() {
    let config = ConfigBuilder::new()
        .add_postgres(None, None)
        .add_mariadb(Some("maria"), None)
        .build();

    for target in &config.databases {
        let required = required_tools(target);
        for tool in missing_tools(target) {
            assert!(required.contains(&tool));
        }
    }
    assert_eq!(required_tools(&config.databases[1]), &["docker"]);
}
