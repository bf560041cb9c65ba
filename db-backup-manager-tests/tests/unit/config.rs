//! Configuration loading tests

use db_backup_manager::config::{load_config, load_config_or_empty, select_target, Engine};
use db_backup_manager::error::DumpError;
use rstest::rstest;
use test_utils::{
    legacy_json_config, minimal_config_toml, multi_engine_config_toml, render, write_config_json,
    ConfigBuilder, TestContext,
};

#[test]
fn test_minimal_config_defaults() {
    let ctx = TestContext::new();
    let backups = ctx.create_subdir("backups");
    let path = ctx.create_file("databases.toml", &render(minimal_config_toml(), &backups));

    let config = load_config(&path).unwrap();
    assert_eq!(config.databases.len(), 1);
    assert_eq!(config.global.command_timeout_seconds, 3600);
    assert_eq!(config.global.interval_seconds, 600);

    let target = &config.databases[0];
    assert_eq!(target.engine, Engine::Postgres);
    assert_eq!(target.host, "127.0.0.1");
    assert_eq!(target.port(), 5432);
    assert!(target.database.is_none());
}

#[test]
fn test_multi_engine_config() {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "databases.toml",
        &render(multi_engine_config_toml(), ctx.temp_dir()),
    );

    let config = load_config(&path).unwrap();
    let engines: Vec<Engine> = config.databases.iter().map(|t| t.engine).collect();
    assert_eq!(engines, vec![Engine::Postgres, Engine::MySql, Engine::MariaDb]);
    assert_eq!(config.databases[1].database.as_deref(), Some("shop"));
    assert_eq!(config.databases[2].port(), 3306);
    assert_eq!(config.global.command_timeout_seconds, 120);
}

#[test]
fn test_legacy_json_config() {
    let ctx = TestContext::new();
    let path = ctx.create_file("databases.json", &render(legacy_json_config(), ctx.temp_dir()));

    let config = load_config(&path).unwrap();
    assert_eq!(config.databases[0].container.as_deref(), Some("my_postgres"));
}

#[test]
fn test_builder_config_survives_json() {
    let (config, temp_dir) = ConfigBuilder::new().add_mysql(Some("my"), Some("shop")).persist();
    let path = write_config_json(&config, temp_dir.path());

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.databases[0].engine, Engine::MySql);
}

#[rstest]
#[case::unknown_engine("type = \"oracle\"\nusername = \"u\"")]
#[case::empty_username("type = \"postgres\"\nusername = \"\"")]
#[case::empty_container("type = \"postgres\"\nusername = \"u\"\ncontainer = \"\"")]
#[case::empty_db("type = \"mysql\"\nusername = \"u\"\ndb = \" \"")]
#[case::missing_username("type = \"postgres\"")]
fn test_invalid_targets_are_rejected(#[case] body: &str) {
    let ctx = TestContext::new();
    let path = ctx.create_file("databases.toml", &format!("[[databases]]\n{}\n", body));
    assert!(load_config(&path).is_err());
}

#[test]
fn test_zero_interval_is_rejected() {
    let ctx = TestContext::new();
    let path = ctx.create_file("databases.toml", "[global]\ninterval_seconds = 0\n");
    assert!(load_config(&path).is_err());
}

#[test]
fn test_broken_config_falls_back_to_empty() {
    let ctx = TestContext::new();
    let path = ctx.create_file("databases.toml", "[[databases]\nbroken");
    assert!(load_config_or_empty(&path).databases.is_empty());
    assert!(load_config_or_empty(ctx.temp_dir().join("missing.toml")).databases.is_empty());
}

#[test]
fn test_select_target_by_engine_and_container() {
    let config = ConfigBuilder::new()
        .add_postgres(Some("pg1"), None)
        .add_postgres(Some("pg2"), None)
        .add_mysql(None, Some("shop"))
        .build();

    assert_eq!(
        select_target(&config, Engine::MySql, None).unwrap().database.as_deref(),
        Some("shop")
    );
    assert_eq!(
        select_target(&config, Engine::Postgres, Some("pg2")).unwrap().container.as_deref(),
        Some("pg2")
    );

    let ambiguous = select_target(&config, Engine::Postgres, None).unwrap_err();
    assert!(matches!(ambiguous, DumpError::Config(_)));
    assert!(ambiguous.to_string().contains("--container"));

    assert!(select_target(&config, Engine::MariaDb, None).is_err());
}

#[test]
fn test_target_display_hides_password() {
    let config = ConfigBuilder::new().add_postgres(None, Some("app")).build();
    let rendered = config.databases[0].to_string();
    assert!(rendered.contains("password: ***"));
    assert!(!rendered.contains("test-password-123"));
    assert!(!format!("{:?}", config.databases[0]).contains("test-password-123"));
}
