//! Tests for the 'list' command

use db_backup_manager::managers::restore::list_backups;
use test_utils::{create_artifact, ConfigBuilder};

#[test]
fn test_list_newest_first_across_extensions() {
    let builder = ConfigBuilder::new().add_postgres(Some("pg"), None);
    let dir = builder.backup_dir(0).unwrap();
    let (config, _temp) = builder.persist();

    create_artifact(&dir, "app", "20250101_000000", ".backup", 300);
    create_artifact(&dir, "app", "20250102_000000", ".sql", 10);
    create_artifact(&dir, "billing", "20250103_000000", ".sql", 1);

    let files = list_backups(&config.databases[0], "app");
    assert_eq!(files.len(), 2);
    assert!(files[0].path.ends_with("app_20250102_000000.sql"));
    assert!(files[1].path.ends_with("app_20250101_000000.backup"));
    assert!(files.iter().all(|f| f.size > 0));
}

#[test]
fn test_list_missing_directory_is_empty() {
    let config = ConfigBuilder::new().add_mysql(None, Some("shop")).build();
    assert!(list_backups(&config.databases[0], "shop").is_empty());
}
