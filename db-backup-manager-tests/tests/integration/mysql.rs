//! MySQL integration tests
//!
//! These tests require Docker and verify MySQL backup/restore workflows.
//! Run with: `cargo test -p db-backup-manager-tests --test integration -- --ignored`

use super::common::{exec_in, is_docker_available, start_container, wait_until, ContainerGuard};
use anyhow::Result;
use db_backup_manager::config::Secret;
use db_backup_manager::managers::backup::BackupManager;
use db_backup_manager::managers::restore::RestoreManager;
use test_utils::{ConfigBuilder, TestContext};

const IMAGE: &str = "mysql:8.0";
const PASSWORD: &str = "testpass";

fn exec_sql(container: &str, sql: &str) -> Result<String> {
    exec_in(
        container,
        &["MYSQL_PWD=testpass"],
        &["mysql", "-uroot", "-N", "-B", "-e", sql],
    )
}

/// Dump and restore one named database inside a MySQL container
#[test]
#[ignore] // Requires Docker
fn test_mysql_container_backup_and_restore() {
    if !is_docker_available() {
        println!("Docker not available, skipping test");
        return;
    }

    let name = "db-backup-manager-test-mysql";
    let _guard = ContainerGuard::new(name);
    start_container(name, IMAGE, &["MYSQL_ROOT_PASSWORD=testpass"]).expect("Failed to start MySQL");
    wait_until("MySQL", || exec_sql(name, "SELECT 1").is_ok()).unwrap();

    exec_sql(
        name,
        "CREATE DATABASE shop; CREATE TABLE shop.items (id INT PRIMARY KEY, data TEXT); \
         INSERT INTO shop.items VALUES (1, 'a'), (2, 'b');",
    )
    .unwrap();

    let builder = ConfigBuilder::new().add_mysql(Some(name), None);
    let dir = builder.backup_dir(0).unwrap();
    let (mut config, _temp) = builder.persist();
    config.databases[0].password = Secret::new(PASSWORD);
    let ctx = TestContext::new();

    let report = BackupManager::new(config.clone()).run_cycle();
    assert!(!report.has_failures(), "Backup cycle should succeed: {:?}", report);

    let names = ctx.list_dir(&dir);
    assert_eq!(names.len(), 1, "Only the user database is dumped: {:?}", names);
    assert!(names[0].starts_with("shop_"));

    exec_sql(name, "DELETE FROM shop.items").unwrap();

    let used = RestoreManager::new(None).restore(&config.databases[0], Some("shop"), None);
    assert!(used.is_some());
    assert_eq!(exec_sql(name, "SELECT COUNT(*) FROM shop.items").unwrap(), "2");
}
