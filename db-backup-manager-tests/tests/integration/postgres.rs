//! PostgreSQL integration tests
//!
//! These tests require Docker and verify PostgreSQL backup/restore workflows.
//! Run with: `cargo test -p db-backup-manager-tests --test integration -- --ignored`

use super::common::{exec_in, is_docker_available, start_container, wait_until, ContainerGuard};
use anyhow::Result;
use db_backup_manager::managers::backup::BackupManager;
use db_backup_manager::managers::restore::RestoreManager;
use std::time::Duration;
use test_utils::{ConfigBuilder, TestContext};

const IMAGE: &str = "postgres:15-alpine";

fn start_postgres(name: &str) -> Result<()> {
    start_container(name, IMAGE, &["POSTGRES_PASSWORD=testpass"])?;
    wait_until("PostgreSQL", || {
        exec_in(name, &[], &["pg_isready", "-U", "postgres"]).is_ok()
            && exec_sql(name, "postgres", "SELECT 1").is_ok()
    })
}

fn exec_sql(container: &str, db: &str, sql: &str) -> Result<String> {
    exec_in(
        container,
        &[],
        &["psql", "-U", "postgres", "-d", db, "-t", "-A", "-c", sql],
    )
}

fn seed(container: &str, db: &str, rows: usize) -> Result<()> {
    exec_sql(container, "postgres", &format!("CREATE DATABASE {}", db))?;
    exec_sql(container, db, "CREATE TABLE items (id SERIAL PRIMARY KEY, data TEXT)")?;
    for i in 0..rows {
        exec_sql(container, db, &format!("INSERT INTO items (data) VALUES ('row{}')", i))?;
    }
    Ok(())
}

fn count_rows(container: &str, db: &str) -> Result<usize> {
    let out = exec_sql(container, db, "SELECT COUNT(*) FROM items")?;
    out.parse::<usize>()
        .map_err(|e| anyhow::anyhow!("Failed to parse count: {}", e))
}

/// Full cycle against a containerized PostgreSQL: enumerate, dump, restore
#[test]
#[ignore] // Requires Docker
fn test_postgres_container_backup_and_restore() {
    if !is_docker_available() {
        println!("Docker not available, skipping test");
        return;
    }

    let name = "db-backup-manager-test-postgres";
    let _guard = ContainerGuard::new(name);
    start_postgres(name).expect("Failed to start PostgreSQL");
    seed(name, "app", 2).expect("Failed to seed app");
    seed(name, "billing", 3).expect("Failed to seed billing");

    let builder = ConfigBuilder::new().add_postgres(Some(name), None);
    let dir = builder.backup_dir(0).unwrap();
    let ctx = TestContext::from_builder(builder);
    let config = ctx.expect_config().clone();

    let report = BackupManager::new(config.clone()).run_cycle();
    assert!(!report.has_failures(), "Backup cycle should succeed: {:?}", report);

    let names = ctx.list_dir(&dir);
    assert_eq!(names.len(), 4, "Expected two artifacts per database: {:?}", names);
    let app_sql = names.iter().find(|n| n.starts_with("app_") && n.ends_with(".sql")).unwrap();
    let dump = std::fs::read_to_string(dir.join(app_sql)).unwrap();
    assert!(dump.contains("row1"));

    // Second cycle the same day does nothing
    let report = BackupManager::new(config.clone()).run_cycle();
    assert_eq!(report.skipped(), 1);

    let restore = RestoreManager::new(Some(Duration::from_secs(300)));

    // Archive restore creates the database itself
    exec_sql(name, "postgres", "DROP DATABASE billing").unwrap();
    let used = restore.restore(&config.databases[0], Some("billing"), None);
    assert!(used.unwrap().to_string_lossy().ends_with(".backup"));
    assert_eq!(count_rows(name, "billing").unwrap(), 3);

    // Plain restore drops and recreates
    exec_sql(name, "app", "DELETE FROM items").unwrap();
    let used = restore.restore(&config.databases[0], None, Some(&dir.join(app_sql)));
    assert!(used.is_some());
    assert_eq!(count_rows(name, "app").unwrap(), 2);
}
