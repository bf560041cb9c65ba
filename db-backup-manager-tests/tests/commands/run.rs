//! Tests for the 'run' command (one backup cycle)

use db_backup_manager::utils::locker::with_instance_lock;
use serial_test::serial;
use std::sync::Arc;
use test_utils::{
    create_artifact, mysql_database_list, postgres_database_list, today_stamp, BackupManager,
    ConfigBuilder, MockExecutor, MockResponse, RestoreManager, TargetOutcome, TestContext,
};

#[test]
fn test_postgres_container_cycle_and_dedup() {
    let builder = ConfigBuilder::new().add_postgres(Some("my_postgres"), None);
    let dir = builder.backup_dir(0).unwrap();
    let ctx = TestContext::from_builder(builder);

    let mock = MockExecutor::new().expect(
        "psql",
        MockResponse::stdout(&postgres_database_list(&["app", "billing"])),
    );
    let manager = BackupManager::with_executor(ctx.expect_config().clone(), Arc::new(mock.clone()));

    let report = manager.run_cycle();
    assert_eq!(report.completed(), 1);
    assert_eq!(ctx.list_dir(&dir).len(), 4);

    // Every tool ran inside the container
    let dumps = mock.calls_to("pg_dump");
    assert_eq!(dumps.len(), 4);
    assert!(dumps.iter().all(|c| c.in_container()));
    assert!(dumps.iter().all(|c| !c.has_arg("-h")));

    let report = manager.run_cycle();
    assert_eq!(report.skipped(), 1);
    assert_eq!(ctx.list_dir(&dir).len(), 4);
}

#[test]
fn test_mysql_host_cycle_filters_system_schemas() {
    let builder = ConfigBuilder::new().add_mysql(None, None);
    let dir = builder.backup_dir(0).unwrap();
    let ctx = TestContext::from_builder(builder);

    let mock = MockExecutor::new()
        .expect("mysql", MockResponse::stdout(&mysql_database_list(&["shop", "blog"])))
        .expect("mysqldump", MockResponse::stdout("-- dump"));
    let manager = BackupManager::with_executor(ctx.expect_config().clone(), Arc::new(mock.clone()));

    let report = manager.run_cycle();
    assert_eq!(report.files().len(), 2);

    let names = ctx.list_dir(&dir);
    assert!(names[0].starts_with("blog_") && names[0].ends_with(".sql"));
    assert!(names[1].starts_with("shop_") && names[1].ends_with(".sql"));

    for call in mock.get_calls() {
        assert!(!call.line().contains("test-password-123"));
    }
}

#[test]
fn test_existing_backup_for_today_skips_target() {
    let builder = ConfigBuilder::new().add_postgres(None, Some("app"));
    let dir = builder.backup_dir(0).unwrap();
    create_artifact(&dir, "app", &today_stamp(0, 0, 1), ".sql", 0);
    let ctx = TestContext::from_builder(builder);

    let mock = MockExecutor::new();
    let manager = BackupManager::with_executor(ctx.expect_config().clone(), Arc::new(mock.clone()));

    let report = manager.run_cycle();
    assert!(matches!(report.outcomes[0].1, TargetOutcome::Skipped));
    assert!(mock.get_calls().is_empty());
}

#[test]
fn test_failed_host_dump_is_not_mistaken_for_a_backup() {
    let builder = ConfigBuilder::new().add_mysql(None, Some("shop"));
    let dir = builder.backup_dir(0).unwrap();
    let ctx = TestContext::from_builder(builder);
    let config = ctx.expect_config().clone();

    let mock = MockExecutor::new()
        .expect("mysqldump", MockResponse::failure("Got error: 1045", 2))
        .expect("mysqldump", MockResponse::stdout("-- dump"));
    let manager = BackupManager::with_executor(config.clone(), Arc::new(mock.clone()));

    let report = manager.run_cycle();
    assert_eq!(report.failed(), 1);
    assert!(ctx.list_dir(&dir).is_empty());

    // Nothing to restore from, so the live database is never dropped
    let restorer = RestoreManager::with_executor(Arc::new(mock.clone()), None);
    assert_eq!(restorer.restore(&config.databases[0], None, None), None);
    assert!(!mock.was_called("mysql"));

    let report = manager.run_cycle();
    assert_eq!(report.completed(), 1);
    assert_eq!(ctx.list_dir(&dir).len(), 1);
}

#[test]
fn test_timeout_is_reported_as_command_failure() {
    let ctx = TestContext::from_builder(
        ConfigBuilder::new()
            .add_postgres(None, Some("app"))
            .add_mysql(None, Some("shop")),
    );

    let mock = MockExecutor::new()
        .expect("pg_dump", MockResponse::Timeout)
        .expect("mysqldump", MockResponse::stdout("-- dump"));
    let manager = BackupManager::with_executor(ctx.expect_config().clone(), Arc::new(mock.clone()));

    let report = manager.run_cycle();
    assert_eq!(report.failed(), 1);
    assert_eq!(report.completed(), 1);
    match &report.outcomes[0].1 {
        TargetOutcome::Failed(e) => assert!(e.is_command_failure()),
        other => panic!("Expected failure, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_cycle_runs_under_instance_lock() {
    let ctx = TestContext::from_builder(ConfigBuilder::new().add_postgres(None, Some("app")));
    let config = ctx.expect_config().clone();
    let manager = BackupManager::with_executor(config.clone(), Arc::new(MockExecutor::new()));

    let report = with_instance_lock(&config.global.lock_directory, "cycle", || {
        let nested = with_instance_lock(&config.global.lock_directory, "cycle", || ());
        assert!(nested.is_err());
        manager.run_cycle()
    })
    .unwrap();

    assert_eq!(report.completed(), 1);
}
