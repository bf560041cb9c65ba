//! Test fixtures and sample data
//!
//! Provides artifact files and configuration templates for testing.

use chrono::{Local, NaiveDate};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// `YYYYMMDD_HHMMSS` stamp for today at the given time
pub fn today_stamp(hour: u32, minute: u32, second: u32) -> String {
    format!(
        "{}_{:02}{:02}{:02}",
        Local::now().format("%Y%m%d"),
        hour,
        minute,
        second
    )
}

/// `YYYYMMDD_000000` stamp for a fixed date
pub fn date_stamp(date: NaiveDate) -> String {
    format!("{}_000000", date.format("%Y%m%d"))
}

/// Create `<dir>/<database>_<stamp><ext>` with an mtime `age_secs` in the past
pub fn create_artifact(dir: &Path, database: &str, stamp: &str, ext: &str, age_secs: u64) -> PathBuf {
    fs::create_dir_all(dir).expect("Failed to create artifact dir");
    let path = dir.join(format!("{}_{}{}", database, stamp, ext));
    fs::write(&path, "-- fixture dump\n").expect("Failed to write artifact");
    let mtime = SystemTime::now() - Duration::from_secs(age_secs);
    File::options()
        .write(true)
        .open(&path)
        .and_then(|f| f.set_modified(mtime))
        .expect("Failed to set mtime");
    path
}

/// `psql -t -A` output listing databases, including the admin database
pub fn postgres_database_list(names: &[&str]) -> String {
    std::iter::once("postgres")
        .chain(names.iter().copied())
        .map(|n| format!("{}\n", n))
        .collect()
}

/// `SHOW DATABASES` output with the header row and system schemas
pub fn mysql_database_list(names: &[&str]) -> String {
    ["Database", "information_schema", "mysql", "performance_schema", "sys"]
        .iter()
        .chain(names.iter())
        .map(|n| format!("{}\n", n))
        .collect()
}

/// Minimal valid config TOML with one PostgreSQL container target
pub fn minimal_config_toml() -> &'static str {
    r#"
[[databases]]
type = "postgres"
username = "postgres"
password = "secret"
container = "my_postgres"
backup_dir = "{backup_dir}"
"#
}

/// Config with one target per engine
pub fn multi_engine_config_toml() -> &'static str {
    r#"
[global]
command_timeout_seconds = 120
interval_seconds = 300

[[databases]]
type = "postgres"
username = "postgres"
password = "secret"
container = "my_postgres"
backup_dir = "{backup_dir}/postgres"

[[databases]]
type = "mysql"
username = "root"
password = "secret"
host = "127.0.0.1"
port = 3306
db = "shop"
backup_dir = "{backup_dir}/mysql"

[[databases]]
type = "mariadb"
username = "root"
password = "secret"
container = "my_mariadb"
backup_dir = "{backup_dir}/mariadb"
"#
}

/// Config in the legacy JSON shape
pub fn legacy_json_config() -> &'static str {
    r#"{
  "databases": [
    {
      "type": "postgres",
      "username": "postgres",
      "password": "secret",
      "container": "my_postgres",
      "backup_dir": "{backup_dir}"
    }
  ]
}"#
}

/// Fill the `{backup_dir}` placeholder
pub fn render(template: &str, backup_dir: &Path) -> String {
    template.replace("{backup_dir}", &backup_dir.display().to_string())
}
