//! Backup artifact naming and the same-day dedup check
//!
//! Artifacts are named `<database>_<YYYYMMDD>_<HHMMSS>.<ext>`. The timestamp
//! in the name is the only ordering key.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

/// Plain-text logical dump (both engines)
pub const SQL_EXT: &str = ".sql";
/// PostgreSQL custom archive format
pub const ARCHIVE_EXT: &str = ".backup";
/// Extensions the dedup check recognizes
pub const RECOGNIZED_EXTENSIONS: &[&str] = &[SQL_EXT, ARCHIVE_EXT];

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const DATE_TAG_FORMAT: &str = "%Y%m%d";

/// Timestamp string used in artifact names
pub fn timestamp(moment: NaiveDateTime) -> String {
    moment.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time, formatted for an artifact name
pub fn now_timestamp() -> String {
    timestamp(Local::now().naive_local())
}

/// `<dir>/<database>_<timestamp><ext>`
pub fn artifact_path(dir: &Path, database: &str, timestamp: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}_{}{}", database, timestamp, ext))
}

/// Whether a backup for `date` exists in `dir`
///
/// With a database name the file must start with `<database>_<YYYYMMDD>`.
/// Without one any file containing `_<YYYYMMDD>_` counts, since the names
/// are only known after enumeration.
pub fn has_backup_on(dir: &Path, database: Option<&str>, date: NaiveDate) -> bool {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return false,
    };

    let date_tag = date.format(DATE_TAG_FORMAT).to_string();
    let prefix = database.map(|db| format!("{}_{}", db, date_tag));
    let infix = format!("_{}_", date_tag);

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .any(|name| {
            let date_matches = match prefix {
                Some(ref prefix) => name.starts_with(prefix.as_str()),
                None => name.contains(&infix),
            };
            date_matches && RECOGNIZED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        })
}

/// Whether a backup from today (local time) exists in `dir`
pub fn has_today_backup(dir: &Path, database: Option<&str>) -> bool {
    has_backup_on(dir, database, Local::now().date_naive())
}
