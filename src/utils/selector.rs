//! Restore file selection

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A candidate backup file with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub size: u64,
}

impl BackupFile {
    pub fn modified_local(&self) -> DateTime<Local> {
        DateTime::<Local>::from(self.modified)
    }
}

/// Files named `<database>_*` ending in one of `extensions`, newest first
pub fn list_backup_files(dir: &Path, database: &str, extensions: &[&str]) -> Vec<BackupFile> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let prefix = format!("{}_", database);

    let mut files: Vec<BackupFile> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            name.starts_with(&prefix) && extensions.iter().any(|ext| name.ends_with(ext))
        })
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            Some(BackupFile {
                path: entry.path(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                size: metadata.len(),
            })
        })
        .collect();

    // Sort by modification time (newest first)
    files.sort_by(|a, b| b.modified.cmp(&a.modified));
    files
}

/// Candidate paths for a database, newest first
pub fn list_candidates(dir: &Path, database: &str, extensions: &[&str]) -> Vec<PathBuf> {
    list_backup_files(dir, database, extensions)
        .into_iter()
        .map(|f| f.path)
        .collect()
}

/// Pick a file by extension preference, then recency
///
/// The preferred extensions are tried in order against the whole list;
/// when none match, the first (most recent) candidate wins.
pub fn choose_latest(candidates: &[PathBuf], preferred: &[&str]) -> Option<PathBuf> {
    preferred
        .iter()
        .find_map(|ext| {
            candidates
                .iter()
                .find(|path| path.to_string_lossy().ends_with(ext))
        })
        .or_else(|| candidates.first())
        .cloned()
}

/// Database name from an artifact file name: text before the first `_`
pub fn database_from_file(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy().to_string();
    let database = name.split('_').next().unwrap_or_default();
    if database.is_empty() {
        None
    } else {
        Some(database.to_string())
    }
}

/// Human readable size such as `12.3KB`
pub fn human_size(size: u64) -> String {
    let mut value = size as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if value < 1024.0 {
            return format!("{:.1}{}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1}PB", value)
}
