//! File-based locking to prevent concurrent backup cycles

use anyhow::{Context, Result};
use fd_lock::RwLock;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Lock file path for an instance name
pub fn lock_path(lock_dir: &Path, name: &str) -> PathBuf {
    lock_dir.join(format!("db-backup-manager-{}.lock", name))
}

/// Run `f` while holding an exclusive lock on the instance lock file
///
/// Fails immediately if another process holds the lock.
pub fn with_instance_lock<T, F>(lock_dir: &Path, name: &str, f: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    let path = lock_path(lock_dir, name);
    debug!("Attempting to acquire lock: {:?}", path);

    std::fs::create_dir_all(lock_dir).context("Failed to create lock directory")?;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .with_context(|| format!("Failed to open lock file: {:?}", path))?;

    let mut lock = RwLock::new(file);
    let guard = lock
        .try_write()
        .with_context(|| format!("Instance '{}' is already running (lock held: {:?})", name, path))?;

    info!("Acquired instance lock: {:?}", path);
    let result = f();
    drop(guard);
    debug!("Released instance lock: {:?}", path);

    Ok(result)
}
