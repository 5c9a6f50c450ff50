//! Process-wide guard against double-opening the same schedule directory.
//!
//! The Ordered Store environment is exclusive per directory; double-opens
//! are rejected outright rather than raced.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::error::SchedulerError;

fn open_dirs() -> &'static Mutex<HashSet<PathBuf>> {
    static OPEN_DIRS: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    OPEN_DIRS.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Registers `path` as open, or fails if another `Scheduler` already holds
/// it. Returns the canonicalized path so callers always key on the same
/// value they registered.
pub fn register(path: &Path) -> Result<PathBuf, SchedulerError> {
    let canonical = path
        .canonicalize()
        .map_err(|e| SchedulerError::InvalidPath(e.to_string()))?;

    let mut dirs = open_dirs().lock();
    if !dirs.insert(canonical.clone()) {
        return Err(SchedulerError::InvalidPath(format!(
            "schedule directory already open: {}",
            canonical.display()
        )));
    }
    Ok(canonical)
}

/// Releases a previously-registered directory. Safe to call on a path that
/// was never registered (idempotent cleanup on the error path).
pub fn deregister(path: &Path) {
    open_dirs().lock().remove(path);
}
