mod paths;
mod sessions;

pub use paths::WatchPaths;
pub use sessions::{latest_rollout, session_dir_for, sessions_root, today_session_dir};

use fs2::FileExt;
use std::fs;
use std::path::Path;

/// File-based exclusive lock guard. The lock is released on drop.
pub struct LockGuard {
    _file: fs::File,
}

/// Try to take an exclusive lock without blocking. Creates the lock file if needed.
///
/// Returns `Ok(None)` when another process already holds the lock.
pub fn try_lock_file(path: &Path) -> anyhow::Result<Option<LockGuard>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(Some(LockGuard { _file: file })),
        Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
        Err(e) => Err(e.into()),
    }
}
