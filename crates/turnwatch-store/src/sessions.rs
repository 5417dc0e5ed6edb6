//! Rollout file discovery under the agent's dated sessions directory.
//!
//! Rollouts are written to `$CODEX_HOME/sessions/YYYY/MM/DD/*.jsonl`
//! (`CODEX_HOME` defaults to `~/.codex`).

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use time::{Date, OffsetDateTime};

/// Return the sessions root, honoring `CODEX_HOME` when set.
pub fn sessions_root() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("CODEX_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(home).join("sessions"));
    }
    dirs::home_dir().map(|home| home.join(".codex").join("sessions"))
}

/// `root/YYYY/MM/DD` for the given date.
pub fn session_dir_for(root: &Path, date: Date) -> PathBuf {
    root.join(format!("{:04}", date.year()))
        .join(format!("{:02}", u8::from(date.month())))
        .join(format!("{:02}", date.day()))
}

/// Today's (UTC) session directory under `root`.
pub fn today_session_dir(root: &Path) -> PathBuf {
    session_dir_for(root, OffsetDateTime::now_utc().date())
}

/// Newest `.jsonl` file in `dir` by modification time.
/// A missing directory is not an error.
pub fn latest_rollout(dir: &Path) -> io::Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut latest: Option<(PathBuf, SystemTime)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) != Some("jsonl") {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        match &latest {
            Some((_, newest)) if modified <= *newest => {}
            _ => latest = Some((path, modified)),
        }
    }

    if let Some((path, _)) = &latest {
        tracing::debug!(path = %path.display(), "selected rollout file");
    }
    Ok(latest.map(|(path, _)| path))
}
