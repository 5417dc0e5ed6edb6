use std::path::{Path, PathBuf};

/// All well-known paths under `<base>/.turnwatch/`.
#[derive(Debug, Clone)]
pub struct WatchPaths {
    pub root: PathBuf,
    pub state_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub locks_dir: PathBuf,
    pub config_json: PathBuf,
}

impl WatchPaths {
    /// Derive all paths from a base directory. Pure computation, no I/O.
    pub fn discover(base: impl Into<PathBuf>) -> Self {
        let root = base.into();
        let state_dir = root.join(".turnwatch");
        Self {
            logs_dir: state_dir.join("logs"),
            locks_dir: state_dir.join("locks"),
            config_json: state_dir.join("config.json"),
            state_dir,
            root,
        }
    }

    /// Lock file guarding a single streaming watcher per rollout file.
    pub fn watch_lock(&self, rollout: &Path) -> PathBuf {
        let stem = rollout
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("rollout");
        self.locks_dir.join(format!("watch.{stem}.lock"))
    }
}
