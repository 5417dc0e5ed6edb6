use crate::Cli;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::OffsetDateTime;
use turnwatch_store::WatchPaths;

pub const DEFAULT_POLL_MS: u64 = 100;

// ── File layer ──

/// Contents of `.turnwatch/config.json`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    /// Hook program followed by leading args; the payload is appended last.
    pub notify_command: Option<Vec<String>>,
    pub poll_ms: Option<u64>,
    pub audit: Option<bool>,
}

impl FileConfig {
    /// Missing file yields defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

// ── Resolved settings ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// Effective settings after layering flags over the config file.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub once: bool,
    pub base_dir: PathBuf,
    pub paths: WatchPaths,
    pub hook: Option<HookCommand>,
    pub poll_interval: Duration,
    pub audit: bool,
    pub since: Option<OffsetDateTime>,
    pub rollout: Option<PathBuf>,
    pub sessions_root: Option<PathBuf>,
}

impl WatchConfig {
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        let base_dir = base_dir(cli)?;
        let paths = WatchPaths::discover(&base_dir);
        let file = FileConfig::load(&paths.config_json)?;

        let hook = match &cli.notify_script {
            Some(script) => Some(HookCommand {
                program: absolutize(&cwd, script),
                args: Vec::new(),
            }),
            None => file
                .notify_command
                .as_deref()
                .and_then(|cmd| hook_from_argv(&base_dir, cmd)),
        };

        let poll_ms = cli.poll_ms.or(file.poll_ms).unwrap_or(DEFAULT_POLL_MS).max(1);

        Ok(Self {
            once: cli.once,
            paths,
            hook,
            poll_interval: Duration::from_millis(poll_ms),
            audit: !cli.no_audit && file.audit.unwrap_or(true),
            since: cli.since,
            rollout: cli.file.as_ref().map(|f| absolutize(&cwd, f)),
            sessions_root: cli.sessions_root.as_ref().map(|r| absolutize(&cwd, r)),
            base_dir,
        })
    }
}

/// `--cwd` anchored to the process cwd, or the process cwd itself.
pub fn base_dir(cli: &Cli) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(match &cli.cwd {
        Some(dir) => absolutize(&cwd, dir),
        None => cwd,
    })
}

/// `["node", "hook.js", "--flag"]` → program `node`, args `hook.js --flag`.
/// An empty list or blank program means no hook.
fn hook_from_argv(base_dir: &Path, argv: &[String]) -> Option<HookCommand> {
    let (program, args) = argv.split_first()?;
    if program.trim().is_empty() {
        return None;
    }
    Some(HookCommand {
        program: absolutize(base_dir, Path::new(program)),
        args: args.to_vec(),
    })
}

/// Anchor relative paths with a directory part to `base`. Bare program
/// names are left alone so they are still looked up on `PATH`.
fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.components().count() <= 1 {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
