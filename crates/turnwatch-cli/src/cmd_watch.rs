use crate::config::{self, FileConfig, WatchConfig};
use crate::Cli;
use anyhow::Context;
use std::path::PathBuf;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use turnwatch_notify::{AuditLog, CommandHook, Notifier};
use turnwatch_store::{latest_rollout, sessions_root, today_session_dir, WatchPaths};
use turnwatch_watch::{run_once, run_stream, StreamOutcome};

pub fn execute(cli: &Cli, started_at: OffsetDateTime) -> anyhow::Result<()> {
    let config = WatchConfig::resolve(cli)?;

    let Some(rollout) = locate_rollout(&config)? else {
        tracing::debug!("no rollout file for today, nothing to watch");
        return Ok(());
    };
    let notifier = build_notifier(&config);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    if config.once {
        let since = config.since.unwrap_or(started_at);
        let report = rt.block_on(run_once(&rollout, &notifier, since))?;
        tracing::debug!(
            path = %rollout.display(),
            session_id = ?report.session_id,
            notified = report.notified,
            "one-shot pass done"
        );
        return Ok(());
    }

    let lock_path = config.paths.watch_lock(&rollout);
    let Some(_lock) = turnwatch_store::try_lock_file(&lock_path)
        .with_context(|| format!("failed to lock {}", lock_path.display()))?
    else {
        tracing::info!(path = %rollout.display(), "another watcher already tails this rollout");
        return Ok(());
    };

    let cancel = CancellationToken::new();
    ctrlc_cancel(cancel.clone());

    match rt.block_on(run_stream(&rollout, &notifier, config.poll_interval, cancel))? {
        StreamOutcome::SessionUnresolved => {}
        StreamOutcome::Cancelled(totals) => {
            tracing::debug!(notified = totals.notified, "watcher stopped");
        }
    }
    Ok(())
}

/// Best-effort `watcher_failed` record for an error that ended the run.
/// Honors `--no-audit` and `"audit": false`; an unreadable config file
/// doesn't prevent the record.
pub fn record_failure(cli: &Cli, error: &anyhow::Error) {
    if cli.no_audit {
        return;
    }
    let Ok(base) = config::base_dir(cli) else {
        return;
    };
    let paths = WatchPaths::discover(base);
    let file = FileConfig::load(&paths.config_json).unwrap_or_default();
    if file.audit == Some(false) {
        return;
    }
    Notifier::new()
        .with_audit(AuditLog::new(paths.logs_dir))
        .record_failure(&format!("{error:#}"));
}

fn locate_rollout(config: &WatchConfig) -> anyhow::Result<Option<PathBuf>> {
    if let Some(file) = &config.rollout {
        anyhow::ensure!(file.is_file(), "rollout file not found: {}", file.display());
        return Ok(Some(file.clone()));
    }

    let root = match &config.sessions_root {
        Some(root) => root.clone(),
        None => sessions_root().context("cannot determine sessions directory")?,
    };
    let dir = today_session_dir(&root);
    latest_rollout(&dir).with_context(|| format!("failed to scan {}", dir.display()))
}

fn build_notifier(config: &WatchConfig) -> Notifier {
    let mut notifier = Notifier::new();
    if let Some(hook) = &config.hook {
        notifier = notifier.with_hook(
            CommandHook::new(&hook.program, &config.base_dir).with_args(hook.args.clone()),
        );
    }
    if config.audit {
        notifier = notifier.with_audit(AuditLog::new(&config.paths.logs_dir));
    }
    notifier
}

fn ctrlc_cancel(cancel: CancellationToken) {
    if let Err(e) = ctrlc::set_handler(move || {
        cancel.cancel();
    }) {
        tracing::warn!(error = %e, "failed to install signal handler");
    }
}
