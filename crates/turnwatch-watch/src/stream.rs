use crate::session::{TickStats, WatchSession};
use crate::WatchError;
use std::path::Path;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use turnwatch_notify::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The file never announced a session id; nothing was polled.
    SessionUnresolved,
    /// Stopped by cancellation, with totals over the whole watch.
    Cancelled(TickStats),
}

/// Tail `path` on a fixed interval until `cancel` fires.
///
/// Each tick runs to completion before the next one is awaited, so ticks
/// never overlap and missed ticks are skipped rather than bunched up.
/// Cancellation is only observed between ticks: a hook that is already
/// running is allowed to finish.
pub async fn run_stream(
    path: &Path,
    notifier: &Notifier,
    poll_interval: Duration,
    cancel: CancellationToken,
) -> Result<StreamOutcome, WatchError> {
    let Some(mut session) = WatchSession::open(path)? else {
        tracing::info!(path = %path.display(), "no session id in rollout, not watching");
        return Ok(StreamOutcome::SessionUnresolved);
    };

    tracing::info!(
        path = %path.display(),
        session_id = session.session_id(),
        poll_ms = poll_interval.as_millis() as u64,
        "watching rollout"
    );

    let mut ticker = tokio::time::interval(poll_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut totals = TickStats::default();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        totals.absorb(session.tick(notifier).await);
    }

    tracing::info!(
        notified = totals.notified,
        bytes_read = totals.bytes_read,
        "watch cancelled"
    );
    Ok(StreamOutcome::Cancelled(totals))
}
