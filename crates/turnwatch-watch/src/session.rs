use crate::WatchError;
use std::path::{Path, PathBuf};
use turnwatch_notify::Notifier;
use turnwatch_transcript::{
    extract_completions, parse_records, resolve_session_id, CompletionFilter, LineBuffer,
    TailCursor,
};

/// Per-tick counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub bytes_read: u64,
    pub notified: usize,
}

impl TickStats {
    pub fn absorb(&mut self, other: TickStats) {
        self.bytes_read += other.bytes_read;
        self.notified += other.notified;
    }
}

/// State of one streaming watch: the resolved session, how far the file
/// has been consumed, and any half-written line carried to the next tick.
#[derive(Debug)]
pub struct WatchSession {
    path: PathBuf,
    session_id: String,
    cursor: TailCursor,
    lines: LineBuffer,
}

impl WatchSession {
    /// Read the file once and resolve its session id.
    ///
    /// The cursor starts at the end of what was read, so history is never
    /// notified. An unterminated tail stays buffered and is completed by a
    /// later tick. Returns `Ok(None)` when the file has no session id yet.
    pub fn open(path: &Path) -> Result<Option<Self>, WatchError> {
        let data = std::fs::read(path).map_err(|source| WatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(session_id) = resolve_session_id(parse_records(&data)) else {
            return Ok(None);
        };

        let mut lines = LineBuffer::new();
        lines.push(&data);

        tracing::debug!(
            path = %path.display(),
            session_id = %session_id,
            offset = data.len(),
            pending = lines.pending_len(),
            "watch session opened"
        );

        Ok(Some(Self {
            path: path.to_path_buf(),
            session_id,
            cursor: TailCursor::new(data.len() as u64),
            lines,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn offset(&self) -> u64 {
        self.cursor.offset()
    }

    /// Consume newly appended bytes and notify each completion in order.
    ///
    /// A failed stat or read counts as "no new data"; the next tick retries.
    pub async fn tick(&mut self, notifier: &Notifier) -> TickStats {
        let delta = match self.cursor.poll(&self.path) {
            Ok(Some(delta)) => delta,
            Ok(None) => return TickStats::default(),
            Err(e) => {
                tracing::debug!(error = %e, path = %self.path.display(), "poll failed, retrying next tick");
                return TickStats::default();
            }
        };

        let mut stats = TickStats {
            bytes_read: delta.len() as u64,
            notified: 0,
        };

        let complete = self.lines.push(&delta);
        for completion in extract_completions(parse_records(&complete), CompletionFilter::default())
        {
            notifier
                .notify(&self.session_id, &completion, &self.path)
                .await;
            stats.notified += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{append, complete_line, META};
    use turnwatch_notify::RecordingHook;

    #[test]
    fn open_without_meta_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(&path, &format!("{}\n", complete_line("t1", "2025-01-01T00:00:00Z")));
        assert!(WatchSession::open(&path).unwrap().is_none());
    }

    #[test]
    fn open_missing_file_is_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = WatchSession::open(&tmp.path().join("absent.jsonl")).unwrap_err();
        assert!(matches!(err, WatchError::Read { .. }));
    }

    #[tokio::test]
    async fn history_is_skipped_and_appends_are_notified() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(
            &path,
            &format!("{META}\n{}\n", complete_line("old", "2025-01-01T00:00:00Z")),
        );

        let hook = RecordingHook::new();
        let notifier = Notifier::new().with_hook(hook.clone());
        let mut session = WatchSession::open(&path).unwrap().unwrap();
        assert_eq!(session.session_id(), "sess-1");

        assert_eq!(session.tick(&notifier).await, TickStats::default());

        append(&path, &format!("{}\n", complete_line("new", "2025-01-01T00:00:01Z")));
        let stats = session.tick(&notifier).await;
        assert_eq!(stats.notified, 1);

        let calls = hook.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].thread_id, "sess-1");
        assert_eq!(calls[0].turn_id.to_string(), "new");
        assert_eq!(calls[0].last_assistant_message, "msg new");
    }

    #[tokio::test]
    async fn half_written_line_is_notified_once_completed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(&path, &format!("{META}\n"));

        let hook = RecordingHook::new();
        let notifier = Notifier::new().with_hook(hook.clone());
        let mut session = WatchSession::open(&path).unwrap().unwrap();

        let line = complete_line("split", "2025-01-01T00:00:00Z");
        let (head, tail) = line.split_at(line.len() / 2);

        append(&path, head);
        assert_eq!(session.tick(&notifier).await.notified, 0);

        append(&path, &format!("{tail}\n"));
        assert_eq!(session.tick(&notifier).await.notified, 1);
        assert_eq!(hook.calls()[0].turn_id.to_string(), "split");
        assert_eq!(session.offset(), std::fs::metadata(&path).unwrap().len());
    }

    #[tokio::test]
    async fn malformed_line_does_not_block_following_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(&path, &format!("{META}\n"));

        let hook = RecordingHook::new();
        let notifier = Notifier::new().with_hook(hook.clone());
        let mut session = WatchSession::open(&path).unwrap().unwrap();

        append(
            &path,
            &format!("{{broken\n{}\n", complete_line("ok", "2025-01-01T00:00:00Z")),
        );
        assert_eq!(session.tick(&notifier).await.notified, 1);
        assert_eq!(hook.calls()[0].turn_id.to_string(), "ok");
    }

    #[tokio::test]
    async fn later_session_meta_does_not_change_identity() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(&path, &format!("{META}\n"));

        let hook = RecordingHook::new();
        let notifier = Notifier::new().with_hook(hook.clone());
        let mut session = WatchSession::open(&path).unwrap().unwrap();

        append(
            &path,
            &format!(
                "{}\n{}\n",
                r#"{"type":"session_meta","payload":{"id":"other"}}"#,
                complete_line("t", "2025-01-01T00:00:00Z")
            ),
        );
        session.tick(&notifier).await;
        assert_eq!(hook.calls()[0].thread_id, "sess-1");
    }

    #[tokio::test]
    async fn deleted_file_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(&path, &format!("{META}\n"));

        let notifier = Notifier::new();
        let mut session = WatchSession::open(&path).unwrap().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(session.tick(&notifier).await, TickStats::default());
    }
}
