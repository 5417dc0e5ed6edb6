use crate::WatchError;
use std::path::Path;
use time::OffsetDateTime;
use turnwatch_notify::Notifier;
use turnwatch_transcript::{extract_completions, parse_records, resolve_session_id, CompletionFilter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnceReport {
    /// `None` when the file never announced a session id.
    pub session_id: Option<String>,
    pub notified: usize,
}

/// Scan the whole file once and notify every completion stamped at or
/// after `not_before`, in file order.
///
/// Nothing is remembered between runs: scanning the same file twice
/// notifies the same turns twice.
pub async fn run_once(
    path: &Path,
    notifier: &Notifier,
    not_before: OffsetDateTime,
) -> Result<OnceReport, WatchError> {
    let data = std::fs::read(path).map_err(|source| WatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let Some(session_id) = resolve_session_id(parse_records(&data)) else {
        tracing::info!(path = %path.display(), "no session id in rollout, nothing to notify");
        return Ok(OnceReport::default());
    };

    let mut report = OnceReport {
        session_id: Some(session_id.clone()),
        notified: 0,
    };
    let filter = CompletionFilter::since(not_before);
    for completion in extract_completions(parse_records(&data), filter) {
        notifier.notify(&session_id, &completion, path).await;
        report.notified += 1;
    }

    tracing::debug!(path = %path.display(), notified = report.notified, "one-shot scan finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{append, complete_line, META};
    use time::format_description::well_known::Rfc3339;
    use turnwatch_notify::{AuditLog, RecordingHook};

    fn at(s: &str) -> OffsetDateTime {
        OffsetDateTime::parse(s, &Rfc3339).unwrap()
    }

    #[tokio::test]
    async fn notifies_every_completion_after_start_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(
            &path,
            &format!(
                "{META}\n{}\n{}\n{}\n",
                complete_line("a", "2025-05-05T10:00:00Z"),
                complete_line("b", "2025-05-05T10:00:01Z"),
                complete_line("c", "2025-05-05T10:00:02Z"),
            ),
        );

        let hook = RecordingHook::new();
        let notifier = Notifier::new().with_hook(hook.clone());
        let report = run_once(&path, &notifier, at("2025-05-05T10:00:00Z"))
            .await
            .unwrap();

        assert_eq!(report.session_id.as_deref(), Some("sess-1"));
        assert_eq!(report.notified, 3);
        let turns: Vec<String> = hook.calls().iter().map(|p| p.turn_id.to_string()).collect();
        assert_eq!(turns, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn completion_one_second_before_start_is_excluded() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(
            &path,
            &format!("{META}\n{}\n", complete_line("early", "2025-05-05T09:59:59Z")),
        );

        let hook = RecordingHook::new();
        let notifier = Notifier::new().with_hook(hook.clone());
        let report = run_once(&path, &notifier, at("2025-05-05T10:00:00Z"))
            .await
            .unwrap();

        assert_eq!(report.notified, 0);
        assert!(hook.calls().is_empty());
    }

    #[tokio::test]
    async fn completion_without_timestamp_is_notified() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(
            &path,
            &format!(
                "{META}\n{}\n",
                r#"{"type":"event_msg","payload":{"type":"task_complete","turn_id":"nots"}}"#
            ),
        );

        let hook = RecordingHook::new();
        let notifier = Notifier::new().with_hook(hook.clone());
        let report = run_once(&path, &notifier, OffsetDateTime::now_utc())
            .await
            .unwrap();

        assert_eq!(report.notified, 1);
        assert_eq!(hook.calls()[0].turn_id.to_string(), "nots");
    }

    #[tokio::test]
    async fn missing_turn_id_produces_no_hook_call_or_audit_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(
            &path,
            &format!(
                "{META}\n{}\n",
                r#"{"type":"event_msg","timestamp":"2025-05-05T10:00:05Z","payload":{"type":"task_complete"}}"#
            ),
        );

        let hook = RecordingHook::new();
        let audit = AuditLog::new(tmp.path().join("logs"));
        let notifier = Notifier::new()
            .with_hook(hook.clone())
            .with_audit(audit.clone());
        run_once(&path, &notifier, at("2025-05-05T10:00:00Z"))
            .await
            .unwrap();

        assert!(hook.calls().is_empty());
        assert!(!audit.dir().exists());
    }

    #[tokio::test]
    async fn unresolved_session_notifies_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(&path, &format!("{}\n", complete_line("a", "2025-05-05T10:00:00Z")));

        let hook = RecordingHook::new();
        let notifier = Notifier::new().with_hook(hook.clone());
        let report = run_once(&path, &notifier, at("2025-01-01T00:00:00Z"))
            .await
            .unwrap();

        assert_eq!(report, OnceReport::default());
        assert!(hook.calls().is_empty());
    }

    #[tokio::test]
    async fn running_twice_notifies_twice() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rollout.jsonl");
        append(
            &path,
            &format!("{META}\n{}", complete_line("a", "2025-05-05T10:00:00Z")),
        );

        let hook = RecordingHook::new();
        let notifier = Notifier::new().with_hook(hook.clone());
        let since = at("2025-05-05T00:00:00Z");
        run_once(&path, &notifier, since).await.unwrap();
        run_once(&path, &notifier, since).await.unwrap();

        assert_eq!(hook.calls().len(), 2);
    }
}
