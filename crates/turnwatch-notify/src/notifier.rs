use crate::audit::{AuditEvent, AuditLog};
use crate::hook::{Hook, HookOutcome};
use crate::payload::NotificationPayload;
use std::path::Path;
use turnwatch_transcript::TurnCompletion;

/// Delivers turn completions to the hook and records each delivery.
///
/// Hook and audit failures are logged and swallowed; nothing here stops a
/// watch loop.
#[derive(Default)]
pub struct Notifier {
    hook: Option<Box<dyn Hook>>,
    audit: Option<AuditLog>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook(mut self, hook: impl Hook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    pub fn audit(&self) -> Option<&AuditLog> {
        self.audit.as_ref()
    }

    /// Invoke the hook for one completion and wait for it to finish.
    /// The audit entry is written whether or not a hook is configured.
    pub async fn notify(
        &self,
        session_id: &str,
        completion: &TurnCompletion,
        source_file: &Path,
    ) -> HookOutcome {
        let payload = NotificationPayload::new(session_id, completion);

        let outcome = match &self.hook {
            None => HookOutcome::Skipped,
            Some(hook) => match hook.invoke(&payload).await {
                Ok(exit) => exit.into(),
                Err(e) => {
                    tracing::warn!(error = %e, turn_id = %completion.turn_id, "notify hook failed");
                    HookOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            },
        };
        tracing::debug!(
            session_id,
            turn_id = %completion.turn_id,
            outcome = ?outcome,
            "turn notified"
        );

        if let Some(audit) = &self.audit {
            let event = AuditEvent::TurnNotified {
                thread_id: session_id.to_string(),
                turn_id: completion.turn_id.clone(),
                file: source_file.display().to_string(),
                hook: outcome.clone(),
            };
            if let Err(e) = audit.record(event) {
                tracing::warn!(error = %e, dir = %audit.dir().display(), "failed to append audit entry");
            }
        }

        outcome
    }

    /// Record a top-level failure. Best-effort.
    pub fn record_failure(&self, error: &str) {
        if let Some(audit) = &self.audit {
            let event = AuditEvent::WatcherFailed {
                error: error.to_string(),
            };
            if let Err(e) = audit.record(event) {
                tracing::warn!(error = %e, "failed to append failure record");
            }
        }
    }
}
