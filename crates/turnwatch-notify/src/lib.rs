mod audit;
mod hook;
mod notifier;
mod payload;

pub use audit::{AuditEntry, AuditEvent, AuditLog};
pub use hook::{CommandHook, Hook, HookError, HookExit, HookOutcome, RecordingHook};
pub use notifier::Notifier;
pub use payload::{NotificationPayload, PLACEHOLDER_INPUT_MESSAGE, SOURCE_TAG};
