//! Append-only audit log of hook invocations.
//!
//! Writes one JSON line per entry to `<dir>/turns-YYYY-MM-DD.jsonl`, where the
//! date is the UTC date of the entry.

use crate::hook::HookOutcome;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};
use turnwatch_transcript::TurnId;

/// An audit event. Serialized as tagged JSON (`"type": "turn_notified"`, etc.).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    TurnNotified {
        thread_id: String,
        turn_id: TurnId,
        file: String,
        hook: HookOutcome,
    },
    /// Top-level failure of a watcher run.
    WatcherFailed { error: String },
}

/// Wrapper that adds the timestamp to each event.
#[derive(Debug, Serialize)]
pub struct AuditEntry {
    pub ts: String,
    #[serde(flatten)]
    pub event: AuditEvent,
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
}

impl AuditLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Log file for entries written on `date`.
    pub fn path_for(&self, date: Date) -> PathBuf {
        self.dir.join(format!(
            "turns-{:04}-{:02}-{:02}.jsonl",
            date.year(),
            u8::from(date.month()),
            date.day()
        ))
    }

    /// Append one entry stamped with the current time.
    pub fn record(&self, event: AuditEvent) -> std::io::Result<()> {
        self.record_at(OffsetDateTime::now_utc(), event)
    }

    pub fn record_at(&self, now: OffsetDateTime, event: AuditEvent) -> std::io::Result<()> {
        let entry = AuditEntry {
            ts: now.format(&Rfc3339).unwrap_or_default(),
            event,
        };
        let line = serde_json::to_string(&entry)?;
        append_line(&self.path_for(now.date()), &line)
    }
}

/// Append a single line to a file, creating parent dirs if needed.
fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}
