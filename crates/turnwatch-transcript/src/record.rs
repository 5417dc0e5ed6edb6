//! Rollout JSONL record parsing.
//!
//! Recognized shapes:
//! ```json
//! {"type":"session_meta","payload":{"id":"..."}}
//! {"type":"event_msg","timestamp":"...","payload":{"type":"task_complete","turn_id":"...","last_agent_message":"..."}}
//! ```
//! Every other record parses but is ignored downstream.

use crate::lines::split_lines;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One line of the rollout file.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

impl EventRecord {
    pub fn is_session_meta(&self) -> bool {
        self.kind == "session_meta"
    }

    /// Session id carried by a `session_meta` record. Empty ids don't count.
    pub fn session_id(&self) -> Option<&str> {
        if !self.is_session_meta() {
            return None;
        }
        self.payload
            .get("id")
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn is_task_complete(&self) -> bool {
        self.kind == "event_msg"
            && self.payload.get("type").and_then(|v| v.as_str()) == Some("task_complete")
    }

    pub fn turn_id(&self) -> Option<TurnId> {
        self.payload.get("turn_id").and_then(TurnId::from_value)
    }

    pub fn last_agent_message(&self) -> Option<&str> {
        self.payload
            .get("last_agent_message")
            .and_then(|v| v.as_str())
    }
}

/// Turn identifier, kept in the JSON form it was written in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TurnId {
    Text(String),
    Number(serde_json::Number),
}

impl TurnId {
    /// Accepts a non-empty string or a number; anything else is "missing".
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(TurnId::Text(s.clone())),
            Value::Number(n) => Some(TurnId::Number(n.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnId::Text(s) => f.write_str(s),
            TurnId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Decode one line. Malformed lines are skipped, never fatal.
pub fn parse_record(line: &[u8]) -> Option<EventRecord> {
    match serde_json::from_slice(line) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::trace!(error = %e, len = line.len(), "skipping unparseable line");
            None
        }
    }
}

/// Lazily parse every line of `data`.
pub fn parse_records(data: &[u8]) -> impl Iterator<Item = EventRecord> + '_ {
    split_lines(data).filter_map(parse_record)
}
