use crate::record::{EventRecord, TurnId};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Resolve the session id from the first `session_meta` record that carries one.
/// Later metadata records are never consulted.
pub fn resolve_session_id<I>(records: I) -> Option<String>
where
    I: IntoIterator<Item = EventRecord>,
{
    records
        .into_iter()
        .find_map(|record| record.session_id().map(str::to_owned))
}

/// A finished turn, derived from an `event_msg` / `task_complete` record.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnCompletion {
    pub turn_id: TurnId,
    pub last_message: Option<String>,
    pub timestamp: Option<OffsetDateTime>,
}

impl TurnCompletion {
    /// `None` unless the record is a task completion with a usable turn id.
    pub fn from_record(record: &EventRecord) -> Option<Self> {
        if !record.is_task_complete() {
            return None;
        }
        let turn_id = record.turn_id()?;
        Some(Self {
            turn_id,
            last_message: record.last_agent_message().map(str::to_owned),
            timestamp: record
                .timestamp
                .as_deref()
                .and_then(|ts| OffsetDateTime::parse(ts, &Rfc3339).ok()),
        })
    }
}

/// Time window applied to completions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionFilter {
    /// When set, completions stamped strictly before this instant are
    /// dropped. A missing or unreadable timestamp never excludes a completion.
    pub not_before: Option<OffsetDateTime>,
}

impl CompletionFilter {
    pub fn since(not_before: OffsetDateTime) -> Self {
        Self {
            not_before: Some(not_before),
        }
    }

    pub fn admits(&self, completion: &TurnCompletion) -> bool {
        match (self.not_before, completion.timestamp) {
            (None, _) => true,
            (Some(cutoff), Some(ts)) => ts >= cutoff,
            (Some(_), None) => true,
        }
    }
}

/// Qualifying completions in file order.
pub fn extract_completions<I>(
    records: I,
    filter: CompletionFilter,
) -> impl Iterator<Item = TurnCompletion>
where
    I: IntoIterator<Item = EventRecord>,
{
    records
        .into_iter()
        .filter_map(|record| TurnCompletion::from_record(&record))
        .filter(move |completion| {
            let admitted = filter.admits(completion);
            if !admitted {
                tracing::trace!(turn_id = %completion.turn_id, "completion outside time window");
            }
            admitted
        })
}
