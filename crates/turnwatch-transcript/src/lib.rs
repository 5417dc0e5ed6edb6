mod cursor;
mod extract;
mod lines;
mod record;

pub use cursor::TailCursor;
pub use extract::{
    extract_completions, resolve_session_id, CompletionFilter, TurnCompletion,
};
pub use lines::{split_lines, LineBuffer, DEFAULT_MAX_PENDING};
pub use record::{parse_record, parse_records, EventRecord, TurnId};
