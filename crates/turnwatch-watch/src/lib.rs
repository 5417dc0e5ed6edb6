//! Run-mode drivers: a one-shot pass over a whole rollout file and a
//! streaming loop that tails appended content until cancelled.

mod once;
mod session;
mod stream;

pub use once::{run_once, OnceReport};
pub use session::{TickStats, WatchSession};
pub use stream::{run_stream, StreamOutcome};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("failed to read rollout {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
