mod cmd_watch;
mod config;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "turnwatch",
    version,
    about = "Notify a hook whenever an agent turn completes in today's rollout log"
)]
pub(crate) struct Cli {
    /// Scan the rollout once for completions since start, then exit
    #[arg(long)]
    once: bool,
    /// Base directory: hook working dir, config and audit logs live under it
    #[arg(long)]
    cwd: Option<PathBuf>,
    /// Notify hook program; receives the payload JSON as its last argument
    #[arg(long)]
    notify_script: Option<PathBuf>,
    /// Poll interval in milliseconds (default: 100)
    #[arg(long)]
    poll_ms: Option<u64>,
    /// Watch this rollout file instead of discovering today's
    #[arg(long)]
    file: Option<PathBuf>,
    /// Sessions root (default: $CODEX_HOME/sessions or ~/.codex/sessions)
    #[arg(long)]
    sessions_root: Option<PathBuf>,
    /// One-shot cutoff as RFC 3339 (default: process start time)
    #[arg(long, value_parser = parse_rfc3339)]
    since: Option<OffsetDateTime>,
    /// Don't append to the audit log
    #[arg(long)]
    no_audit: bool,
}

fn parse_rfc3339(s: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(s, &Rfc3339).map_err(|e| format!("invalid RFC 3339 timestamp: {e}"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TURNWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let started_at = OffsetDateTime::now_utc();
    init_tracing();
    let cli = Cli::parse();

    match cmd_watch::execute(&cli, started_at) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            cmd_watch::record_failure(&cli, &e);
            ExitCode::FAILURE
        }
    }
}
