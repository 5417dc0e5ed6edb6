use crate::payload::NotificationPayload;
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to encode notification payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to run notify hook {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Exit status of a finished hook process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookExit {
    pub success: bool,
    pub code: Option<i32>,
}

/// What happened to one notification, as recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HookOutcome {
    /// No hook configured.
    Skipped,
    Exited { success: bool, code: Option<i32> },
    /// The hook could not be started.
    Failed { error: String },
}

impl From<HookExit> for HookOutcome {
    fn from(exit: HookExit) -> Self {
        HookOutcome::Exited {
            success: exit.success,
            code: exit.code,
        }
    }
}

/// Delivery target for notifications. Implemented by `CommandHook`
/// (external program) and `RecordingHook` (in memory).
#[async_trait::async_trait]
pub trait Hook: Send + Sync {
    async fn invoke(&self, payload: &NotificationPayload) -> Result<HookExit, HookError>;
}

/// Runs `program [args...] <payload-json>` and waits for it to exit.
///
/// There is no timeout: a hung hook stalls the caller.
#[derive(Debug, Clone)]
pub struct CommandHook {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandHook {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Leading arguments placed before the payload.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

#[async_trait::async_trait]
impl Hook for CommandHook {
    async fn invoke(&self, payload: &NotificationPayload) -> Result<HookExit, HookError> {
        let json = payload.to_json()?;

        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(&json)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| HookError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let exit = HookExit {
            success: output.status.success(),
            code: output.status.code(),
        };
        if !exit.success {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                program = %self.program.display(),
                code = ?exit.code,
                stderr = %truncate(stderr.trim(), 2000),
                "notify hook exited unsuccessfully"
            );
        }
        Ok(exit)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Keeps every payload in memory and reports a fixed exit.
#[derive(Debug, Clone)]
pub struct RecordingHook {
    calls: Arc<Mutex<Vec<NotificationPayload>>>,
    exit: HookExit,
}

impl Default for RecordingHook {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHook {
    pub fn new() -> Self {
        Self::with_exit(HookExit {
            success: true,
            code: Some(0),
        })
    }

    pub fn with_exit(exit: HookExit) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            exit,
        }
    }

    /// Payloads received so far, in invocation order. Clones share the list.
    pub fn calls(&self) -> Vec<NotificationPayload> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Hook for RecordingHook {
    async fn invoke(&self, payload: &NotificationPayload) -> Result<HookExit, HookError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(payload.clone());
        }
        Ok(self.exit)
    }
}
