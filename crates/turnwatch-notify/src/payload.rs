use serde::Serialize;
use turnwatch_transcript::{TurnCompletion, TurnId};

/// Placeholder for the user input that triggered the turn; the rollout
/// completion record doesn't carry it.
pub const PLACEHOLDER_INPUT_MESSAGE: &str =
    "[notify-fallback] synthesized from rollout task_complete";

pub const SOURCE_TAG: &str = "notify-fallback-watcher";

/// JSON argument handed to the notify hook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    #[serde(rename = "thread-id")]
    pub thread_id: String,
    #[serde(rename = "turn-id")]
    pub turn_id: TurnId,
    #[serde(rename = "input-messages")]
    pub input_messages: Vec<String>,
    #[serde(rename = "last-assistant-message")]
    pub last_assistant_message: String,
    pub source: &'static str,
}

impl NotificationPayload {
    pub fn new(thread_id: &str, completion: &TurnCompletion) -> Self {
        Self {
            thread_id: thread_id.to_string(),
            turn_id: completion.turn_id.clone(),
            input_messages: vec![PLACEHOLDER_INPUT_MESSAGE.to_string()],
            last_assistant_message: completion.last_message.clone().unwrap_or_default(),
            source: SOURCE_TAG,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
