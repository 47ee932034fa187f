//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::ai::chat::HistoryEntry;
use crate::directives::InteractionEvent;

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    // Optional so a missing message is reported as such rather than
    // as a malformed body
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
}

/// Usage as the client sees it. The cost is a decimal string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageInfo {
    pub remaining_per_minute: u32,
    pub remaining_daily: u32,
    pub total_length: usize,
    pub estimated_cost: String,
}

/// A successful reply as read by clients.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatResponse {
    pub message: String,
    #[serde(default)]
    pub events: Vec<InteractionEvent>,
    #[serde(default)]
    pub usage: Option<UsageInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            message: None,
        }
    }

    pub fn with_message(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}

/// The model can't be reached at all. Shaped like a reply with no
/// events so clients can render it the same way.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UnavailableResponse {
    pub error: String,
    pub message: String,
    pub events: Vec<InteractionEvent>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResponse {
    pub error: String,
    pub message: String,
    pub remaining: u32,
    /// Seconds for the per-minute window, hours for the daily one.
    pub reset_in: i64,
    pub limit: u32,
    pub window: String,
}
