//! The models passed in and out of a single chat turn.
use serde::{Deserialize, Serialize};

use crate::admission::Denial;
use crate::core::usage::UsageSnapshot;
use crate::directives::InteractionEvent;
use crate::openai::{Message, ModelError, Role};

/// A previous message in the visitor's conversation as sent by the
/// client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl From<&HistoryEntry> for Message {
    fn from(entry: &HistoryEntry) -> Self {
        Message::new(entry.role, &entry.content)
    }
}

/// Everything needed to answer one visitor message.
#[derive(Clone, Debug, Default)]
pub struct ChatTurn {
    pub message: Option<String>,
    /// Who is asking, usually the client IP.
    pub client: String,
    pub session_id: Option<String>,
    pub history: Vec<HistoryEntry>,
}

impl ChatTurn {
    pub fn new(message: &str, client: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            client: client.to_string(),
            ..Default::default()
        }
    }

    pub fn session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    pub fn history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    /// Per-minute limits apply to each session of a client.
    pub fn session_key(&self) -> String {
        format!(
            "{}-{}",
            self.client,
            self.session_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .unwrap_or("default")
        )
    }

    /// Daily limits apply to the client across all sessions.
    pub fn client_key(&self) -> &str {
        &self.client
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChatReply {
    pub message: String,
    pub events: Vec<InteractionEvent>,
    pub usage: UsageSnapshot,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Message is required")]
    MessageRequired,
    #[error("Request denied: {}", .0.error())]
    Denied(Denial),
    #[error(transparent)]
    QuotaExhausted(ModelError),
}

