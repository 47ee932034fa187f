use anyhow::{Result, anyhow};
use uuid::Uuid;

use crate::ai::chat::HistoryEntry;
use crate::api::public::chat::{ChatRequest, ChatResponse, ErrorResponse};

/// HTTP client for a running concierge server.
#[derive(Clone, Debug)]
pub struct ChatClient {
    client: reqwest::Client,
    api_base_url: String,
    session_id: String,
}

impl ChatClient {
    pub fn new(api_base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            session_id: format!("session_{}", Uuid::new_v4()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a message along with the conversation so far. Non-OK
    /// responses become an error carrying the server's explanation.
    pub async fn send(&self, message: &str, history: Vec<HistoryEntry>) -> Result<ChatResponse> {
        let request = ChatRequest {
            message: Some(message.to_string()),
            session_id: Some(self.session_id.clone()),
            conversation_history: history,
        };
        let resp = self
            .client
            .post(format!("{}/api/chat", self.api_base_url))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|err| err.message.or(Some(err.error)))
                .unwrap_or_else(|| "Failed to send message".to_string());
            tracing::debug!("Chat request failed with {}: {}", status, body);
            return Err(anyhow!(message));
        }

        Ok(serde_json::from_str(&body)?)
    }
}
