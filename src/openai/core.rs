use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Sampling settings sent with every completion request.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The account behind the API key is out of credit. Retrying
    /// won't help until someone tops it up.
    #[error("Model quota exhausted: {0}")]
    QuotaExhausted(String),
    #[error("Model API returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("Model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Invalid model response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl ModelError {
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, ModelError::QuotaExhausted(_))
    }
}

// Error bodies look like
// {"error": {"message": "...", "type": "insufficient_quota", "code": "insufficient_quota"}}
fn upstream_error(status: u16, body: &Value) -> ModelError {
    let error = &body["error"];
    let message = error["message"]
        .as_str()
        .unwrap_or("Unknown error")
        .to_string();
    if error["code"] == "insufficient_quota" || error["type"] == "insufficient_quota" {
        ModelError::QuotaExhausted(message)
    } else {
        ModelError::Upstream { status, message }
    }
}

pub async fn completion(
    client: &reqwest::Client,
    messages: &[Message],
    options: &CompletionOptions,
    api_hostname: &str,
    api_key: &str,
) -> Result<Value, ModelError> {
    let payload = json!({
        "model": options.model,
        "messages": messages,
        "max_tokens": options.max_tokens,
        "temperature": options.temperature,
    });
    let url = format!("{}/v1/chat/completions", api_hostname.trim_end_matches("/"));
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60 * 2))
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let body = serde_json::from_str(&body).unwrap_or(Value::Null);
        return Err(upstream_error(status.as_u16(), &body));
    }

    Ok(serde_json::from_str(&body)?)
}

/// Anything that can turn a transcript into the next assistant
/// message. `Ok(None)` means the model answered without any content.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<Option<String>, ModelError>;
}

/// OpenAI compatible chat completion client.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_hostname: String,
    api_key: String,
    options: CompletionOptions,
}

impl OpenAiClient {
    pub fn new(api_hostname: &str, api_key: &str, options: CompletionOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            options,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<Option<String>, ModelError> {
        let resp = completion(
            &self.client,
            messages,
            &self.options,
            &self.api_hostname,
            &self.api_key,
        )
        .await?;

        Ok(resp["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from))
    }
}
