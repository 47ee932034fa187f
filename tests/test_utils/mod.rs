//! Test utilities for integration tests
#![allow(dead_code)]

use std::env;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, header},
};
use serde_json::Value;
use uuid::Uuid;

use concierge::api::AppState;
use concierge::api::app;
use concierge::core::{AppConfig, ChatLimits, CostRates};
use concierge::openai::{LanguageModel, Message, ModelError};

pub const NAVIGATE_REPLY: &str = "Let me show you! [[NAVIGATE:projects]]";

/// What a `StubModel` answers with.
pub enum Canned {
    Text(String),
    Quota,
    Failure,
}

/// A language model that returns a canned answer and counts calls.
pub struct StubModel {
    reply: Canned,
    calls: AtomicUsize,
}

impl StubModel {
    pub fn new(reply: Canned) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Canned::Text(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, _messages: &[Message]) -> Result<Option<String>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Canned::Text(text) => Ok(Some(text.clone())),
            Canned::Quota => Err(ModelError::QuotaExhausted(
                "You exceeded your current quota".to_string(),
            )),
            Canned::Failure => Err(ModelError::Upstream {
                status: 500,
                message: "Unknown error".to_string(),
            }),
        }
    }
}

/// Config pointing at a fresh directory with a small static site in
/// it.
pub fn test_config() -> AppConfig {
    let dir = env::temp_dir().join(format!("concierge-test-{}", Uuid::new_v4()));
    let static_dir = dir.join("public");
    fs::create_dir_all(&static_dir).expect("Failed to create static directory");
    fs::write(
        static_dir.join("index.html"),
        "<html><body>Welcome to the portfolio</body></html>",
    )
    .expect("Failed to write index.html");
    fs::write(static_dir.join("resume.pdf"), "%PDF-1.4 test resume")
        .expect("Failed to write resume.pdf");

    AppConfig {
        storage_path: dir.display().to_string(),
        static_dir: static_dir.display().to_string(),
        resume_path: String::from("/resume.pdf"),
        profile_path: None,
        openai_api_hostname: String::from("http://localhost:1"),
        openai_api_key: String::from("test-api-key"),
        openai_model: String::from("gpt-3.5-turbo"),
        max_tokens: 500,
        temperature: 0.7,
        limits: ChatLimits::default(),
        cost: CostRates::default(),
    }
}

pub fn test_app_from(config: AppConfig, model: Arc<dyn LanguageModel>) -> Router {
    let app_state = AppState::with_model(config, model).expect("Failed to build app state");
    app(Arc::new(RwLock::new(app_state)))
}

pub fn test_app_with(model: Arc<dyn LanguageModel>) -> Router {
    test_app_from(test_config(), model)
}

/// App whose model always asks to navigate to the projects section.
pub fn test_app() -> Router {
    test_app_with(StubModel::replying(NAVIGATE_REPLY))
}

pub fn chat_request(body: Value) -> Request<Body> {
    chat_request_from("203.0.113.10", body)
}

pub fn chat_request_from(client: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri("/api/chat")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf-8")
}

pub async fn body_to_json(body: Body) -> Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not json")
}
