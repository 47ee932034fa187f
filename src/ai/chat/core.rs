use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::models::{ChatError, ChatReply, ChatTurn};
use crate::admission::{Admission, AdmissionController};
use crate::ai::profile::SiteProfile;
use crate::ai::prompt::system_prompt;
use crate::core::usage::{UsageSnapshot, text_length};
use crate::core::{ChatLimits, CostRates};
use crate::directives::{DirectiveParser, Parsed};
use crate::openai::{LanguageModel, Message, ModelError, Role};

pub const EMPTY_COMPLETION_REPLY: &str =
    "I apologize, but I'm having trouble generating a response.";

pub const MODEL_FAILURE_REPLY: &str = "I apologize, but I'm having trouble connecting to my knowledge base right now. Please try again in a moment.";

/// Answers visitor messages. Each turn is admitted, sent to the
/// model along with the system prompt and the visitor's history, and
/// the reply is split into display text and UI events.
///
/// Use `Responder::builder()` to construct a valid `Responder`.
pub struct Responder {
    admission: AdmissionController,
    model: Arc<dyn LanguageModel>,
    parser: DirectiveParser,
    system_prompt: String,
    rates: CostRates,
}

impl Responder {
    pub fn builder(model: Arc<dyn LanguageModel>) -> ResponderBuilder {
        ResponderBuilder::new(model)
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub async fn handle(&self, turn: ChatTurn) -> Result<ChatReply, ChatError> {
        self.handle_at(turn, Utc::now()).await
    }

    pub async fn handle_at(
        &self,
        turn: ChatTurn,
        now: DateTime<Utc>,
    ) -> Result<ChatReply, ChatError> {
        // Blank messages are refused but others are measured and sent as
        // typed
        let message = match turn.message.as_deref() {
            Some(m) if !m.trim().is_empty() => m,
            _ => return Err(ChatError::MessageRequired),
        };

        let quota = match self.admission.check_at(
            &turn.session_key(),
            turn.client_key(),
            message,
            turn.history.iter().map(|entry| entry.content.as_str()),
            now,
        ) {
            Admission::Allowed(quota) => quota,
            Admission::Denied(denial) => {
                tracing::info!("Denied chat from {}: {}", turn.client, denial.error());
                return Err(ChatError::Denied(denial));
            }
        };

        let mut transcript = Vec::with_capacity(turn.history.len() + 2);
        transcript.push(Message::new(Role::System, &self.system_prompt));
        transcript.extend(turn.history.iter().map(Message::from));
        transcript.push(Message::new(Role::User, message));

        let parsed = match self.model.complete(&transcript).await {
            Ok(Some(raw)) => {
                tracing::debug!("Raw model response: {}", raw);
                self.parser.parse(&raw)
            }
            Ok(None) => {
                tracing::warn!("Model returned no content");
                plain(EMPTY_COMPLETION_REPLY)
            }
            Err(err) if err.is_quota_exhausted() => {
                tracing::error!("Model quota exhausted: {}", err);
                return Err(ChatError::QuotaExhausted(err));
            }
            Err(err) => {
                tracing::error!("Model request failed: {}", err);
                plain(MODEL_FAILURE_REPLY)
            }
        };
        tracing::debug!(
            "Final response: {} ({} event(s))",
            parsed.message,
            parsed.events.len()
        );

        let usage = UsageSnapshot::new(
            &self.rates,
            quota.remaining_per_minute,
            quota.remaining_daily,
            quota.total_length,
            text_length(&parsed.message),
        );

        Ok(ChatReply {
            message: parsed.message,
            events: parsed.events,
            usage,
        })
    }
}

fn plain(message: &str) -> Parsed {
    Parsed {
        message: message.to_string(),
        events: Vec::new(),
    }
}

pub struct ResponderBuilder {
    model: Arc<dyn LanguageModel>,
    admission: Option<AdmissionController>,
    parser: Option<DirectiveParser>,
    profile: Option<SiteProfile>,
    system_prompt: Option<String>,
    rates: CostRates,
}

impl ResponderBuilder {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            admission: None,
            parser: None,
            profile: None,
            system_prompt: None,
            rates: CostRates::default(),
        }
    }

    /// Fails if the system prompt can't be rendered from the profile.
    pub fn build(self) -> Result<Responder> {
        let system_prompt = match self.system_prompt {
            Some(prompt) => prompt,
            None => system_prompt(&self.profile.unwrap_or_default())?,
        };

        Ok(Responder {
            admission: self
                .admission
                .unwrap_or_else(|| AdmissionController::new(ChatLimits::default())),
            model: self.model,
            parser: self.parser.unwrap_or_default(),
            system_prompt,
            rates: self.rates,
        })
    }

    pub fn admission(mut self, admission: AdmissionController) -> Self {
        self.admission = Some(admission);
        self
    }

    pub fn parser(mut self, parser: DirectiveParser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn profile(mut self, profile: SiteProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Use this prompt verbatim instead of rendering one from the
    /// profile.
    pub fn system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = Some(prompt.to_string());
        self
    }

    pub fn cost_rates(mut self, rates: CostRates) -> Self {
        self.rates = rates;
        self
    }
}
