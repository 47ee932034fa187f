use std::sync::Arc;

use anyhow::Result;

use crate::admission::AdmissionController;
use crate::ai::chat::Responder;
use crate::ai::profile::SiteProfile;
use crate::core::AppConfig;
use crate::directives::DirectiveParser;
use crate::openai::{CompletionOptions, LanguageModel, OpenAiClient};

pub struct AppState {
    pub config: AppConfig,
    // Shared with the sweep job
    pub admission: AdmissionController,
    pub responder: Arc<Responder>,
}

impl AppState {
    /// State backed by the OpenAI compatible API in `config`.
    pub fn new(config: AppConfig) -> Result<Self> {
        let model = OpenAiClient::new(
            &config.openai_api_hostname,
            &config.openai_api_key,
            CompletionOptions {
                model: config.openai_model.clone(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            },
        );
        Self::with_model(config, Arc::new(model))
    }

    pub fn with_model(config: AppConfig, model: Arc<dyn LanguageModel>) -> Result<Self> {
        let profile = SiteProfile::load_or_default(config.profile_path.as_deref())?;
        let admission = AdmissionController::new(config.limits.clone());
        let responder = Responder::builder(model)
            .admission(admission.clone())
            .parser(DirectiveParser::new(&config.resume_path))
            .profile(profile)
            .cost_rates(config.cost)
            .build()?;

        Ok(Self {
            config,
            admission,
            responder: Arc::new(responder),
        })
    }
}
