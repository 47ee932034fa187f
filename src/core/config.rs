use std::env;
use std::str::FromStr;

use chrono::TimeDelta;

/// A fixed window rate limit: at most `max_requests` per `window_ms`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_ms: i64,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_ms: i64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    pub fn window(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.window_ms)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatLimits {
    pub per_minute: RateLimitConfig,
    pub daily: RateLimitConfig,
    pub max_message_length: usize,
    pub max_conversation_length: usize,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            per_minute: RateLimitConfig::new(10, 60 * 1000),
            daily: RateLimitConfig::new(100, 24 * 60 * 60 * 1000),
            max_message_length: 1000,
            max_conversation_length: 4000,
        }
    }
}

// Rough token approximation and per-1000-token prices used for the
// usage estimate returned with every reply.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostRates {
    pub input_tokens_per_char: f64,
    pub output_tokens_per_char: f64,
    pub input_cost_per_1k_tokens: f64,
    pub output_cost_per_1k_tokens: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            input_tokens_per_char: 0.25,
            output_tokens_per_char: 0.25,
            input_cost_per_1k_tokens: 0.0015,
            output_cost_per_1k_tokens: 0.002,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub static_dir: String,
    pub resume_path: String,
    /// JSON site profile. The built in profile is used when unset.
    pub profile_path: Option<String>,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub limits: ChatLimits,
    pub cost: CostRates,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(val) => val.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {}", name, val);
            default
        }),
        Err(_) => default,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("CONCIERGE_STORAGE_PATH").unwrap_or("./".to_string());
        let static_dir =
            env::var("CONCIERGE_STATIC_DIR").unwrap_or_else(|_| format!("{}/public", storage_path));
        let resume_path = env::var("CONCIERGE_RESUME_PATH")
            .unwrap_or_else(|_| crate::directives::DEFAULT_RESUME_PATH.to_string());
        let profile_path = env::var("CONCIERGE_PROFILE_PATH").ok();
        let openai_api_hostname = env::var("CONCIERGE_LLM_HOST")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key =
            env::var("OPENAI_API_KEY").unwrap_or_else(|_| "thiswontworkforopenai".to_string());
        let openai_model =
            env::var("CONCIERGE_LLM_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let defaults = ChatLimits::default();
        let limits = ChatLimits {
            per_minute: RateLimitConfig::new(
                env_or(
                    "CONCIERGE_MAX_REQUESTS_PER_MINUTE",
                    defaults.per_minute.max_requests,
                ),
                defaults.per_minute.window_ms,
            ),
            daily: RateLimitConfig::new(
                env_or("CONCIERGE_MAX_REQUESTS_PER_DAY", defaults.daily.max_requests),
                defaults.daily.window_ms,
            ),
            max_message_length: env_or(
                "CONCIERGE_MAX_MESSAGE_LENGTH",
                defaults.max_message_length,
            ),
            max_conversation_length: env_or(
                "CONCIERGE_MAX_CONVERSATION_LENGTH",
                defaults.max_conversation_length,
            ),
        };

        Self {
            storage_path,
            static_dir,
            resume_path,
            profile_path,
            openai_api_hostname,
            openai_api_key,
            openai_model,
            max_tokens: env_or("CONCIERGE_LLM_MAX_TOKENS", 500),
            temperature: env_or("CONCIERGE_LLM_TEMPERATURE", 0.7),
            limits,
            cost: CostRates::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn it_uses_defaults_without_env() {
        // SAFETY: serialized with the other env tests
        unsafe {
            env::remove_var("CONCIERGE_MAX_REQUESTS_PER_MINUTE");
            env::remove_var("CONCIERGE_LLM_MODEL");
        }
        let config = AppConfig::default();

        assert_eq!(config.openai_model, "gpt-3.5-turbo");
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.limits, ChatLimits::default());
        assert_eq!(config.limits.per_minute.window(), TimeDelta::seconds(60));
        assert_eq!(config.limits.daily.window(), TimeDelta::hours(24));
    }

    #[test]
    #[serial]
    fn it_reads_limits_from_env() {
        unsafe {
            env::set_var("CONCIERGE_MAX_REQUESTS_PER_MINUTE", "3");
            env::set_var("CONCIERGE_LLM_MODEL", "gpt-4o-mini");
        }
        let config = AppConfig::default();
        unsafe {
            env::remove_var("CONCIERGE_MAX_REQUESTS_PER_MINUTE");
            env::remove_var("CONCIERGE_LLM_MODEL");
        }

        assert_eq!(config.limits.per_minute.max_requests, 3);
        assert_eq!(config.openai_model, "gpt-4o-mini");
    }

    #[test]
    #[serial]
    fn it_ignores_unparseable_values() {
        unsafe {
            env::set_var("CONCIERGE_MAX_REQUESTS_PER_MINUTE", "lots");
        }
        let config = AppConfig::default();
        unsafe {
            env::remove_var("CONCIERGE_MAX_REQUESTS_PER_MINUTE");
        }

        assert_eq!(config.limits.per_minute.max_requests, 10);
    }
}
