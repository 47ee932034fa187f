mod config;
pub mod usage;

pub use config::{AppConfig, ChatLimits, CostRates, RateLimitConfig};
