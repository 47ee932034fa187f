//! Approximate cost accounting for a chat exchange. Token counts are
//! a fixed fraction of character length rather than real
//! tokenization, which is close enough to show a visitor what their
//! conversation costs.

use serde::{Serialize, Serializer};

use super::CostRates;

/// Estimated cost in dollars of sending `input_length` characters and
/// receiving `output_length` characters.
pub fn estimate_cost(rates: &CostRates, input_length: usize, output_length: usize) -> f64 {
    let input_tokens = (input_length as f64 * rates.input_tokens_per_char).ceil();
    let output_tokens = (output_length as f64 * rates.output_tokens_per_char).ceil();

    let input_cost = (input_tokens / 1000.0) * rates.input_cost_per_1k_tokens;
    let output_cost = (output_tokens / 1000.0) * rates.output_cost_per_1k_tokens;

    input_cost + output_cost
}

/// Character count as seen by the limits and the estimator.
pub fn text_length(text: &str) -> usize {
    text.chars().count()
}

fn six_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.6}", value))
}

/// Remaining quota and cost of the exchange, attached to every reply.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    pub remaining_per_minute: u32,
    pub remaining_daily: u32,
    pub total_length: usize,
    #[serde(serialize_with = "six_decimals")]
    pub estimated_cost: f64,
}

impl UsageSnapshot {
    pub fn new(
        rates: &CostRates,
        remaining_per_minute: u32,
        remaining_daily: u32,
        total_length: usize,
        output_length: usize,
    ) -> Self {
        Self {
            remaining_per_minute,
            remaining_daily,
            total_length,
            estimated_cost: estimate_cost(rates, total_length, output_length),
        }
    }
}
