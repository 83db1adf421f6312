//! Rough cost estimation for generation calls

use crate::generator::TokenUsage;

/// USD per million tokens: (model prefix, input rate, output rate).
///
/// Matched by prefix so dated snapshots ("gpt-4o-2024-11-20") hit their
/// base model's rate. More specific prefixes come first.
const MODEL_RATES: &[(&str, f64, f64)] = &[
    ("gpt-4o-mini", 0.15, 0.60),
    ("gpt-4o", 2.50, 10.00),
    ("gpt-4.1-mini", 0.40, 1.60),
    ("gpt-4.1", 2.00, 8.00),
];

/// Rate applied when the model is not in the table.
const DEFAULT_RATE: (f64, f64) = (2.50, 10.00);

/// Estimate the USD cost of one generation, linear in token counts.
pub fn estimate_cost(model: &str, tokens: TokenUsage) -> f64 {
    let (input_rate, output_rate) = MODEL_RATES
        .iter()
        .find(|(prefix, _, _)| model.starts_with(prefix))
        .map(|(_, i, o)| (*i, *o))
        .unwrap_or(DEFAULT_RATE);

    (tokens.input_tokens as f64 * input_rate + tokens.output_tokens as f64 * output_rate)
        / 1_000_000.0
}
