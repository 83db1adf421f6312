//! Generative-text trait definition

use crate::error::LlmResult;
use async_trait::async_trait;

/// Token counts reported for one generation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt
    pub input_tokens: u64,

    /// Tokens produced in the completion
    pub output_tokens: u64,
}

/// One successful generation.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generated text
    pub content: String,

    /// Token usage for cost estimation
    pub tokens: TokenUsage,
}

/// Generative-text abstraction consumed by the enrichment pipeline.
///
/// Implementations must be Send + Sync for async operation. A call is
/// attempted exactly once per table per run — retry policy, if any, is
/// the caller's business and the pipeline deliberately has none.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt under a fixed system prompt and budget.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> LlmResult<Generation>;

    /// Model identifier, used for cost estimation and logging.
    fn model_name(&self) -> &str;
}
