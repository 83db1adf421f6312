//! Enrichment pipeline
//!
//! Per document the pipeline has two terminal states: `Enriched` (the
//! generation call succeeded) or `Fallback` (anything else). The outcome
//! is an explicit two-variant type rather than an exception crossing the
//! module boundary, which makes the guaranteed-artifact invariant
//! checkable at the type level: both variants carry content.
//!
//! There is no retry and no backoff — a single failure is terminal for
//! that document in that run. A later run may try again.

use crate::cost::estimate_cost;
use crate::fallback::render_table_fallback;
use crate::generator::{TextGenerator, TokenUsage};
use crate::prompt::{build_table_prompt, SYSTEM_PROMPT};
use ds_core::{ModelDocumentation, TableStatisticsProfile};
use std::time::{Duration, Instant};

/// Terminal state of one enrichment attempt. Both variants carry the
/// document content.
#[derive(Debug, Clone)]
pub enum EnrichmentOutcome {
    /// The generation call succeeded
    Enriched {
        content: String,
        tokens: TokenUsage,
    },
    /// The deterministic template was used instead
    Fallback { content: String },
}

impl EnrichmentOutcome {
    /// The document content, whichever way it was produced.
    pub fn content(&self) -> &str {
        match self {
            EnrichmentOutcome::Enriched { content, .. } => content,
            EnrichmentOutcome::Fallback { content } => content,
        }
    }

    /// Whether the fallback path produced this document.
    pub fn fallback_used(&self) -> bool {
        matches!(self, EnrichmentOutcome::Fallback { .. })
    }
}

/// One enrichment attempt with its observability data.
#[derive(Debug)]
pub struct EnrichmentRecord {
    /// Terminal state and content
    pub outcome: EnrichmentOutcome,

    /// Wall-clock duration of the attempt
    pub duration: Duration,

    /// Why the fallback was used, when a generation call actually failed.
    /// `None` for successful generations and for runs with enrichment
    /// disabled (where the fallback is the expected path, not an error).
    pub error: Option<String>,

    /// Estimated USD cost (zero for fallbacks)
    pub cost_estimate: f64,
}

/// Drives generation calls with guaranteed fallback.
pub struct Enricher<'a> {
    generator: Option<&'a dyn TextGenerator>,
    max_tokens: u32,
    temperature: f32,
}

impl<'a> Enricher<'a> {
    /// Create an enricher. `generator: None` disables generation entirely
    /// and every document uses the fallback template.
    pub fn new(generator: Option<&'a dyn TextGenerator>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            generator,
            max_tokens,
            temperature,
        }
    }

    /// Enrich one table profile into documentation.
    pub async fn enrich_table(
        &self,
        profile: &TableStatisticsProfile,
        docs: Option<&ModelDocumentation>,
        business_context: Option<&str>,
    ) -> EnrichmentRecord {
        let prompt = build_table_prompt(profile, docs, business_context);
        let fallback = || render_table_fallback(profile, docs);
        self.enrich(&prompt, fallback).await
    }

    /// Enrich an arbitrary document: try the generation call once, fall
    /// back to `fallback()` on any failure.
    pub async fn enrich(
        &self,
        prompt: &str,
        fallback: impl FnOnce() -> String,
    ) -> EnrichmentRecord {
        let start = Instant::now();

        let Some(generator) = self.generator else {
            return EnrichmentRecord {
                outcome: EnrichmentOutcome::Fallback {
                    content: fallback(),
                },
                duration: start.elapsed(),
                error: None,
                cost_estimate: 0.0,
            };
        };

        match generator
            .generate(prompt, SYSTEM_PROMPT, self.max_tokens, self.temperature)
            .await
        {
            Ok(generation) => {
                let cost = estimate_cost(generator.model_name(), generation.tokens);
                EnrichmentRecord {
                    outcome: EnrichmentOutcome::Enriched {
                        content: generation.content,
                        tokens: generation.tokens,
                    },
                    duration: start.elapsed(),
                    error: None,
                    cost_estimate: cost,
                }
            }
            Err(e) => {
                log::warn!("Generation failed, using fallback: {e}");
                EnrichmentRecord {
                    outcome: EnrichmentOutcome::Fallback {
                        content: fallback(),
                    },
                    duration: start.elapsed(),
                    error: Some(e.to_string()),
                    cost_estimate: 0.0,
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
