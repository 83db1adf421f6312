//! ds-llm - Generative-text enrichment for Datascribe
//!
//! Turns table statistics and declared metadata into narrative
//! documentation through a single generative-text call, with a
//! deterministic fallback template so every requested table always yields
//! an artifact — even when the external service is fully unavailable.

pub mod cost;
pub mod enrich;
pub mod error;
pub mod fallback;
pub mod generator;
pub mod openai;
pub mod prompt;

pub use cost::estimate_cost;
pub use enrich::{Enricher, EnrichmentOutcome, EnrichmentRecord};
pub use error::{LlmError, LlmResult};
pub use fallback::{render_catalog_fallback, render_summary_fallback, render_table_fallback};
pub use generator::{Generation, TextGenerator, TokenUsage};
pub use openai::OpenAiGenerator;
pub use prompt::{build_catalog_prompt, build_summary_prompt, build_table_prompt, SYSTEM_PROMPT};
