//! ds-agent - Context build orchestration for Datascribe
//!
//! Composes the scanner, selector, change detector, statistics gatherer,
//! and enrichment pipeline into two idempotent operations — full build
//! and incremental update — writing documentation artifacts to a target
//! directory.

pub mod artifact;
pub mod error;
pub mod orchestrator;
pub mod profile;

pub use artifact::ArtifactLayout;
pub use error::{AgentError, AgentResult};
pub use orchestrator::{BuildOptions, ContextBuilder, ContextParams, UpdateOptions};
pub use profile::{ProfileError, ProfileResult, ProfileSummary};
