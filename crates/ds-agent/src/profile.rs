//! Per-table profiling results and the run summary

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Structured error for one table's profiling attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileError {
    /// Model the error belongs to
    pub model: String,

    /// What went wrong
    pub message: String,

    /// Whether a fallback artifact was still produced
    pub fallback_used: bool,
}

/// Outcome of one table's profiling pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResult {
    /// Model name
    pub model_name: String,

    /// Whether an enriched artifact was produced
    pub success: bool,

    /// Whether the artifact came from the deterministic fallback
    pub fallback_used: bool,

    /// Wall-clock duration of the attempt in milliseconds
    pub duration_ms: u64,

    /// Artifact file, relative to the artifact root, when one was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,

    /// Structured error when the attempt was not a clean success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProfileError>,
}

/// Aggregate statistics for one orchestrator invocation.
#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    /// Short run identifier
    pub run_id: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Number of tables considered
    pub total: usize,

    /// Tables with an enriched artifact
    pub succeeded: usize,

    /// Tables with a fallback artifact
    pub fallbacks: usize,

    /// Tables with no artifact at all (statistics gathering failed)
    pub failed: usize,

    /// Tables skipped as unchanged
    pub skipped: usize,

    /// Accumulated generation cost estimate in USD
    pub cost_estimate: f64,

    /// Accumulated wall-clock duration in milliseconds
    pub duration_ms: u64,

    /// Every structured error collected during the run
    pub errors: Vec<ProfileError>,

    /// Per-table results
    pub results: Vec<ProfileResult>,
}

impl ProfileSummary {
    /// Create an empty summary for a new run.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            started_at: Utc::now(),
            total: 0,
            succeeded: 0,
            fallbacks: 0,
            failed: 0,
            skipped: 0,
            cost_estimate: 0.0,
            duration_ms: 0,
            errors: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Fold one table's result into the totals.
    pub fn record(&mut self, result: ProfileResult) {
        self.total += 1;
        self.duration_ms += result.duration_ms;
        if result.success {
            self.succeeded += 1;
        } else if result.fallback_used {
            self.fallbacks += 1;
        } else {
            self.failed += 1;
        }
        if let Some(error) = &result.error {
            self.errors.push(error.clone());
        }
        self.results.push(result);
    }

    /// Record a table skipped as unchanged.
    pub fn record_skipped(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    /// Add a generation cost estimate to the running total.
    pub fn add_cost(&mut self, cost: f64) {
        self.cost_estimate += cost;
    }
}

impl Default for ProfileSummary {
    fn default() -> Self {
        Self::new()
    }
}
