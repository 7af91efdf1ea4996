//! Persisted per-analysis records and the artifact that holds them.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use vbm_core::AnalysisConfig;
use vbm_fit::RegressionResult;

/// One successful analysis: configuration, estimate and search text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRecord {
    /// Configuration that produced the record.
    #[serde(flatten)]
    pub config: AnalysisConfig,
    /// Searchable summary.
    pub description: String,
    /// Joined filter fragments.
    pub filter_desc: String,
    /// Regression output.
    #[serde(flatten)]
    pub result: RegressionResult,
    /// Vector attached by an [`crate::Embedder`]; non-finite components are
    /// stored as `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<Option<f32>>>,
}

impl CompiledRecord {
    /// Drops non-finite numbers so the record serializes to valid JSON.
    pub fn sanitize(&mut self) {
        self.result.sanitize();
        for value in self.embedding.iter_mut().flatten() {
            if value.map_or(false, |v| !v.is_finite()) {
                *value = None;
            }
        }
    }
}

/// Counters collected over one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Analyses processed.
    pub attempted: usize,
    /// Analyses that produced a record.
    pub succeeded: usize,
    /// Analyses without a record.
    pub failed: usize,
    /// Entries with an unusable configuration.
    pub config_errors: usize,
    /// Analyses below the row threshold.
    pub insufficient_data: usize,
    /// Analyses whose regression failed.
    pub fit_failures: usize,
}

/// Artifact-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Number of records in the artifact.
    pub total_analyses: usize,
    /// RFC 3339 generation timestamp.
    pub generated_date: String,
    /// Provenance tag of the input data.
    pub data_source: String,
    /// Hash of the grid the run was driven by.
    #[serde(default)]
    pub grid_hash: String,
    /// Run counters.
    #[serde(default)]
    pub stats: RunStats,
}

/// Serialized output of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultArtifact {
    /// Records in grid order.
    pub analyses: Vec<CompiledRecord>,
    /// Run metadata.
    pub metadata: RunMetadata,
}

impl ResultArtifact {
    /// Assembles a sanitized artifact stamped with the current time.
    pub fn new(
        mut analyses: Vec<CompiledRecord>,
        data_source: impl Into<String>,
        grid_hash: impl Into<String>,
        stats: RunStats,
    ) -> Self {
        analyses.iter_mut().for_each(CompiledRecord::sanitize);
        let metadata = RunMetadata {
            total_analyses: analyses.len(),
            generated_date: Utc::now().to_rfc3339(),
            data_source: data_source.into(),
            grid_hash: grid_hash.into(),
            stats,
        };
        Self { analyses, metadata }
    }
}
