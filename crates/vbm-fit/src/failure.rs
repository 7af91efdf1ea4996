//! Typed solver failures.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vbm_core::{ErrorInfo, PanelError};

/// Reason a single regression could not produce an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitFailureKind {
    /// No rows left once weights were applied.
    EmptySample,
    /// Treatment has no variation left after the fixed effects are removed.
    Collinear,
    /// Alternating projections did not settle within the iteration budget.
    NonConvergence,
    /// Fewer than two clusters at the requested level.
    TooFewClusters,
    /// No residual degrees of freedom remain.
    NoResidualDof,
    /// A derived statistic came out NaN or infinite.
    NonFinite,
}

impl FitFailureKind {
    /// Stable code used in diagnostics.
    pub fn code(self) -> &'static str {
        match self {
            FitFailureKind::EmptySample => "empty-sample",
            FitFailureKind::Collinear => "collinear",
            FitFailureKind::NonConvergence => "non-convergence",
            FitFailureKind::TooFewClusters => "too-few-clusters",
            FitFailureKind::NoResidualDof => "no-residual-dof",
            FitFailureKind::NonFinite => "non-finite",
        }
    }
}

impl fmt::Display for FitFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure returned by a [`crate::FixedEffectsSolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct FitFailure {
    /// Failure category.
    pub kind: FitFailureKind,
    /// Diagnostic detail.
    pub message: String,
}

impl FitFailure {
    /// Builds a failure of the given kind.
    pub fn new(kind: FitFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<FitFailure> for PanelError {
    fn from(failure: FitFailure) -> Self {
        PanelError::Fit(ErrorInfo::new(failure.kind.code(), failure.message))
    }
}
