//! Flat regression results and the executor that produces them.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vbm_core::{ClusterLevel, Outcome, Specification};
use vbm_panel::PreparedPanel;

use crate::failure::FitFailure;
use crate::problem::FitProblem;
use crate::projection::{AlternatingProjections, FitOpts};
use crate::solver::{Estimate, FixedEffectsSolver};

/// Model formula in fixest notation.
pub fn formula(outcome: Outcome, specification: Specification) -> String {
    let y = outcome.column();
    match specification {
        Specification::Basic => format!("{y} ~ treat | county_id + state_year"),
        Specification::Linear => {
            format!("{y} ~ treat + i(county_id, year_c) | county_id + state_year")
        }
        Specification::Quadratic => format!(
            "{y} ~ treat + i(county_id, year_c) + i(county_id, year_c2) | county_id + state_year"
        ),
    }
}

/// Short description of the fixed-effects structure.
pub fn specification_desc(specification: Specification) -> &'static str {
    match specification {
        Specification::Basic => "Basic: County FE + State×Year FE",
        Specification::Linear => "Linear Trends: County FE + State×Year FE + County Linear Trends",
        Specification::Quadratic => {
            "Quadratic Trends: County FE + State×Year FE + County Linear + Quadratic Trends"
        }
    }
}

/// Model metadata recorded on every result, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitMetadata {
    /// Model formula.
    pub formula: String,
    /// Fixed-effects structure.
    pub specification_desc: String,
    /// Clustering level.
    pub cluster_level: ClusterLevel,
    /// Human label of the clustering level.
    pub cluster_desc: String,
    /// Whether size weights were applied.
    pub weighted: bool,
}

impl FitMetadata {
    /// Metadata for one model.
    pub fn new(
        outcome: Outcome,
        specification: Specification,
        weighted: bool,
        cluster: ClusterLevel,
    ) -> Self {
        Self {
            formula: formula(outcome, specification),
            specification_desc: specification_desc(specification).to_string(),
            cluster_level: cluster,
            cluster_desc: cluster.label().to_string(),
            weighted,
        }
    }
}

/// Flat regression record.
///
/// On success every numeric field is present and `error` is absent; on
/// failure every numeric field is absent and `error` holds the diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Treatment coefficient.
    pub coefficient: Option<f64>,
    /// Clustered standard error.
    pub std_error: Option<f64>,
    /// Two-sided p-value.
    pub p_value: Option<f64>,
    /// Lower confidence bound.
    pub ci_lower: Option<f64>,
    /// Upper confidence bound.
    pub ci_upper: Option<f64>,
    /// Observations used.
    pub n_obs: Option<usize>,
    /// Distinct entities.
    pub n_clusters: Option<usize>,
    /// Distinct clusters at the chosen level.
    #[serde(default)]
    pub cluster_count: Option<usize>,
    /// Whether the fit produced an estimate.
    pub success: bool,
    /// Failure diagnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Model metadata.
    pub metadata: FitMetadata,
}

impl RegressionResult {
    /// Flattens a solver outcome.
    pub fn from_fit(fit: Result<Estimate, FitFailure>, metadata: FitMetadata) -> Self {
        match fit {
            Ok(estimate) => Self {
                coefficient: Some(estimate.coefficient),
                std_error: Some(estimate.std_error),
                p_value: Some(estimate.p_value),
                ci_lower: Some(estimate.ci_lower),
                ci_upper: Some(estimate.ci_upper),
                n_obs: Some(estimate.n_obs),
                n_clusters: Some(estimate.n_clusters),
                cluster_count: Some(estimate.cluster_count),
                success: true,
                error: None,
                metadata,
            },
            Err(failure) => Self {
                coefficient: None,
                std_error: None,
                p_value: None,
                ci_lower: None,
                ci_upper: None,
                n_obs: None,
                n_clusters: None,
                cluster_count: None,
                success: false,
                error: Some(failure.to_string()),
                metadata,
            },
        }
    }

    /// Checks the success/failure field invariant.
    pub fn is_consistent(&self) -> bool {
        let numbers = [
            self.coefficient,
            self.std_error,
            self.p_value,
            self.ci_lower,
            self.ci_upper,
        ];
        let counts = [self.n_obs, self.n_clusters, self.cluster_count];
        if self.success {
            numbers.iter().all(Option::is_some)
                && counts.iter().all(Option::is_some)
                && self.error.is_none()
        } else {
            numbers.iter().all(Option::is_none)
                && counts.iter().all(Option::is_none)
                && self.error.as_deref().map_or(false, |error| !error.is_empty())
        }
    }

    /// Replaces NaN and infinite numbers with `None`.
    pub fn sanitize(&mut self) {
        for value in [
            &mut self.coefficient,
            &mut self.std_error,
            &mut self.p_value,
            &mut self.ci_lower,
            &mut self.ci_upper,
        ] {
            if value.map_or(false, |v| !v.is_finite()) {
                *value = None;
            }
        }
    }
}

/// Runs one regression per prepared panel through a [`FixedEffectsSolver`].
#[derive(Debug, Clone, Default)]
pub struct RegressionExecutor<S = AlternatingProjections> {
    solver: S,
}

impl RegressionExecutor<AlternatingProjections> {
    /// Executor backed by [`AlternatingProjections`].
    pub fn new(opts: FitOpts) -> Self {
        Self::with_solver(AlternatingProjections::new(opts))
    }
}

impl<S: FixedEffectsSolver> RegressionExecutor<S> {
    /// Executor backed by a custom solver.
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    /// Typed fit of `prepared`.
    pub fn fit(
        &self,
        prepared: &PreparedPanel<'_>,
        specification: Specification,
        weighted: bool,
        cluster: ClusterLevel,
    ) -> Result<Estimate, FitFailure> {
        let problem = FitProblem::from_prepared(prepared, specification, weighted, cluster);
        self.solver.fit(&problem)
    }

    /// Fits `prepared` and flattens the outcome; failures never propagate.
    pub fn execute(
        &self,
        prepared: &PreparedPanel<'_>,
        specification: Specification,
        weighted: bool,
        cluster: ClusterLevel,
    ) -> RegressionResult {
        let metadata = FitMetadata::new(prepared.outcome, specification, weighted, cluster);
        let fit = self.fit(prepared, specification, weighted, cluster);
        if let Err(failure) = &fit {
            debug!(
                formula = %metadata.formula,
                kind = failure.kind.code(),
                "regression failed: {}",
                failure.message
            );
        }
        RegressionResult::from_fit(fit, metadata)
    }
}
