//! Solver seam and the clustered-variance estimate shared by every solver.

use serde::{Deserialize, Serialize};

use crate::distribution::student_t_two_sided;
use crate::failure::{FitFailure, FitFailureKind};
use crate::problem::FitProblem;

/// Normal multiplier used for the reported confidence interval.
pub const CI_MULTIPLIER: f64 = 1.96;

/// Residual sum of squares of the absorbed treatment, relative to its raw
/// weighted variation, below which treatment counts as absorbed.
const COLLINEAR_TOLERANCE: f64 = 1e-9;

/// Outcome and treatment with the fixed effects partialled out.
#[derive(Debug, Clone, PartialEq)]
pub struct Absorbed {
    /// Residualized outcome.
    pub y: Vec<f64>,
    /// Residualized treatment.
    pub treat: Vec<f64>,
    /// Number of identified trend coefficients across entities.
    pub trend_params: usize,
    /// Projection sweeps spent on both columns.
    pub sweeps: usize,
}

/// Treatment estimate with CRV1 clustered inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Treatment coefficient.
    pub coefficient: f64,
    /// Clustered standard error.
    pub std_error: f64,
    /// t statistic.
    pub t_stat: f64,
    /// Two-sided p-value with `n_obs - 2` degrees of freedom.
    pub p_value: f64,
    /// Lower bound of the 1.96 interval.
    pub ci_lower: f64,
    /// Upper bound of the 1.96 interval.
    pub ci_upper: f64,
    /// Observations used.
    pub n_obs: usize,
    /// Distinct entities, reported as the cluster count of the panel.
    pub n_clusters: usize,
    /// Distinct clusters at the chosen clustering level.
    pub cluster_count: usize,
}

/// Pluggable fixed-effects estimator.
pub trait FixedEffectsSolver {
    /// Removes the entity and group×time effects from outcome and treatment.
    fn absorb(&self, problem: &FitProblem) -> Result<Absorbed, FitFailure>;

    /// Estimates the treatment effect for `problem`.
    fn fit(&self, problem: &FitProblem) -> Result<Estimate, FitFailure> {
        check_shape(problem)?;
        let absorbed = self.absorb(problem)?;
        clustered_estimate(problem, &absorbed)
    }
}

fn check_shape(problem: &FitProblem) -> Result<(), FitFailure> {
    if problem.is_empty() {
        return Err(FitFailure::new(
            FitFailureKind::EmptySample,
            "no observations with usable weights",
        ));
    }
    if problem.n_clusters < 2 {
        return Err(FitFailure::new(
            FitFailureKind::TooFewClusters,
            format!("need at least 2 clusters, found {}", problem.n_clusters),
        ));
    }
    if problem.len() <= 2 {
        return Err(FitFailure::new(
            FitFailureKind::NoResidualDof,
            format!("{} observations leave no degrees of freedom", problem.len()),
        ));
    }
    Ok(())
}

/// Regresses the absorbed outcome on the absorbed treatment and computes the
/// CRV1 variance with the `G/(G-1) * (N-1)/(N-k)` small-sample factor.
pub fn clustered_estimate(
    problem: &FitProblem,
    absorbed: &Absorbed,
) -> Result<Estimate, FitFailure> {
    let w = &problem.weights;
    let total_weight: f64 = w.iter().sum();
    let mean_treat = w
        .iter()
        .zip(&problem.treat)
        .map(|(wi, xi)| wi * xi)
        .sum::<f64>()
        / total_weight;
    let raw_sxx: f64 = w
        .iter()
        .zip(&problem.treat)
        .map(|(wi, xi)| wi * (xi - mean_treat).powi(2))
        .sum();
    let sxx: f64 = w
        .iter()
        .zip(&absorbed.treat)
        .map(|(wi, xi)| wi * xi * xi)
        .sum();
    if raw_sxx <= 0.0 || sxx <= COLLINEAR_TOLERANCE * raw_sxx {
        return Err(FitFailure::new(
            FitFailureKind::Collinear,
            "treat is collinear with the fixed effects",
        ));
    }
    let sxy: f64 = (0..problem.len())
        .map(|i| w[i] * absorbed.treat[i] * absorbed.y[i])
        .sum();
    let coefficient = sxy / sxx;

    let n = problem.len();
    let k = 1 + absorbed.trend_params;
    if n <= k {
        return Err(FitFailure::new(
            FitFailureKind::NoResidualDof,
            format!("{n} observations for {k} coefficients"),
        ));
    }
    let g = problem.n_clusters;
    let mut scores = vec![0.0; g];
    for i in 0..n {
        let residual = absorbed.y[i] - coefficient * absorbed.treat[i];
        scores[problem.clusters[i]] += w[i] * absorbed.treat[i] * residual;
    }
    let meat: f64 = scores.iter().map(|score| score * score).sum();
    let (g, n, k) = (g as f64, n as f64, k as f64);
    let factor = g / (g - 1.0) * (n - 1.0) / (n - k);
    let std_error = (factor * meat / (sxx * sxx)).sqrt();
    if !coefficient.is_finite() || !std_error.is_finite() || std_error <= 0.0 {
        return Err(FitFailure::new(
            FitFailureKind::NonFinite,
            format!("coefficient {coefficient}, standard error {std_error}"),
        ));
    }
    let t_stat = coefficient / std_error;
    let p_value = student_t_two_sided(t_stat, n - 2.0);
    if !p_value.is_finite() {
        return Err(FitFailure::new(
            FitFailureKind::NonFinite,
            format!("p-value undefined for t = {t_stat}"),
        ));
    }
    Ok(Estimate {
        coefficient,
        std_error,
        t_stat,
        p_value,
        ci_lower: coefficient - CI_MULTIPLIER * std_error,
        ci_upper: coefficient + CI_MULTIPLIER * std_error,
        n_obs: problem.len(),
        n_clusters: problem.n_entities,
        cluster_count: problem.n_clusters,
    })
}
