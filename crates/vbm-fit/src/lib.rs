#![deny(missing_docs)]
#![doc = "Two-way fixed-effects regression with clustered standard errors for the VBM grid."]

/// Student-t tail probabilities.
pub mod distribution;
pub mod executor;
pub mod failure;
pub mod problem;
pub mod projection;
pub mod solver;

pub use executor::{
    formula, specification_desc, FitMetadata, RegressionExecutor, RegressionResult,
};
pub use failure::{FitFailure, FitFailureKind};
pub use problem::FitProblem;
pub use projection::{AlternatingProjections, FitOpts};
pub use solver::{clustered_estimate, Absorbed, Estimate, FixedEffectsSolver, CI_MULTIPLIER};
