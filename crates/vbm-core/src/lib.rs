#![deny(missing_docs)]
#![doc = "Core types, errors and the shared panel dataset for the VBM regression grid."]

/// Analysis configuration records.
pub mod analysis;
/// Panel dataset model.
pub mod dataset;
pub mod errors;
/// Canonical hashing helpers.
pub mod hash;
/// Canonical JSON serde helpers.
pub mod serde;
pub mod synthetic;
pub mod types;

pub use analysis::{analysis_id, AnalysisConfig};
pub use dataset::{PanelDataset, PanelRow};
pub use errors::{unknown_token, ErrorInfo, PanelError};
pub use hash::stable_hash_string;
pub use synthetic::SyntheticPanel;
pub use types::{
    ClusterLevel, Cohort, GroupFilter, Outcome, RaceType, Specification, Tier, TimeWindow,
};
