use serde::{Deserialize, Serialize};

use crate::types::{ClusterLevel, Cohort, GroupFilter, Outcome, Specification, Tier, TimeWindow};

/// Formats the zero-padded identifier for the analysis at `index`.
pub fn analysis_id(index: usize) -> String {
    format!("analysis_{index:05}")
}

/// Fully specified description of one regression to run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Sequential identifier, see [`analysis_id`].
    pub id: String,
    /// Generation phase the configuration belongs to.
    pub tier: Tier,
    /// Dependent variable.
    pub outcome: Outcome,
    /// Model specification tier.
    pub specification: Specification,
    /// Optional subsetting on the group attribute.
    pub group_filter: Option<GroupFilter>,
    /// Optional inclusive year window.
    pub time_window: Option<TimeWindow>,
    /// Weight observations by the size measure.
    pub weighted: bool,
    /// Cluster-robust variance granularity.
    pub cluster_level: ClusterLevel,
    /// Drop the five largest entities.
    pub exclude_large: bool,
    /// Drop entities below the cross-entity median size.
    pub exclude_small: bool,
    /// Optional adoption cohort restriction.
    pub cohort_filter: Option<Cohort>,
}
