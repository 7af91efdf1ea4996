//! Two-tier enumeration of analysis configurations.
//!
//! Tier 1 is the full product of the core option lists. Tier 2 adds a fixed
//! set of robustness variants on top of it. Identifiers run sequentially
//! across both tiers, so the same parameters always produce the same grid.

use itertools::iproduct;
use serde::{Deserialize, Serialize};
use vbm_core::{
    analysis_id, AnalysisConfig, ClusterLevel, Cohort, GroupFilter, Outcome, PanelError,
    RaceType, Specification, Tier, TimeWindow,
};

fn default_outcomes() -> Vec<Outcome> {
    Outcome::ALL.to_vec()
}

fn default_specifications() -> Vec<Specification> {
    Specification::ALL.to_vec()
}

fn default_group_filters() -> Vec<Option<GroupFilter>> {
    let groups = ["CA", "UT", "WA"];
    std::iter::once(None)
        .chain(groups.iter().map(|g| Some(GroupFilter::Only(g.to_string()))))
        .chain(groups.iter().map(|g| Some(GroupFilter::Exclude(g.to_string()))))
        .collect()
}

fn default_time_windows() -> Vec<Option<TimeWindow>> {
    vec![
        None,
        Some(TimeWindow::new(1996, 2018)),
        Some(TimeWindow::new(2018, 2024)),
        Some(TimeWindow::new(1996, 2022)),
    ]
}

fn default_weighted() -> Vec<bool> {
    vec![false, true]
}

fn default_pooled_and_turnout() -> Vec<Outcome> {
    vec![Outcome::Pooled, Outcome::Turnout]
}

fn default_size_specifications() -> Vec<Specification> {
    vec![Specification::Basic, Specification::Linear]
}

fn default_cohort_outcomes() -> Vec<Outcome> {
    vec![Outcome::Race(RaceType::Pres), Outcome::Turnout]
}

fn default_cohorts() -> Vec<Cohort> {
    [2018, 2020, 2022, 2024].into_iter().map(Cohort::Adopted).collect()
}

fn default_cohort_group() -> String {
    "CA".to_string()
}

/// Option lists for the robustness tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobustnessParams {
    /// Outcomes re-run with group-level clustering.
    #[serde(default = "default_pooled_and_turnout")]
    pub cluster_outcomes: Vec<Outcome>,
    /// Outcomes re-run with each size exclusion.
    #[serde(default = "default_pooled_and_turnout")]
    pub size_outcomes: Vec<Outcome>,
    /// Specifications used for the size exclusions.
    #[serde(default = "default_size_specifications")]
    pub size_specifications: Vec<Specification>,
    /// Outcomes run per adoption cohort.
    #[serde(default = "default_cohort_outcomes")]
    pub cohort_outcomes: Vec<Outcome>,
    /// Adoption cohorts.
    #[serde(default = "default_cohorts")]
    pub cohorts: Vec<Cohort>,
    /// Group the cohort analyses are restricted to.
    #[serde(default = "default_cohort_group")]
    pub cohort_group: String,
}

impl Default for RobustnessParams {
    fn default() -> Self {
        Self {
            cluster_outcomes: default_pooled_and_turnout(),
            size_outcomes: default_pooled_and_turnout(),
            size_specifications: default_size_specifications(),
            cohort_outcomes: default_cohort_outcomes(),
            cohorts: default_cohorts(),
            cohort_group: default_cohort_group(),
        }
    }
}

/// Option lists driving [`generate_grid`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridParams {
    /// Tier 1 outcomes.
    #[serde(default = "default_outcomes")]
    pub outcomes: Vec<Outcome>,
    /// Specifications, shared by tier 1 and the clustering variants.
    #[serde(default = "default_specifications")]
    pub specifications: Vec<Specification>,
    /// Tier 1 group filters; `None` is the full sample.
    #[serde(default = "default_group_filters")]
    pub group_filters: Vec<Option<GroupFilter>>,
    /// Tier 1 time windows; `None` covers every year.
    #[serde(default = "default_time_windows")]
    pub time_windows: Vec<Option<TimeWindow>>,
    /// Tier 1 weighting options.
    #[serde(default = "default_weighted")]
    pub weighted: Vec<bool>,
    /// Tier 2 option lists.
    #[serde(default)]
    pub robustness: RobustnessParams,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            outcomes: default_outcomes(),
            specifications: default_specifications(),
            group_filters: default_group_filters(),
            time_windows: default_time_windows(),
            weighted: default_weighted(),
            robustness: RobustnessParams::default(),
        }
    }
}

/// Whether `outcome` is observable under `group_filter`.
///
/// An outcome tied to a home group cannot be estimated on a sample that
/// keeps only another group or drops the home group.
pub fn is_valid_combination(outcome: Outcome, group_filter: &Option<GroupFilter>) -> bool {
    match (outcome.home_group(), group_filter) {
        (Some(home), Some(GroupFilter::Only(group))) => group == home,
        (Some(home), Some(GroupFilter::Exclude(group))) => group != home,
        _ => true,
    }
}

struct Draft {
    tier: Tier,
    outcome: Outcome,
    specification: Specification,
    group_filter: Option<GroupFilter>,
    time_window: Option<TimeWindow>,
    weighted: bool,
    cluster_level: ClusterLevel,
    exclude_large: bool,
    exclude_small: bool,
    cohort_filter: Option<Cohort>,
}

impl Draft {
    fn robustness(outcome: Outcome, specification: Specification) -> Self {
        Self {
            tier: Tier::Robustness,
            outcome,
            specification,
            group_filter: None,
            time_window: None,
            weighted: false,
            cluster_level: ClusterLevel::Entity,
            exclude_large: false,
            exclude_small: false,
            cohort_filter: None,
        }
    }

    fn finish(self, index: usize) -> AnalysisConfig {
        AnalysisConfig {
            id: analysis_id(index),
            tier: self.tier,
            outcome: self.outcome,
            specification: self.specification,
            group_filter: self.group_filter,
            time_window: self.time_window,
            weighted: self.weighted,
            cluster_level: self.cluster_level,
            exclude_large: self.exclude_large,
            exclude_small: self.exclude_small,
            cohort_filter: self.cohort_filter,
        }
    }
}

/// Enumerates the grid for `params`.
pub fn generate_grid(params: &GridParams) -> Vec<AnalysisConfig> {
    let core = iproduct!(
        params.outcomes.iter().copied(),
        params.specifications.iter().copied(),
        params.group_filters.iter(),
        params.time_windows.iter().copied(),
        params.weighted.iter().copied()
    )
    .filter(|(outcome, _, group_filter, _, _)| is_valid_combination(*outcome, group_filter))
    .map(|(outcome, specification, group_filter, time_window, weighted)| Draft {
        tier: Tier::Core,
        outcome,
        specification,
        group_filter: group_filter.clone(),
        time_window,
        weighted,
        cluster_level: ClusterLevel::Entity,
        exclude_large: false,
        exclude_small: false,
        cohort_filter: None,
    });

    let robust = &params.robustness;
    let clustering = iproduct!(
        robust.cluster_outcomes.iter().copied(),
        params.specifications.iter().copied()
    )
    .map(|(outcome, specification)| Draft {
        cluster_level: ClusterLevel::Group,
        ..Draft::robustness(outcome, specification)
    });
    let size = iproduct!(
        robust.size_outcomes.iter().copied(),
        robust.size_specifications.iter().copied()
    )
    .flat_map(|(outcome, specification)| {
        [
            Draft {
                exclude_large: true,
                ..Draft::robustness(outcome, specification)
            },
            Draft {
                exclude_small: true,
                ..Draft::robustness(outcome, specification)
            },
        ]
    });
    let cohorts = iproduct!(
        robust.cohort_outcomes.iter().copied(),
        robust.cohorts.iter().copied()
    )
    .map(|(outcome, cohort)| Draft {
        group_filter: Some(GroupFilter::Only(robust.cohort_group.clone())),
        cohort_filter: Some(cohort),
        ..Draft::robustness(outcome, Specification::Basic)
    });

    core.chain(clustering)
        .chain(size)
        .chain(cohorts)
        .enumerate()
        .map(|(index, draft)| draft.finish(index))
        .collect()
}

/// Number of configurations per tier.
pub fn tier_counts(grid: &[AnalysisConfig]) -> (usize, usize) {
    let core = grid.iter().filter(|config| config.tier == Tier::Core).count();
    (core, grid.len() - core)
}

/// Stable hash of a grid, recorded in run metadata.
pub fn grid_hash(grid: &[AnalysisConfig]) -> Result<String, PanelError> {
    vbm_core::stable_hash_string(&grid)
}
