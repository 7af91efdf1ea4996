//! Composable, side-effect free filter pipeline.
//!
//! Steps run in a fixed order (group, time window, cohort, large entities,
//! small entities) and each one sees the output of the previous step. Size
//! based steps therefore rank entities within the already filtered sample.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use vbm_core::{AnalysisConfig, Cohort, GroupFilter, TimeWindow};

use crate::view::{FilterStep, PanelView};

/// Number of entities dropped by `exclude_large`.
pub const LARGE_ENTITY_COUNT: usize = 5;

/// Description used when no filter contributes a fragment.
pub const FULL_SAMPLE: &str = "full sample";

/// Structured filter request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterRequest {
    /// Optional group subsetting.
    #[serde(default)]
    pub group_filter: Option<GroupFilter>,
    /// Optional inclusive year window.
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    /// Optional cohort restriction.
    #[serde(default)]
    pub cohort_filter: Option<Cohort>,
    /// Drop the largest entities.
    #[serde(default)]
    pub exclude_large: bool,
    /// Drop entities below the median size.
    #[serde(default)]
    pub exclude_small: bool,
}

impl FilterRequest {
    /// Steps requested, in application order.
    pub fn steps(&self) -> Vec<FilterStep> {
        let mut steps = Vec::new();
        if let Some(filter) = &self.group_filter {
            steps.push(FilterStep::Group(filter.clone()));
        }
        if let Some(window) = self.time_window {
            steps.push(FilterStep::Time(window));
        }
        if let Some(cohort) = self.cohort_filter {
            steps.push(FilterStep::Cohort(cohort));
        }
        if self.exclude_large {
            steps.push(FilterStep::ExcludeLarge);
        }
        if self.exclude_small {
            steps.push(FilterStep::ExcludeSmall);
        }
        steps
    }
}

impl From<&AnalysisConfig> for FilterRequest {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            group_filter: config.group_filter.clone(),
            time_window: config.time_window,
            cohort_filter: config.cohort_filter,
            exclude_large: config.exclude_large,
            exclude_small: config.exclude_small,
        }
    }
}

/// Applies `request` to `view`, returning the derived view and the joined
/// description fragment.
///
/// Steps already recorded on `view` are not applied again, which makes the
/// pipeline idempotent: applying the same request twice yields the rows of a
/// single application and the same description.
pub fn apply_filters<'a>(
    view: &PanelView<'a>,
    request: &FilterRequest,
) -> (PanelView<'a>, String) {
    let mut current = view.clone();
    let mut fragments = Vec::new();
    for step in request.steps() {
        fragments.push(fragment(&step));
        if current.has_applied(&step) {
            continue;
        }
        current = apply_step(&current, step);
    }
    let description = if fragments.is_empty() {
        FULL_SAMPLE.to_string()
    } else {
        fragments.join(", ")
    };
    (current, description)
}

fn fragment(step: &FilterStep) -> String {
    match step {
        FilterStep::Group(filter) => filter.fragment(),
        FilterStep::Time(window) => window.to_string(),
        FilterStep::Cohort(cohort) => format!("{cohort} VCA cohort only"),
        FilterStep::ExcludeLarge => format!("excluding {LARGE_ENTITY_COUNT} largest counties"),
        FilterStep::ExcludeSmall => "excluding small counties (below median CVAP)".to_string(),
    }
}

fn apply_step<'a>(view: &PanelView<'a>, step: FilterStep) -> PanelView<'a> {
    match step.clone() {
        FilterStep::Group(filter) => view.retain(step, |row| filter.keeps(&row.group)),
        FilterStep::Time(window) => view.retain(step, |row| window.contains(row.year)),
        FilterStep::Cohort(cohort) => view.retain(step, |row| {
            row.cohort != Cohort::Never && row.cohort == cohort
        }),
        FilterStep::ExcludeLarge => {
            let dropped = largest_entities(view, LARGE_ENTITY_COUNT);
            view.retain(step, |row| !dropped.contains(&row.entity_id))
        }
        FilterStep::ExcludeSmall => {
            let dropped = small_entities(view);
            view.retain(step, |row| !dropped.contains(&row.entity_id))
        }
    }
}

/// Median size per entity over the rows of `view`.
///
/// Entities without any finite size value are absent from the map.
pub fn entity_median_sizes(view: &PanelView<'_>) -> BTreeMap<u32, f64> {
    let mut sizes: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for row in view.rows() {
        if let Some(size) = row.size.filter(|value| value.is_finite()) {
            sizes.entry(row.entity_id).or_default().push(size);
        }
    }
    sizes
        .into_iter()
        .filter_map(|(entity, mut values)| median(&mut values).map(|m| (entity, m)))
        .collect()
}

fn largest_entities(view: &PanelView<'_>, count: usize) -> BTreeSet<u32> {
    let mut ranked: Vec<(u32, f64)> = entity_median_sizes(view).into_iter().collect();
    // Ties keep the lower entity id first.
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    ranked.into_iter().take(count).map(|(entity, _)| entity).collect()
}

fn small_entities(view: &PanelView<'_>) -> BTreeSet<u32> {
    let medians = entity_median_sizes(view);
    let mut values: Vec<f64> = medians.values().copied().collect();
    let Some(cutoff) = median(&mut values) else {
        return BTreeSet::new();
    };
    medians
        .into_iter()
        .filter(|(_, size)| *size < cutoff)
        .map(|(entity, _)| entity)
        .collect()
}

/// Median with the two middle values averaged for even lengths.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
