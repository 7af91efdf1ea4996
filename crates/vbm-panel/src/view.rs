use std::collections::BTreeSet;

use vbm_core::{Cohort, GroupFilter, PanelDataset, PanelRow, TimeWindow};

/// A single step of the filter pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterStep {
    /// Subset on the group attribute.
    Group(GroupFilter),
    /// Inclusive year window.
    Time(TimeWindow),
    /// Adoption cohort restriction.
    Cohort(Cohort),
    /// Drop the five largest entities by median size.
    ExcludeLarge,
    /// Drop entities whose median size is below the cross-entity median.
    ExcludeSmall,
}

/// Derived, read-only view over a shared [`PanelDataset`].
///
/// The view keeps row indices into the source and the list of filter steps
/// that produced it, so a step is never applied twice.
#[derive(Debug, Clone)]
pub struct PanelView<'a> {
    dataset: &'a PanelDataset,
    indices: Vec<usize>,
    applied: Vec<FilterStep>,
}

impl<'a> PanelView<'a> {
    /// View covering every row of the dataset.
    pub fn full(dataset: &'a PanelDataset) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
            applied: Vec::new(),
        }
    }

    /// Number of rows in the view.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true when no rows survived.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates over the rows in source order.
    pub fn rows(&self) -> impl Iterator<Item = &'a PanelRow> + '_ {
        let rows = self.dataset.rows();
        self.indices.iter().map(move |&idx| &rows[idx])
    }

    /// Row indices into the source dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Steps applied so far, in order.
    pub fn applied(&self) -> &[FilterStep] {
        &self.applied
    }

    /// Distinct entity identifiers present in the view.
    pub fn entities(&self) -> BTreeSet<u32> {
        self.rows().map(|row| row.entity_id).collect()
    }

    pub(crate) fn has_applied(&self, step: &FilterStep) -> bool {
        self.applied.contains(step)
    }

    pub(crate) fn retain<F>(&self, step: FilterStep, keep: F) -> Self
    where
        F: Fn(&PanelRow) -> bool,
    {
        let rows = self.dataset.rows();
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&idx| keep(&rows[idx]))
            .collect();
        let mut applied = self.applied.clone();
        applied.push(step);
        Self {
            dataset: self.dataset,
            indices,
            applied,
        }
    }
}
