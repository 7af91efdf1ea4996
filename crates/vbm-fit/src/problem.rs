//! Dense, index-compacted regression problem.

use std::collections::BTreeMap;

use vbm_core::{ClusterLevel, Specification};
use vbm_panel::PreparedPanel;

/// Numeric view of a prepared panel that solvers operate on.
///
/// Entities, group×time cells and clusters are mapped to dense indices in
/// sorted key order.
#[derive(Debug, Clone, PartialEq)]
pub struct FitProblem {
    /// Outcome values.
    pub y: Vec<f64>,
    /// Treatment indicator.
    pub treat: Vec<f64>,
    /// Observation weights (all ones when unweighted).
    pub weights: Vec<f64>,
    /// Linear trend covariate.
    pub year_c: Vec<f64>,
    /// Quadratic trend covariate.
    pub year_c2: Vec<f64>,
    /// Dense entity index per row.
    pub entities: Vec<usize>,
    /// Dense group×time index per row.
    pub cells: Vec<usize>,
    /// Dense cluster index per row.
    pub clusters: Vec<usize>,
    /// Number of distinct entities.
    pub n_entities: usize,
    /// Number of distinct group×time cells.
    pub n_cells: usize,
    /// Number of distinct clusters at the chosen level.
    pub n_clusters: usize,
    /// Polynomial degree of the per-entity trend (0, 1 or 2).
    pub trend_degree: usize,
}

fn compact<K: Ord>(keys: impl Iterator<Item = K>) -> (Vec<usize>, usize) {
    let keys: Vec<K> = keys.collect();
    let mut index: BTreeMap<&K, usize> = BTreeMap::new();
    for key in &keys {
        index.entry(key).or_insert(0);
    }
    for (position, slot) in index.values_mut().enumerate() {
        *slot = position;
    }
    let dense = keys.iter().map(|key| index[key]).collect();
    (dense, index.len())
}

impl FitProblem {
    /// Builds the problem, dropping rows without a positive size when
    /// `weighted` is set.
    pub fn from_prepared(
        prepared: &PreparedPanel<'_>,
        specification: Specification,
        weighted: bool,
        cluster: ClusterLevel,
    ) -> Self {
        let rows: Vec<_> = prepared
            .rows
            .iter()
            .filter(|row| {
                !weighted || row.size.map_or(false, |size| size.is_finite() && size > 0.0)
            })
            .collect();
        let weights = rows
            .iter()
            .map(|row| if weighted { row.size.unwrap_or(0.0) } else { 1.0 })
            .collect();
        let (entities, n_entities) = compact(rows.iter().map(|row| row.entity_id));
        let (cells, n_cells) = compact(rows.iter().map(|row| row.group_time));
        let (clusters, n_clusters) = match cluster {
            ClusterLevel::Entity => (entities.clone(), n_entities),
            ClusterLevel::Group => compact(rows.iter().map(|row| row.group)),
            ClusterLevel::GroupTime => (cells.clone(), n_cells),
        };
        Self {
            y: rows.iter().map(|row| row.value).collect(),
            treat: rows.iter().map(|row| row.treat).collect(),
            weights,
            year_c: rows.iter().map(|row| row.year_c).collect(),
            year_c2: rows.iter().map(|row| row.year_c2).collect(),
            entities,
            cells,
            clusters,
            n_entities,
            n_cells,
            n_clusters,
            trend_degree: specification.trend_degree(),
        }
    }

    /// Number of observations entering the fit.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Returns true when no observation is left.
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}
