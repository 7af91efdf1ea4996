//! Reshapes a filtered view into the rows a regression on one outcome needs.

use vbm_core::{Outcome, PanelRow, RaceType};

use crate::view::PanelView;

/// Observation ready for estimation; every row carries a present outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow<'a> {
    /// Entity identifier.
    pub entity_id: u32,
    /// Group label.
    pub group: &'a str,
    /// Group×time key.
    pub group_time: &'a str,
    /// Election year.
    pub year: i32,
    /// Treatment indicator.
    pub treat: f64,
    /// Linear trend covariate.
    pub year_c: f64,
    /// Quadratic trend covariate.
    pub year_c2: f64,
    /// Size measure used for weighting.
    pub size: Option<f64>,
    /// Race the value was melted from (pooled outcome only).
    pub race: Option<RaceType>,
    /// Outcome value.
    pub value: f64,
}

impl<'a> PreparedRow<'a> {
    fn from_row(row: &'a PanelRow, value: f64, race: Option<RaceType>) -> Self {
        Self {
            entity_id: row.entity_id,
            group: &row.group,
            group_time: &row.group_time,
            year: row.year,
            treat: row.treat,
            year_c: row.year_c,
            year_c2: row.year_c2,
            size: row.size,
            race,
            value,
        }
    }
}

/// Regression-ready rows for a single outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPanel<'a> {
    /// Outcome the rows were prepared for.
    pub outcome: Outcome,
    /// Rows with a present outcome value.
    pub rows: Vec<PreparedRow<'a>>,
}

impl PreparedPanel<'_> {
    /// Number of usable rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when nothing survived preparation.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Prepares `view` for `outcome`.
///
/// The pooled outcome is melted into long format, one block per race type in
/// [`RaceType::ALL`] order, so an (entity, year) can contribute up to three
/// rows. Single-column outcomes keep one row per observation. Missing values
/// are dropped in both cases.
pub fn prepare_outcome<'a>(view: &PanelView<'a>, outcome: Outcome) -> PreparedPanel<'a> {
    let rows = match outcome {
        Outcome::Pooled => RaceType::ALL
            .iter()
            .flat_map(|&race| {
                view.rows().filter_map(move |row| {
                    present(row.race_share(race))
                        .map(|value| PreparedRow::from_row(row, value, Some(race)))
                })
            })
            .collect(),
        Outcome::Turnout => view
            .rows()
            .filter_map(|row| {
                present(row.turnout_share).map(|value| PreparedRow::from_row(row, value, None))
            })
            .collect(),
        Outcome::Race(race) => view
            .rows()
            .filter_map(|row| {
                present(row.race_share(race)).map(|value| PreparedRow::from_row(row, value, None))
            })
            .collect(),
    };
    PreparedPanel { outcome, rows }
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
