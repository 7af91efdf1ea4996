//! Read-only panel dataset shared by every analysis of a batch.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, PanelError};
use crate::types::{Cohort, RaceType};

/// One (entity, year) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    /// Entity identifier (county id).
    pub entity_id: u32,
    /// Entity display name, also the cohort join key.
    pub entity_name: String,
    /// Group label (state).
    pub group: String,
    /// Election year.
    pub year: i32,
    /// Composite group×time key (state_year).
    pub group_time: String,
    /// Binary treatment indicator.
    pub treat: f64,
    /// Democratic share in gubernatorial races.
    pub dem_share_gov: Option<f64>,
    /// Democratic share in presidential races.
    pub dem_share_pres: Option<f64>,
    /// Democratic share in senate races.
    pub dem_share_sen: Option<f64>,
    /// Turnout share.
    pub turnout_share: Option<f64>,
    /// Size measure (citizen voting age population).
    pub size: Option<f64>,
    /// Centered linear time trend.
    pub year_c: f64,
    /// Squared centered time trend.
    pub year_c2: f64,
    /// Adoption cohort joined from the cohort table.
    pub cohort: Cohort,
}

impl PanelRow {
    /// Vote share recorded for a given race type.
    pub fn race_share(&self, race: RaceType) -> Option<f64> {
        match race {
            RaceType::Gov => self.dem_share_gov,
            RaceType::Pres => self.dem_share_pres,
            RaceType::Sen => self.dem_share_sen,
        }
    }
}

/// Immutable panel of observations indexed by (entity, year).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelDataset {
    rows: Vec<PanelRow>,
}

impl PanelDataset {
    /// Builds a dataset, rejecting duplicate (entity, year) pairs and entities
    /// that appear under more than one group.
    pub fn from_rows(rows: Vec<PanelRow>) -> Result<Self, PanelError> {
        let mut seen = BTreeSet::new();
        let mut entity_groups: BTreeMap<u32, &str> = BTreeMap::new();
        for row in &rows {
            if !seen.insert((row.entity_id, row.year)) {
                return Err(PanelError::Data(
                    ErrorInfo::new("duplicate-observation", "entity observed twice in one year")
                        .with_context("entity_id", row.entity_id.to_string())
                        .with_context("year", row.year.to_string()),
                ));
            }
            let group = entity_groups
                .entry(row.entity_id)
                .or_insert(row.group.as_str());
            if *group != row.group {
                return Err(PanelError::Data(
                    ErrorInfo::new("entity-group-conflict", "entity assigned to several groups")
                        .with_context("entity_id", row.entity_id.to_string())
                        .with_context("groups", format!("{},{}", group, row.group)),
                ));
            }
        }
        Ok(Self { rows })
    }

    /// All rows in load order.
    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the dataset holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct entities.
    pub fn entity_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.entity_id)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Distinct group labels in sorted order.
    pub fn groups(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.group.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
