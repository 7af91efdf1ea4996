//! Deterministic staggered-adoption panel used by tests and the demo command.
//!
//! Every value is a pure function of (entity, year); there is no random state.

use std::hash::Hasher;

use siphasher::sip::SipHasher13;

use crate::dataset::{PanelDataset, PanelRow};
use crate::errors::PanelError;
use crate::types::Cohort;

/// Shape of a generated panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticPanel {
    /// Group labels with their entity counts.
    pub groups: Vec<(String, usize)>,
    /// First election year.
    pub first_year: i32,
    /// Last election year (inclusive).
    pub last_year: i32,
    /// True treatment effect added to every outcome.
    pub treatment_effect: f64,
    /// Half-width of the deterministic noise band.
    pub noise: f64,
}

impl Default for SyntheticPanel {
    fn default() -> Self {
        Self {
            groups: vec![
                ("CA".to_string(), 20),
                ("UT".to_string(), 10),
                ("WA".to_string(), 12),
            ],
            first_year: 1996,
            last_year: 2024,
            treatment_effect: 0.05,
            noise: 0.004,
        }
    }
}

const CA_COHORTS: [Option<i32>; 5] = [Some(2018), Some(2020), Some(2022), Some(2024), None];

impl SyntheticPanel {
    /// Generates the rows without validating them.
    pub fn rows(&self) -> Vec<PanelRow> {
        let mut rows = Vec::new();
        let mut entity_id = 0u32;
        for (group_idx, (group, count)) in self.groups.iter().enumerate() {
            for local in 0..*count {
                entity_id += 1;
                let adoption = adoption_year(group, local);
                let cohort = match (group.as_str(), adoption) {
                    ("CA", Some(year)) => Cohort::Adopted(year),
                    _ => Cohort::Never,
                };
                let entity_effect = 0.01 * (entity_id % 7) as f64;
                let base_size = 5_000.0 * (1 + (entity_id * 37) % 50) as f64;
                let mut year = self.first_year;
                while year <= self.last_year {
                    let treat = adoption.map_or(0.0, |first| if year >= first { 1.0 } else { 0.0 });
                    let year_c = f64::from(year - 2010);
                    let cell_effect = 0.02 * group_idx as f64 + 0.004 * f64::from((year / 2) % 5);
                    let drift = 0.0005 * year_c;
                    let level = entity_effect + cell_effect + drift + self.treatment_effect * treat;
                    let share = |salt: u64, base: f64| {
                        base + level + self.noise * unit_noise(entity_id, year, salt)
                    };
                    rows.push(PanelRow {
                        entity_id,
                        entity_name: format!("{group} County {:02}", local + 1),
                        group: group.clone(),
                        year,
                        group_time: format!("{group}_{year}"),
                        treat,
                        dem_share_gov: (group == "CA" && year % 4 == 2).then(|| share(1, 0.42)),
                        dem_share_pres: (year % 4 == 0).then(|| share(2, 0.45)),
                        dem_share_sen: ((year / 2) % 3 != 1).then(|| share(3, 0.44)),
                        turnout_share: Some(share(4, 0.55)),
                        size: Some(base_size * (1.0 + 0.01 * f64::from(year - self.first_year))),
                        year_c,
                        year_c2: year_c * year_c,
                        cohort,
                    });
                    year += 2;
                }
            }
        }
        rows
    }

    /// Generates and validates the dataset.
    pub fn build(&self) -> Result<PanelDataset, PanelError> {
        PanelDataset::from_rows(self.rows())
    }
}

fn adoption_year(group: &str, local: usize) -> Option<i32> {
    match group {
        "CA" => CA_COHORTS[local % CA_COHORTS.len()],
        "WA" => Some(2006 + 2 * (local % 4) as i32),
        "UT" => Some(2014 + 2 * (local % 4) as i32),
        _ => None,
    }
}

/// Maps (entity, year, salt) onto `[-1, 1)` through SipHash-1-3 with zero keys.
fn unit_noise(entity_id: u32, year: i32, salt: u64) -> f64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u32(entity_id);
    hasher.write_i32(year);
    hasher.write_u64(salt);
    (hasher.finish() >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
}
