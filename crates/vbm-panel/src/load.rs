//! CSV loading for the analysis panel and the cohort adoption table.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};
use vbm_core::{Cohort, ErrorInfo, PanelDataset, PanelError, PanelRow};

fn data_error(code: &str, err: impl ToString) -> PanelError {
    PanelError::Data(ErrorInfo::new(code, err.to_string()))
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    state: String,
    county: String,
    county_id: u32,
    year: i32,
    state_year: String,
    treat: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    dem_share_gov: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    dem_share_pres: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    dem_share_sen: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    turnout_share: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    cvap: Option<f64>,
    year_c: f64,
    year_c2: f64,
}

#[derive(Debug, Deserialize)]
struct RawCohort {
    county: String,
    #[serde(default)]
    vca_first_year: String,
}

/// Reads the cohort table keyed by entity name.
///
/// A cell that is neither a year nor `Never` (for example `NA`) leaves the
/// entity as a never-adopter.
pub fn read_cohorts<R: Read>(reader: R) -> Result<BTreeMap<String, Cohort>, PanelError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut cohorts = BTreeMap::new();
    for (line, record) in csv_reader.deserialize::<RawCohort>().enumerate() {
        let record = record.map_err(|err| data_error("cohort-parse", err))?;
        let cohort = record.vca_first_year.parse::<Cohort>().unwrap_or_else(|_| {
            warn!(
                line = line + 2,
                county = %record.county,
                value = %record.vca_first_year,
                "unrecognised cohort value, treating as never adopted"
            );
            Cohort::Never
        });
        cohorts.insert(record.county, cohort);
    }
    Ok(cohorts)
}

/// Reads the panel CSV and joins cohorts by entity name.
///
/// Entities absent from `cohorts` resolve to [`Cohort::Never`].
pub fn read_panel<R: Read>(
    reader: R,
    cohorts: &BTreeMap<String, Cohort>,
) -> Result<PanelDataset, PanelError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for (line, record) in csv_reader.deserialize::<RawObservation>().enumerate() {
        let raw = record.map_err(|err| {
            PanelError::Data(
                ErrorInfo::new("panel-parse", err.to_string())
                    .with_context("line", (line + 2).to_string()),
            )
        })?;
        let cohort = cohorts.get(&raw.county).copied().unwrap_or(Cohort::Never);
        rows.push(PanelRow {
            entity_id: raw.county_id,
            entity_name: raw.county,
            group: raw.state,
            year: raw.year,
            group_time: raw.state_year,
            treat: raw.treat,
            dem_share_gov: raw.dem_share_gov,
            dem_share_pres: raw.dem_share_pres,
            dem_share_sen: raw.dem_share_sen,
            turnout_share: raw.turnout_share,
            size: raw.cvap,
            year_c: raw.year_c,
            year_c2: raw.year_c2,
            cohort,
        });
    }
    PanelDataset::from_rows(rows)
}

/// Loads the panel and optional cohort table from disk.
pub fn load_panel(
    data_path: &Path,
    cohort_path: Option<&Path>,
) -> Result<PanelDataset, PanelError> {
    let cohorts = match cohort_path {
        Some(path) => read_cohorts(open(path)?)?,
        None => BTreeMap::new(),
    };
    let dataset = read_panel(open(data_path)?, &cohorts)?;
    info!(
        observations = dataset.len(),
        entities = dataset.entity_count(),
        cohorts = cohorts.len(),
        "loaded panel dataset"
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<File, PanelError> {
    File::open(path).map_err(|err| {
        PanelError::Data(
            ErrorInfo::new("open", format!("failed to open {}", path.display()))
                .with_hint(err.to_string()),
        )
    })
}
