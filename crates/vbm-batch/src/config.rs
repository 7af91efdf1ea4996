//! Run configuration loaded from YAML.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vbm_core::{ErrorInfo, PanelError};
use vbm_fit::FitOpts;
use vbm_grid::GridParams;

fn default_min_obs() -> usize {
    20
}

fn default_concurrency() -> usize {
    1
}

fn default_progress_every() -> usize {
    100
}

fn default_data_source() -> String {
    "github.com/andybhall/vbm-replication-extension".to_string()
}

fn default_panel() -> PathBuf {
    PathBuf::from("data/data/processed/analysis_extended.csv")
}

fn default_cohorts() -> Option<PathBuf> {
    Some(PathBuf::from("data/data/extension/california_vbm_adoption.csv"))
}

fn default_output() -> PathBuf {
    PathBuf::from("precomputed/results.json")
}

/// Options governing batch execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOpts {
    /// Minimum rows required after filtering and after outcome preparation.
    #[serde(default = "default_min_obs")]
    pub min_obs: usize,
    /// Worker threads; 1 runs sequentially.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Log progress every this many analyses.
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
    /// Solver convergence settings.
    #[serde(default)]
    pub fit: FitOpts,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            min_obs: default_min_obs(),
            concurrency: default_concurrency(),
            progress_every: default_progress_every(),
            fit: FitOpts::default(),
        }
    }
}

/// Everything a full run needs besides the dataset itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Provenance tag written into the artifact metadata.
    #[serde(default = "default_data_source")]
    pub data_source: String,
    /// Panel CSV.
    #[serde(default = "default_panel")]
    pub panel: PathBuf,
    /// Cohort adoption CSV.
    #[serde(default = "default_cohorts")]
    pub cohorts: Option<PathBuf>,
    /// Artifact destination.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Execution options.
    #[serde(flatten)]
    pub opts: RunOpts,
    /// Grid option lists.
    #[serde(default)]
    pub grid: GridParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_source: default_data_source(),
            panel: default_panel(),
            cohorts: default_cohorts(),
            output: default_output(),
            opts: RunOpts::default(),
            grid: GridParams::default(),
        }
    }
}

/// Loads a run configuration; relative paths stay relative to the working
/// directory.
pub fn load_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, PanelError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        PanelError::Io(
            ErrorInfo::new("config-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    serde_yaml::from_slice(&bytes).map_err(|err| {
        PanelError::Serde(ErrorInfo::new("yaml-deserialize", err.to_string()))
    })
}
