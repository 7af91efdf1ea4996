use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::info;
use vbm_batch::{read_grid, save_results, BatchRunner, ResultArtifact, RunConfig};
use vbm_core::{stable_hash_string, AnalysisConfig, PanelError};
use vbm_grid::generate_grid;
use vbm_panel::load_panel;

use super::load_config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Grid file written by `vbm grid`; the grid is generated when omitted.
    #[arg(long)]
    pub grid: Option<PathBuf>,
    /// Panel CSV.
    #[arg(long)]
    pub panel: Option<PathBuf>,
    /// Cohort adoption CSV.
    #[arg(long)]
    pub cohorts: Option<PathBuf>,
    /// Artifact destination.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Worker threads.
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Minimum rows per analysis.
    #[arg(long)]
    pub min_obs: Option<usize>,
    /// Progress log interval.
    #[arg(long)]
    pub progress_every: Option<usize>,
    /// Provenance tag written to the artifact.
    #[arg(long)]
    pub data_source: Option<String>,
}

impl RunArgs {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(panel) = &self.panel {
            config.panel = panel.clone();
        }
        if let Some(cohorts) = &self.cohorts {
            config.cohorts = Some(cohorts.clone());
        }
        if let Some(out) = &self.out {
            config.output = out.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.opts.concurrency = concurrency;
        }
        if let Some(min_obs) = self.min_obs {
            config.opts.min_obs = min_obs;
        }
        if let Some(progress_every) = self.progress_every {
            config.opts.progress_every = progress_every;
        }
        if let Some(data_source) = &self.data_source {
            config.data_source = data_source.clone();
        }
    }
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);

    let dataset = Arc::new(load_panel(&config.panel, config.cohorts.as_deref())?);
    let entries: Vec<Result<AnalysisConfig, PanelError>> = match &args.grid {
        Some(path) => read_grid(path)?,
        None => generate_grid(&config.grid).into_iter().map(Ok).collect(),
    };
    let decoded: Vec<&AnalysisConfig> = entries.iter().filter_map(|e| e.as_ref().ok()).collect();
    let hash = stable_hash_string(&decoded)?;
    info!(entries = entries.len(), grid_hash = %hash, "grid ready");

    let runner = BatchRunner::new(dataset, config.opts.clone());
    let outcome = runner.run_entries(&entries)?;
    let artifact = ResultArtifact::new(outcome.records, &config.data_source, hash, outcome.stats);
    save_results(&artifact, &config.output)?;
    println!("{}", serde_json::to_string_pretty(&artifact.metadata)?);
    Ok(())
}
