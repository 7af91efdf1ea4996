use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use serde_json::json;
use vbm_batch::{save_results, BatchRunner, ResultArtifact, RunOpts};
use vbm_core::SyntheticPanel;
use vbm_grid::{generate_grid, grid_hash, GridParams};

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Run only every n-th grid entry.
    #[arg(long, default_value_t = 1)]
    pub stride: usize,
    /// Worker threads.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
    /// Optional artifact destination.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &DemoArgs) -> Result<(), Box<dyn Error>> {
    let dataset = Arc::new(SyntheticPanel::default().build()?);
    let grid: Vec<_> = generate_grid(&GridParams::default())
        .into_iter()
        .step_by(args.stride.max(1))
        .collect();
    let opts = RunOpts {
        concurrency: args.concurrency,
        ..RunOpts::default()
    };
    let outcome = BatchRunner::new(dataset, opts).run(&grid)?;
    let first = outcome.records.first().map(|record| {
        json!({
            "id": record.config.id,
            "description": record.description,
            "coefficient": record.result.coefficient,
            "std_error": record.result.std_error,
        })
    });
    let hash = grid_hash(&grid)?;
    let artifact = ResultArtifact::new(outcome.records, "synthetic", hash, outcome.stats);
    if let Some(out) = &args.out {
        save_results(&artifact, out)?;
    }
    let summary = json!({
        "grid": grid.len(),
        "stats": artifact.metadata.stats,
        "grid_hash": artifact.metadata.grid_hash,
        "first": first,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
