use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde_json::json;
use vbm_batch::write_grid;
use vbm_grid::{generate_grid, grid_hash, tier_counts};

use super::load_config;

#[derive(Args, Debug)]
pub struct GridArgs {
    /// YAML run configuration whose `grid` section drives enumeration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Destination of the grid file.
    #[arg(long, default_value = "grid.json")]
    pub out: PathBuf,
}

pub fn run(args: &GridArgs) -> Result<(), Box<dyn Error>> {
    let config = load_config(args.config.as_deref())?;
    let grid = generate_grid(&config.grid);
    write_grid(&grid, &args.out)?;
    let (tier1, tier2) = tier_counts(&grid);
    let summary = json!({
        "out": args.out.display().to_string(),
        "total": grid.len(),
        "tier1": tier1,
        "tier2": tier2,
        "grid_hash": grid_hash(&grid)?,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
