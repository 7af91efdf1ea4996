pub mod demo;
pub mod describe;
pub mod grid;
pub mod run;

use std::error::Error;
use std::path::Path;

use vbm_batch::{load_run_config, RunConfig};

/// Loads the YAML configuration when given, defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<RunConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(load_run_config(path)?),
        None => Ok(RunConfig::default()),
    }
}
