#![deny(missing_docs)]
#![doc = "Batch execution, result persistence and embeddings for the VBM regression grid."]

/// Run configuration.
pub mod config;
pub mod embed;
pub mod record;
pub mod runner;
pub mod store;

pub use config::{load_run_config, RunConfig, RunOpts};
pub use embed::{attach_embeddings, Embedder, DEFAULT_BATCH_SIZE};
pub use record::{CompiledRecord, ResultArtifact, RunMetadata, RunStats};
pub use runner::{BatchOutcome, BatchRunner};
pub use store::{decode_configs, load_results, read_grid, save_results, write_grid};
