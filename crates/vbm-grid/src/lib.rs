#![deny(missing_docs)]
#![doc = "Analysis grid enumeration and description synthesis for the VBM regression pipeline."]

/// Description synthesis.
pub mod describe;
pub mod grid;

pub use describe::{describe, describe_config, outcome_name, specification_name};
pub use grid::{
    generate_grid, grid_hash, is_valid_combination, tier_counts, GridParams, RobustnessParams,
};
