#![deny(missing_docs)]
#![doc = "Dataset loading, the composable filter pipeline and outcome preparation."]

pub mod filter;
pub mod load;
pub mod prepare;
/// Derived dataset views.
pub mod view;

pub use filter::{
    apply_filters, entity_median_sizes, FilterRequest, FULL_SAMPLE, LARGE_ENTITY_COUNT,
};
pub use load::{load_panel, read_cohorts, read_panel};
pub use prepare::{prepare_outcome, PreparedPanel, PreparedRow};
pub use view::{FilterStep, PanelView};
