use std::sync::Arc;

use vbm_core::{
    analysis_id, AnalysisConfig, ClusterLevel, Outcome, PanelDataset, Specification,
    SyntheticPanel, Tier,
};

pub fn dataset() -> Arc<PanelDataset> {
    Arc::new(SyntheticPanel::default().build().expect("synthetic panel"))
}

pub fn config(index: usize, outcome: Outcome) -> AnalysisConfig {
    AnalysisConfig {
        id: analysis_id(index),
        tier: Tier::Core,
        outcome,
        specification: Specification::Basic,
        group_filter: None,
        time_window: None,
        weighted: false,
        cluster_level: ClusterLevel::Entity,
        exclude_large: false,
        exclude_small: false,
        cohort_filter: None,
    }
}
