use vbm_core::{
    ClusterLevel, GroupFilter, Outcome, PanelDataset, RaceType, Specification, SyntheticPanel,
};
use vbm_fit::{
    formula, Absorbed, FitFailure, FitFailureKind, FitOpts, FitProblem, FixedEffectsSolver,
    RegressionExecutor, CI_MULTIPLIER,
};
use vbm_panel::{apply_filters, prepare_outcome, FilterRequest, PanelView};

fn dataset() -> PanelDataset {
    SyntheticPanel::default().build().expect("synthetic panel")
}

fn executor() -> RegressionExecutor {
    RegressionExecutor::new(FitOpts::default())
}

#[test]
fn basic_specification_recovers_the_planted_effect() {
    let data = dataset();
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Turnout);
    let result = executor().execute(&prepared, Specification::Basic, false, ClusterLevel::Entity);
    assert!(result.success, "{:?}", result.error);
    assert!(result.is_consistent());
    let coefficient = result.coefficient.expect("coefficient");
    assert!((coefficient - 0.05).abs() < 0.01, "coefficient {coefficient}");
    assert_eq!(result.n_obs, Some(630));
    assert_eq!(result.n_clusters, Some(42));
    assert_eq!(result.cluster_count, Some(42));
    assert!(result.p_value.expect("p-value") < 0.01);
}

#[test]
fn linear_trends_keep_the_effect() {
    let data = dataset();
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Pooled);
    let estimate = executor()
        .fit(&prepared, Specification::Linear, false, ClusterLevel::Entity)
        .expect("linear fit");
    assert!((estimate.coefficient - 0.05).abs() < 0.015);
    assert_eq!(estimate.n_obs, prepared.len());
}

#[test]
fn interval_uses_the_normal_multiplier() {
    let data = dataset();
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Turnout);
    let estimate = executor()
        .fit(&prepared, Specification::Basic, false, ClusterLevel::GroupTime)
        .expect("fit");
    assert_eq!(CI_MULTIPLIER, 1.96);
    assert_eq!(estimate.n_clusters, 42);
    assert_eq!(estimate.cluster_count, 45);
    let half_width = estimate.ci_upper - estimate.coefficient;
    assert!((half_width - 1.96 * estimate.std_error).abs() < 1e-12);
    assert!((estimate.coefficient - estimate.ci_lower - half_width).abs() < 1e-12);
}

#[test]
fn weighted_fit_drops_rows_without_size() {
    let mut rows = SyntheticPanel::default().rows();
    rows[0].size = None;
    rows[1].size = Some(0.0);
    let data = PanelDataset::from_rows(rows).expect("dataset");
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Turnout);
    let result = executor().execute(&prepared, Specification::Basic, true, ClusterLevel::Entity);
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.n_obs, Some(628));
    assert!(result.metadata.weighted);
}

#[test]
fn weighted_fit_without_any_size_is_an_empty_sample() {
    let mut rows = SyntheticPanel::default().rows();
    for row in &mut rows {
        row.size = None;
    }
    let data = PanelDataset::from_rows(rows).expect("dataset");
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Turnout);
    let failure = executor()
        .fit(&prepared, Specification::Basic, true, ClusterLevel::Entity)
        .expect_err("no weights");
    assert_eq!(failure.kind, FitFailureKind::EmptySample);
}

#[test]
fn treatment_constant_within_cells_is_collinear() {
    let mut rows = SyntheticPanel::default().rows();
    for row in &mut rows {
        row.treat = if row.group == "WA" && row.year >= 2010 { 1.0 } else { 0.0 };
    }
    let data = PanelDataset::from_rows(rows).expect("dataset");
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Turnout);
    let result = executor().execute(&prepared, Specification::Basic, false, ClusterLevel::Entity);
    assert!(!result.success);
    assert!(result.is_consistent());
    assert!(result.error.as_deref().expect("error").starts_with("collinear"));
}

#[test]
fn single_group_cannot_cluster_by_group() {
    let data = dataset();
    let request = FilterRequest {
        group_filter: Some(GroupFilter::Only("CA".into())),
        ..FilterRequest::default()
    };
    let (view, _) = apply_filters(&PanelView::full(&data), &request);
    let prepared = prepare_outcome(&view, Outcome::Race(RaceType::Gov));
    let failure = executor()
        .fit(&prepared, Specification::Basic, false, ClusterLevel::Group)
        .expect_err("one cluster");
    assert_eq!(failure.kind, FitFailureKind::TooFewClusters);
}

struct Stalled;

impl FixedEffectsSolver for Stalled {
    fn absorb(&self, _problem: &FitProblem) -> Result<Absorbed, FitFailure> {
        Err(FitFailure::new(FitFailureKind::NonConvergence, "stalled"))
    }
}

#[test]
fn solver_failures_become_flat_results() {
    let data = dataset();
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Turnout);
    let result = RegressionExecutor::with_solver(Stalled).execute(
        &prepared,
        Specification::Quadratic,
        false,
        ClusterLevel::Entity,
    );
    assert!(!result.success);
    assert!(result.is_consistent());
    assert_eq!(result.error.as_deref(), Some("non-convergence: stalled"));
    assert_eq!(
        result.metadata.specification_desc,
        "Quadratic Trends: County FE + State×Year FE + County Linear + Quadratic Trends"
    );

    let json = serde_json::to_value(&result).expect("serialize");
    assert!(json["coefficient"].is_null());
    assert_eq!(json["metadata"]["cluster_level"], "county");
}

#[test]
fn formulas_follow_fixest_notation() {
    assert_eq!(
        formula(Outcome::Turnout, Specification::Basic),
        "turnout_share ~ treat | county_id + state_year"
    );
    assert_eq!(
        formula(Outcome::Pooled, Specification::Linear),
        "dem_share ~ treat + i(county_id, year_c) | county_id + state_year"
    );
    assert_eq!(
        formula(Outcome::Race(RaceType::Sen), Specification::Quadratic),
        "dem_share_sen ~ treat + i(county_id, year_c) + i(county_id, year_c2) | county_id + state_year"
    );
}

#[test]
fn sanitize_clears_non_finite_numbers() {
    let data = dataset();
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Turnout);
    let mut result =
        executor().execute(&prepared, Specification::Basic, false, ClusterLevel::Entity);
    result.p_value = Some(f64::NAN);
    result.ci_upper = Some(f64::INFINITY);
    let coefficient = result.coefficient;
    result.sanitize();
    assert_eq!(result.p_value, None);
    assert_eq!(result.ci_upper, None);
    assert_eq!(result.coefficient, coefficient);
}

#[test]
fn cluster_count_follows_the_level_while_n_clusters_counts_entities() {
    let data = dataset();
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Turnout);
    let result = executor().execute(&prepared, Specification::Basic, false, ClusterLevel::Group);
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.n_clusters, Some(42));
    assert_eq!(result.cluster_count, Some(3));
    assert_eq!(result.metadata.cluster_desc, "state");

    let json = serde_json::to_value(&result).expect("serialize");
    assert_eq!(json["n_clusters"], 42);
    assert_eq!(json["cluster_count"], 3);
}
