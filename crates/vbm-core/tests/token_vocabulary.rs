use vbm_core::{
    AnalysisConfig, ClusterLevel, Cohort, GroupFilter, Outcome, PanelError, RaceType,
    Specification, Tier, TimeWindow,
};

#[test]
fn outcome_tokens_parse_back() {
    for outcome in Outcome::ALL {
        let parsed: Outcome = outcome.token().parse().expect("parse outcome");
        assert_eq!(parsed, outcome);
    }
    assert_eq!(Outcome::Turnout.column(), "turnout_share");
    assert_eq!(Outcome::Race(RaceType::Gov).home_group(), Some("CA"));
    assert_eq!(Outcome::Pooled.home_group(), None);
}

#[test]
fn unknown_outcome_is_config_error() {
    let err = "dem_share_mayor".parse::<Outcome>().expect_err("unknown token");
    match err {
        PanelError::Config(info) => {
            assert_eq!(info.code, "unknown-outcome");
            assert_eq!(info.context.get("token").map(String::as_str), Some("dem_share_mayor"));
        }
        other => panic!("unexpected error family: {other:?}"),
    }
}

#[test]
fn cluster_and_specification_tokens() {
    assert_eq!("state_year".parse::<ClusterLevel>().expect("cluster"), ClusterLevel::GroupTime);
    assert_eq!(ClusterLevel::GroupTime.label(), "state×year");
    assert!("district".parse::<ClusterLevel>().is_err());
    assert_eq!("quadratic".parse::<Specification>().expect("spec").trend_degree(), 2);
    assert!("cubic".parse::<Specification>().is_err());
}

#[test]
fn group_filter_tokens() {
    let exclude: GroupFilter = "exclude_UT".parse().expect("exclude");
    assert_eq!(exclude, GroupFilter::Exclude("UT".into()));
    assert!(exclude.keeps("CA"));
    assert!(!exclude.keeps("UT"));
    assert_eq!(exclude.to_string(), "exclude_UT");
    assert_eq!(exclude.fragment(), "excluding UT");
    let only: GroupFilter = "WA".parse().expect("only");
    assert_eq!(only.fragment(), "WA only");
    assert!("exclude_".parse::<GroupFilter>().is_err());
}

#[test]
fn cohort_tokens() {
    assert_eq!("2018".parse::<Cohort>().expect("year"), Cohort::Adopted(2018));
    assert_eq!("2020.0".parse::<Cohort>().expect("float year"), Cohort::Adopted(2020));
    assert_eq!("Never".parse::<Cohort>().expect("never"), Cohort::Never);
    assert_eq!("".parse::<Cohort>().expect("blank"), Cohort::Never);
    assert!("soon".parse::<Cohort>().is_err());
}

#[test]
fn analysis_config_uses_artifact_tokens() {
    let config = AnalysisConfig {
        id: vbm_core::analysis_id(7),
        tier: Tier::Robustness,
        outcome: Outcome::Race(RaceType::Pres),
        specification: Specification::Basic,
        group_filter: Some(GroupFilter::Only("CA".into())),
        time_window: Some(TimeWindow::new(1996, 2018)),
        weighted: false,
        cluster_level: ClusterLevel::Entity,
        exclude_large: false,
        exclude_small: false,
        cohort_filter: Some(Cohort::Adopted(2020)),
    };
    let json = serde_json::to_value(&config).expect("serialize");
    assert_eq!(json["id"], "analysis_00007");
    assert_eq!(json["tier"], 2);
    assert_eq!(json["outcome"], "dem_share_pres");
    assert_eq!(json["group_filter"], "CA");
    assert_eq!(json["time_window"], serde_json::json!([1996, 2018]));
    assert_eq!(json["cluster_level"], "county");
    assert_eq!(json["cohort_filter"], "2020");
    let decoded: AnalysisConfig = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, config);
}

#[test]
fn unknown_tier_is_rejected() {
    let err = serde_json::from_value::<Tier>(serde_json::json!(3));
    assert!(err.is_err());
}
