use std::collections::BTreeSet;

use vbm_core::{
    analysis_id, ClusterLevel, Cohort, GroupFilter, Outcome, RaceType, Specification, Tier,
};
use vbm_grid::{generate_grid, grid_hash, is_valid_combination, tier_counts, GridParams};

#[test]
fn default_grid_has_stable_counts() {
    let grid = generate_grid(&GridParams::default());
    assert_eq!(grid.len(), 790);
    assert_eq!(tier_counts(&grid), (768, 22));
}

#[test]
fn identifiers_are_contiguous_from_zero() {
    let grid = generate_grid(&GridParams::default());
    for (index, config) in grid.iter().enumerate() {
        assert_eq!(config.id, analysis_id(index));
    }
    let unique: BTreeSet<&str> = grid.iter().map(|config| config.id.as_str()).collect();
    assert_eq!(unique.len(), grid.len());
    assert_eq!(grid[0].id, "analysis_00000");
    assert_eq!(grid[789].id, "analysis_00789");
}

#[test]
fn generation_is_deterministic() {
    let first = generate_grid(&GridParams::default());
    let second = generate_grid(&GridParams::default());
    assert_eq!(first, second);
    assert_eq!(
        grid_hash(&first).expect("hash"),
        grid_hash(&second).expect("hash")
    );
}

#[test]
fn first_entries_vary_the_rightmost_axis_fastest() {
    let grid = generate_grid(&GridParams::default());
    let first = &grid[0];
    assert_eq!(first.outcome, Outcome::Pooled);
    assert_eq!(first.specification, Specification::Basic);
    assert_eq!(first.group_filter, None);
    assert_eq!(first.time_window, None);
    assert!(!first.weighted);
    assert!(grid[1].weighted);
    assert_eq!(grid[1].time_window, None);
    assert!(grid[2].time_window.is_some());
    assert!(grid[..768].iter().all(|c| c.cluster_level == ClusterLevel::Entity));
}

#[test]
fn governor_outcome_never_leaves_its_home_group() {
    let grid = generate_grid(&GridParams::default());
    let gov = Outcome::Race(RaceType::Gov);
    for config in grid.iter().filter(|config| config.outcome == gov) {
        match &config.group_filter {
            Some(GroupFilter::Only(group)) => assert_eq!(group, "CA"),
            Some(GroupFilter::Exclude(group)) => assert_ne!(group, "CA"),
            None => {}
        }
    }
    let gov_count = grid.iter().filter(|config| config.outcome == gov).count();
    assert_eq!(gov_count, 3 * 4 * 4 * 2);
}

#[test]
fn validity_predicate_matches_home_groups() {
    let gov = Outcome::Race(RaceType::Gov);
    assert!(is_valid_combination(gov, &None));
    assert!(is_valid_combination(gov, &Some(GroupFilter::Only("CA".into()))));
    assert!(is_valid_combination(gov, &Some(GroupFilter::Exclude("UT".into()))));
    assert!(!is_valid_combination(gov, &Some(GroupFilter::Only("WA".into()))));
    assert!(!is_valid_combination(gov, &Some(GroupFilter::Exclude("CA".into()))));
    assert!(is_valid_combination(Outcome::Turnout, &Some(GroupFilter::Only("UT".into()))));
}

#[test]
fn robustness_tier_follows_the_fixed_order() {
    let grid = generate_grid(&GridParams::default());
    let tier2 = &grid[768..];
    assert!(tier2.iter().all(|config| config.tier == Tier::Robustness));

    assert!(tier2[..6]
        .iter()
        .all(|config| config.cluster_level == ClusterLevel::Group));
    assert_eq!(tier2[0].outcome, Outcome::Pooled);
    assert_eq!(tier2[3].outcome, Outcome::Turnout);

    let size = &tier2[6..14];
    for pair in size.chunks(2) {
        assert!(pair[0].exclude_large && !pair[0].exclude_small);
        assert!(pair[1].exclude_small && !pair[1].exclude_large);
        assert_eq!(pair[0].specification, pair[1].specification);
    }

    let cohorts = &tier2[14..];
    assert_eq!(cohorts.len(), 8);
    assert_eq!(cohorts[0].outcome, Outcome::Race(RaceType::Pres));
    assert_eq!(cohorts[0].cohort_filter, Some(Cohort::Adopted(2018)));
    assert_eq!(cohorts[7].outcome, Outcome::Turnout);
    assert_eq!(cohorts[7].cohort_filter, Some(Cohort::Adopted(2024)));
    assert!(cohorts.iter().all(|config| {
        config.specification == Specification::Basic
            && config.group_filter == Some(GroupFilter::Only("CA".into()))
    }));
}

#[test]
fn params_fill_defaults_from_partial_yaml() {
    let params: GridParams =
        serde_yaml::from_str("outcomes: [turnout]\nweighted: [false]\n").expect("yaml");
    assert_eq!(params.specifications, Specification::ALL.to_vec());
    let grid = generate_grid(&params);
    // 3 specs x 7 filters x 4 windows, then 22 robustness entries.
    assert_eq!(tier_counts(&grid), (84, 22));
}

#[test]
fn grid_round_trips_through_json() {
    let grid = generate_grid(&GridParams::default());
    let bytes = vbm_core::serde::to_canonical_json_bytes(&grid).expect("encode");
    let decoded: Vec<vbm_core::AnalysisConfig> =
        vbm_core::serde::from_json_slice(&bytes).expect("decode");
    assert_eq!(decoded, grid);
}
