use vbm_core::{Cohort, PanelDataset, SyntheticPanel};

#[test]
fn synthetic_panel_is_deterministic() {
    let spec = SyntheticPanel::default();
    let first = spec.build().expect("build");
    let second = spec.build().expect("build again");
    assert_eq!(first, second);
    assert_eq!(first.entity_count(), 42);
    assert_eq!(first.len(), 42 * 15);
    assert_eq!(first.groups(), vec!["CA", "UT", "WA"]);
}

#[test]
fn synthetic_panel_has_cohorts_only_in_ca() {
    let dataset = SyntheticPanel::default().build().expect("build");
    for row in dataset.rows() {
        if row.group != "CA" {
            assert_eq!(row.cohort, Cohort::Never);
            assert!(row.dem_share_gov.is_none());
        }
        if let Cohort::Adopted(year) = row.cohort {
            assert_eq!(row.treat, if row.year >= year { 1.0 } else { 0.0 });
        }
    }
    assert!(dataset
        .rows()
        .iter()
        .any(|row| row.cohort == Cohort::Adopted(2024)));
}

#[test]
fn duplicate_observations_are_rejected() {
    let mut rows = SyntheticPanel::default().rows();
    let duplicate = rows[0].clone();
    rows.push(duplicate);
    let err = PanelDataset::from_rows(rows).expect_err("duplicate row");
    assert_eq!(err.info().code, "duplicate-observation");
}

#[test]
fn entity_in_two_groups_is_rejected() {
    let mut rows = SyntheticPanel::default().rows();
    let mut moved = rows[0].clone();
    moved.group = "WA".into();
    moved.year = 2030;
    rows.push(moved);
    let err = PanelDataset::from_rows(rows).expect_err("group conflict");
    assert_eq!(err.info().code, "entity-group-conflict");
}
