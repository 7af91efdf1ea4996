use vbm_core::{Outcome, PanelDataset, RaceType, SyntheticPanel};
use vbm_panel::{prepare_outcome, PanelView};

fn dataset() -> PanelDataset {
    SyntheticPanel::default().build().expect("synthetic panel")
}

#[test]
fn pooled_outcome_melts_every_present_race() {
    let data = dataset();
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Pooled);
    // gov: 20 CA entities x 7 years, pres: 42 x 8, sen: 42 x 10.
    assert_eq!(prepared.len(), 140 + 336 + 420);
    let races: Vec<RaceType> = prepared.rows.iter().filter_map(|row| row.race).collect();
    assert_eq!(races.len(), prepared.len());
    let first_pres = races
        .iter()
        .position(|race| *race == RaceType::Pres)
        .expect("pres block");
    assert!(races[..first_pres].iter().all(|race| *race == RaceType::Gov));
}

#[test]
fn single_column_outcomes_drop_missing_values() {
    let data = dataset();
    let view = PanelView::full(&data);
    assert_eq!(prepare_outcome(&view, Outcome::Turnout).len(), 630);
    let gov = prepare_outcome(&view, Outcome::Race(RaceType::Gov));
    assert_eq!(gov.len(), 140);
    assert!(gov.rows.iter().all(|row| row.group == "CA" && row.race.is_none()));
}

#[test]
fn non_finite_values_count_as_missing() {
    let mut rows = SyntheticPanel::default().rows();
    rows[0].turnout_share = Some(f64::NAN);
    rows[1].turnout_share = Some(f64::INFINITY);
    rows[2].turnout_share = Some(f64::NEG_INFINITY);
    let data = PanelDataset::from_rows(rows).expect("dataset");
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Turnout);
    assert_eq!(prepared.len(), 627);
    assert!(prepared.rows.iter().all(|row| row.value.is_finite()));
}

#[test]
fn empty_view_prepares_nothing() {
    let data = PanelDataset::default();
    let prepared = prepare_outcome(&PanelView::full(&data), Outcome::Pooled);
    assert!(prepared.is_empty());
    assert_eq!(prepared.outcome, Outcome::Pooled);
}
