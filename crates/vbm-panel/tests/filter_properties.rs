use std::collections::BTreeSet;

use proptest::prelude::*;
use vbm_core::{Cohort, GroupFilter, PanelDataset, SyntheticPanel, TimeWindow};
use vbm_panel::{apply_filters, entity_median_sizes, FilterRequest, PanelView};

fn dataset() -> PanelDataset {
    SyntheticPanel::default().build().expect("synthetic panel")
}

fn group_filter() -> impl Strategy<Value = Option<GroupFilter>> {
    prop_oneof![
        Just(None),
        prop::sample::select(vec!["CA", "UT", "WA"])
            .prop_map(|g| Some(GroupFilter::Only(g.into()))),
        prop::sample::select(vec!["CA", "UT", "WA"])
            .prop_map(|g| Some(GroupFilter::Exclude(g.into()))),
    ]
}

fn time_window() -> impl Strategy<Value = Option<TimeWindow>> {
    prop_oneof![
        Just(None),
        (1996i32..=2024, 0i32..=28)
            .prop_map(|(start, span)| Some(TimeWindow::new(start, start + span))),
    ]
}

fn cohort() -> impl Strategy<Value = Option<Cohort>> {
    prop_oneof![
        3 => Just(None),
        1 => prop::sample::select(vec![2018, 2020, 2022, 2024])
            .prop_map(|y| Some(Cohort::Adopted(y))),
    ]
}

fn request() -> impl Strategy<Value = FilterRequest> {
    (group_filter(), time_window(), cohort(), any::<bool>(), any::<bool>()).prop_map(
        |(group_filter, time_window, cohort_filter, exclude_large, exclude_small)| FilterRequest {
            group_filter,
            time_window,
            cohort_filter,
            exclude_large,
            exclude_small,
        },
    )
}

proptest! {
    #[test]
    fn filter_is_idempotent(request in request()) {
        let data = dataset();
        let (once, first) = apply_filters(&PanelView::full(&data), &request);
        let (twice, second) = apply_filters(&once, &request);
        prop_assert_eq!(once.indices(), twice.indices());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn exclude_large_drops_at_most_five(request in request()) {
        let data = dataset();
        let base_request = FilterRequest { exclude_large: false, exclude_small: false, ..request };
        let (base, _) = apply_filters(&PanelView::full(&data), &base_request);
        let large_request = FilterRequest { exclude_large: true, ..base_request.clone() };
        let (filtered, _) = apply_filters(&PanelView::full(&data), &large_request);
        let removed: BTreeSet<u32> =
            base.entities().difference(&filtered.entities()).copied().collect();
        prop_assert!(removed.len() <= 5);
        if base.entities().len() >= 5 {
            prop_assert_eq!(removed.len(), 5);
        }
    }

    #[test]
    fn exclude_small_keeps_entities_at_or_above_median(request in request()) {
        let data = dataset();
        let base_request = FilterRequest { exclude_small: false, ..request };
        let (base, _) = apply_filters(&PanelView::full(&data), &base_request);
        let medians = entity_median_sizes(&base);
        let mut values: Vec<f64> = medians.values().copied().collect();
        values.sort_by(|a, b| a.partial_cmp(b).expect("finite"));
        let small_request = FilterRequest { exclude_small: true, ..base_request.clone() };
        let (filtered, _) = apply_filters(&PanelView::full(&data), &small_request);
        if !values.is_empty() {
            let mid = values.len() / 2;
            let cutoff = if values.len() % 2 == 0 {
                (values[mid - 1] + values[mid]) / 2.0
            } else {
                values[mid]
            };
            let kept = filtered.entities();
            for (entity, size) in &medians {
                if *size >= cutoff {
                    prop_assert!(kept.contains(entity));
                }
            }
        }
    }
}
