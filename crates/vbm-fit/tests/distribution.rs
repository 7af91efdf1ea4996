use vbm_fit::distribution::{regularized_incomplete_beta, student_t_two_sided};

#[test]
fn zero_statistic_has_unit_p_value() {
    assert!((student_t_two_sided(0.0, 12.0) - 1.0).abs() < 1e-12);
}

#[test]
fn matches_tabulated_critical_values() {
    // t(0.975, 10) = 2.228139
    let p = student_t_two_sided(2.228_138_851_986_5, 10.0);
    assert!((p - 0.05).abs() < 1e-6, "p = {p}");
    // t(0.995, 30) = 2.749996
    let p = student_t_two_sided(-2.749_995_653_567_9, 30.0);
    assert!((p - 0.01).abs() < 1e-6, "p = {p}");
}

#[test]
fn large_statistics_are_tiny_and_symmetric() {
    let p = student_t_two_sided(12.0, 600.0);
    assert!(p > 0.0 && p < 1e-20);
    assert_eq!(student_t_two_sided(3.0, 40.0), student_t_two_sided(-3.0, 40.0));
}

#[test]
fn undefined_inputs_give_nan() {
    assert!(student_t_two_sided(f64::NAN, 10.0).is_nan());
    assert!(student_t_two_sided(1.0, 0.0).is_nan());
}

#[test]
fn incomplete_beta_bounds_and_symmetry() {
    assert_eq!(regularized_incomplete_beta(2.0, 3.0, 0.0), 0.0);
    assert_eq!(regularized_incomplete_beta(2.0, 3.0, 1.0), 1.0);
    let x = 0.3;
    let lhs = regularized_incomplete_beta(2.5, 4.0, x);
    let rhs = 1.0 - regularized_incomplete_beta(4.0, 2.5, 1.0 - x);
    assert!((lhs - rhs).abs() < 1e-12);
    // I_x(1, 1) is the identity.
    assert!((regularized_incomplete_beta(1.0, 1.0, 0.37) - 0.37).abs() < 1e-12);
}
