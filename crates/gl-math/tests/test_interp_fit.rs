//! Integration tests for interpolation prototypes and least-squares fits.

use gl_math::{Fit, Function, Interp, MultiFunction};
use proptest::prelude::*;

// ─── Interpolation ────────────────────────────────────────────────────────────

#[test]
fn test_cspline_reproduces_smooth_curve() {
    let xs: Vec<f64> = (0..41).map(|i| -2.0 + 0.1 * i as f64).collect();
    let ys: Vec<f64> = xs.iter().map(|x| (-x * x).exp()).collect();
    let f = Interp::cspline().assigned(&xs, &ys).unwrap();

    for &x in &[-1.25_f64, -0.33, 0.0, 0.71, 1.18] {
        let exact = (-x * x).exp();
        assert!(
            (f.interp().value(x) - exact).abs() < 1e-4,
            "value at {x}: {} vs {exact}",
            f.interp().value(x)
        );
        let slope = -2.0 * x * exact;
        assert!((f.deriv().value(x) - slope).abs() < 5e-3, "slope at {x}");
    }
}

#[test]
fn test_steffen_preserves_monotonicity() {
    let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    let ys = [0.0, 0.1, 0.1, 3.0, 3.1, 10.0];
    let f = Interp::steffen().assigned(&xs, &ys).unwrap().interp();
    let mut prev = f.value(0.0);
    for i in 1..=500 {
        let v = f.value(i as f64 * 0.01);
        assert!(v >= prev - 1e-14, "not monotone at {}", i as f64 * 0.01);
        prev = v;
    }
}

#[test]
fn test_interp_output_lifts_to_multi_function() {
    let f = Interp::linear()
        .assigned(&[0.0, 1.0, 2.0], &[1.0, 3.0, 2.0])
        .unwrap()
        .interp();
    let m = MultiFunction::from(f);
    assert_eq!(m.value(&[0.5]), vec![2.0]);
    assert!(!m.belongs(&[2.5]));
}

proptest! {
    #[test]
    fn prop_linear_stays_within_node_range(
        ys in prop::collection::vec(-100.0f64..100.0, 2..20),
        t in 0.0f64..1.0,
    ) {
        let n = ys.len();
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let f = Interp::linear().assigned(&xs, &ys).unwrap().interp();
        let x = t * (n - 1) as f64;
        let lo = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let v = f.value(x);
        prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
    }
}

// ─── Fitting ──────────────────────────────────────────────────────────────────

#[test]
fn test_weighted_regression_matches_closed_form() {
    let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
    let ys = [1.1, 2.9, 5.2, 6.8, 9.1];
    let ws = [1.0, 2.0, 1.0, 2.0, 1.0];
    let base = Function::new(|x| x, -10.0, 10.0);
    let free = Function::constant(0.0, -10.0, 10.0);
    let fit = Fit::linear_regression(base, free)
        .assigned(&xs, &ys, &ws, false)
        .unwrap();

    // normal equations of the weighted line
    let sw: f64 = ws.iter().sum();
    let sx: f64 = xs.iter().zip(&ws).map(|(x, w)| w * x).sum();
    let sy: f64 = ys.iter().zip(&ws).map(|(y, w)| w * y).sum();
    let sxx: f64 = xs.iter().zip(&ws).map(|(x, w)| w * x * x).sum();
    let sxy: f64 = xs.iter().zip(ys.iter()).zip(&ws).map(|((x, y), w)| w * x * y).sum();
    let det = sw * sxx - sx * sx;
    let slope = (sw * sxy - sx * sy) / det;
    let intercept = (sxx * sy - sx * sxy) / det;

    let p = fit.param();
    assert!((p.fit[0] - intercept).abs() < 1e-12);
    assert!((p.fit[1] - slope).abs() < 1e-12);
    // covariance of the slope is Σw / det
    assert!((p.cov[3] - sw / det).abs() < 1e-12);
    assert!((p.cov[1] - p.cov[2]).abs() < 1e-14);

    let err = fit.err().value(2.0);
    let var = p.cov[0] + 4.0 * p.cov[1] + 4.0 * p.cov[3];
    assert!((err - var.sqrt()).abs() < 1e-12);
}

#[test]
fn test_bspline_fit_respects_support() {
    let fit = Fit::bspline(3, &[0.0, 0.5, 1.0]).unwrap();
    let xs: Vec<f64> = (0..11).map(|i| i as f64 / 10.0).collect();
    let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x * x - x).collect();
    let fitted = fit.assigned(&xs, &ys, &[1.0; 11], false).unwrap();
    assert!((fitted.fit().value(0.35) - (2.0 * 0.35 * 0.35 - 0.35)).abs() < 1e-10);
    assert!(fit.assigned(&[-0.5, 0.0, 0.5, 1.0, 0.7], &[0.0; 5], &[1.0; 5], false).is_err());
}
