//! Agreement of the rollback schemes on a Gaussian density, whose rolled-back
//! form is again a Gaussian density with the variances added.

use gl_methods::{centered, size2, step, FastScheme, GaussRollback, RollbackKind};
use proptest::prelude::*;

const H: f64 = 0.01;
const SIZE: usize = 512;
const START_VAR: f64 = 0.05;
const ROLL_VAR: f64 = 0.05;

fn density(x: &[f64], var: f64) -> Vec<f64> {
    let c = 1.0 / (2.0 * std::f64::consts::PI * var).sqrt();
    x.iter().map(|x| c * (-x * x / (2.0 * var)).exp()).collect()
}

fn check_scheme(name: &str, r: GaussRollback) {
    check_scheme_within(name, r, 1e-3);
}

fn check_scheme_within(name: &str, r: GaussRollback, tol: f64) {
    let x = centered(SIZE, H);
    let mut v = density(&x, START_VAR);
    r.assigned(SIZE, H, ROLL_VAR).rollback(&mut v);
    let exact = density(&x, START_VAR + ROLL_VAR);
    let peak = exact[SIZE / 2];
    for (i, (a, b)) in v.iter().zip(&exact).enumerate() {
        assert!(
            (a - b).abs() < tol * peak,
            "{name}: node {i}: calculated {a:.8}, expected {b:.8}"
        );
    }
}

// ─── Scheme agreement ─────────────────────────────────────────────────────────

#[test]
fn test_explicit() {
    check_scheme("explicit", GaussRollback::explicit(1.0 / 3.0).unwrap());
}

#[test]
fn test_implicit() {
    check_scheme("implicit", GaussRollback::implicit(0.2).unwrap());
}

#[test]
fn test_crank_nicolson() {
    check_scheme("crank-nicolson", GaussRollback::crank_nicolson(0.02).unwrap());
}

#[test]
fn test_fft2() {
    check_scheme("fft2", GaussRollback::fft2());
}

#[test]
fn test_fft() {
    check_scheme("fft", GaussRollback::fft());
}

#[test]
fn test_default_chains() {
    for fast in [FastScheme::Fft2, FastScheme::Fft] {
        check_scheme(&format!("chain({fast})"), RollbackKind::Chain(fast).build());
    }
    // few large Crank-Nicolson steps lose some accuracy at the peak
    let cn = RollbackKind::Chain(FastScheme::CrankNicolson).build();
    check_scheme_within("chain(crankNicolson)", cn, 3e-3);
}

#[test]
fn test_chain_with_explicit_prefix() {
    let fast = GaussRollback::fft();
    check_scheme("chain", GaussRollback::chain(20, fast, 10, 1.0 / 3.0, 1.0).unwrap());
}

// ─── Delta and gamma ──────────────────────────────────────────────────────────

/// Derivatives from integration by parts agree with centered differences of
/// the rolled-back function.
#[test]
fn test_delta_gamma_match_finite_differences() {
    let x = centered(SIZE, H);
    let payoff = |x: f64| (0.5 * x).exp() + (3.0 * x).sin();
    let mut v: Vec<f64> = x.iter().map(|&x| payoff(x)).collect();
    let r = GaussRollback::default().assigned(SIZE, H, ROLL_VAR);
    let (delta, gamma) = r.rollback_gamma(&mut v);

    for i in 3 * SIZE / 8..5 * SIZE / 8 {
        let fd_delta = (v[i + 1] - v[i - 1]) / (2.0 * H);
        let fd_gamma = (v[i + 1] - 2.0 * v[i] + v[i - 1]) / (H * H);
        assert!((delta[i] - fd_delta).abs() < 1e-3, "delta at node {i}");
        assert!((gamma[i] - fd_gamma).abs() < 1e-2, "gamma at node {i}");
    }
}

/// Derivatives from integration by parts agree with centered differences
/// of the payoff rolled back from origins shifted by one step.
#[test]
fn test_delta_gamma_match_shifted_rollbacks() {
    let x = centered(SIZE, H);
    let payoff = |x: f64| (0.5 * x).exp() + (3.0 * x).sin();
    let r = GaussRollback::default().assigned(SIZE, H, ROLL_VAR);
    let rolled = |shift: f64| {
        let mut v: Vec<f64> = x.iter().map(|&x| payoff(x + shift)).collect();
        r.rollback(&mut v);
        v
    };
    let up = rolled(H);
    let down = rolled(-H);
    let mut v: Vec<f64> = x.iter().map(|&x| payoff(x)).collect();
    let (delta, gamma) = r.rollback_gamma(&mut v);

    for i in 3 * SIZE / 8..5 * SIZE / 8 {
        let fd_delta = (up[i] - down[i]) / (2.0 * H);
        let fd_gamma = (up[i] - 2.0 * v[i] + down[i]) / (H * H);
        assert!((delta[i] - fd_delta).abs() < 20.0 * H * H, "delta at node {i}");
        assert!((gamma[i] - fd_gamma).abs() < 100.0 * H * H, "gamma at node {i}");
    }
}

#[test]
fn test_delta_of_exponential() {
    // E[exp(x + X)] = exp(x + var/2)
    let x = centered(SIZE, H);
    let mut v: Vec<f64> = x.iter().map(|x| x.exp()).collect();
    let delta = GaussRollback::fft2().assigned(SIZE, H, ROLL_VAR).rollback_delta(&mut v);
    for i in 3 * SIZE / 8..5 * SIZE / 8 {
        let exact = (x[i] + 0.5 * ROLL_VAR).exp();
        assert!((v[i] - exact).abs() < 1e-8 * exact);
        assert!((delta[i] - exact).abs() < 1e-6 * exact);
    }
}

// ─── Properties ───────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_rollback_preserves_constants(c in -1e3f64..1e3, var in 1e-4f64..0.05) {
        let h = step(200.0, 3)(var);
        for kind in [RollbackKind::Explicit, RollbackKind::Implicit, RollbackKind::Fft2] {
            let r = kind.build().assigned(64, h, var);
            let mut v = vec![c; 64];
            r.rollback(&mut v);
            for x in v {
                prop_assert!((x - c).abs() <= 1e-9 * c.abs().max(1.0));
            }
        }
    }

    #[test]
    fn prop_size2_is_a_power_of_two(ratio in 1.0f64..1e6) {
        let n = size2()(ratio);
        prop_assert!(n.is_power_of_two());
        prop_assert!(n as f64 >= ratio && (n as f64) < 2.0 * ratio);
    }
}
