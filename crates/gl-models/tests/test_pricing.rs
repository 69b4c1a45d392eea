//! Prices computed by backward induction on the lattice, checked against
//! closed forms of the Black and Hull-White models.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use gl_methods::{FastScheme, RollbackKind, SizePolicy};
use gl_models::{
    indicator, indicator_below, AssetModel, BlackData, BlackModel, Brownian, BrownianConfig,
    BrownianStrategies, HullWhiteModel, HullWhiteParams, InterestRateModel, Model,
};
use gl_models::data;
use proptest::prelude::*;
use statrs::distribution::{ContinuousCDF, Normal};

const RATE: f64 = 0.07;
const SIGMA: f64 = 0.2;
const SPOT: f64 = 100.0;
const STRIKE: f64 = 100.0;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn black(times: &[f64], config: &BrownianConfig) -> BlackModel {
    let discount = data::discount(RATE, 0.0);
    let forward = data::forward_with_dividend(SPOT, 0.0, &discount, 0.0);
    let data = BlackData::new(discount, forward, SIGMA, 0.0, 0.0).unwrap();
    let mut m = BlackModel::with_config(data, 0.2, config).unwrap();
    m.assign_event_times(times).unwrap();
    m
}

fn hull_white(times: &[f64]) -> HullWhiteModel {
    let data = HullWhiteParams::default().data().unwrap();
    let mut m = HullWhiteModel::with_config(data, 0.2, &BrownianConfig::default()).unwrap();
    m.assign_event_times(times).unwrap();
    m
}

fn n(x: f64) -> f64 {
    Normal::new(0.0, 1.0).unwrap().cdf(x)
}

fn d1_d2(t: f64) -> (f64, f64) {
    let sd = SIGMA * t.sqrt();
    let d1 = ((SPOT / STRIKE).ln() + (RATE + 0.5 * SIGMA * SIGMA) * t) / sd;
    (d1, d1 - sd)
}

fn black_scholes_call(t: f64) -> f64 {
    let (d1, d2) = d1_d2(t);
    SPOT * n(d1) - STRIKE * (-RATE * t).exp() * n(d2)
}

// ─── Black model ─────────────────────────────────────────────────────────────

#[test]
fn test_call_matches_black_scholes() {
    init_tracing();
    let m = black(&[0.0, 1.0], &BrownianConfig::default());
    let mut call = (m.spot(1) - STRIKE).max_value(0.0);
    call.rollback(0);
    assert_relative_eq!(call.at_origin(), black_scholes_call(1.0), max_relative = 1e-4);
}

#[test]
fn test_call_on_exact_grids() {
    let config = BrownianConfig::default()
        .with_size_policy(SizePolicy::Exact)
        .with_rollback(RollbackKind::Fft);
    let m = black(&[0.0, 0.5, 1.0], &config);
    let call = (m.spot(2) - STRIKE).max_value(0.0).rolled_back(0);
    assert_relative_eq!(call.at_origin(), black_scholes_call(1.0), max_relative = 1e-4);
}

#[test]
fn test_call_with_crank_nicolson_bulk() {
    // large Crank-Nicolson steps leave some damping error at the strike
    let config = BrownianConfig::default().with_rollback(RollbackKind::Chain(FastScheme::CrankNicolson));
    let m = black(&[0.0, 1.0], &config);
    let call = (m.spot(1) - STRIKE).max_value(0.0).rolled_back(0);
    assert_relative_eq!(call.at_origin(), black_scholes_call(1.0), max_relative = 1e-3);
}

#[test]
fn test_digital_call() {
    let m = black(&[0.0, 1.0], &BrownianConfig::default());
    let digital = indicator(&m.spot(1), STRIKE).rolled_back(0);
    let (_, d2) = d1_d2(1.0);
    assert_relative_eq!(digital.at_origin(), (-RATE).exp() * n(d2), max_relative = 2e-4);
}

#[test]
fn test_digital_put_complements_call() {
    let m = black(&[0.0, 1.0], &BrownianConfig::default());
    let call = indicator(&m.spot(1), STRIKE).rolled_back(0).at_origin();
    let put = indicator_below(STRIKE, &m.spot(1)).rolled_back(0).at_origin();
    assert_abs_diff_eq!(call + put, (-RATE).exp(), epsilon = 1e-8);
}

#[test]
fn test_put_call_parity_with_mean_reversion() {
    let discount = data::discount(RATE, 0.0);
    let forward = data::forward_with_dividend(SPOT, 0.02, &discount, 0.0);
    let data = BlackData::new(discount, forward, SIGMA, 0.05, 0.0).unwrap();
    let mut m = BlackModel::new(data, 0.2, BrownianStrategies::default()).unwrap();
    m.assign_event_times(&[0.0, 0.5, 1.0]).unwrap();

    let s = m.spot(2);
    let call = (&s - STRIKE).max_value(0.0).rolled_back(0).at_origin();
    let put = (STRIKE - &s).max_value(0.0).rolled_back(0).at_origin();
    let parity = SPOT * (-0.02f64).exp() - STRIKE * (-RATE).exp();
    assert_abs_diff_eq!(call - put, parity, epsilon = 1e-4);
}

#[test]
fn test_forward_is_a_martingale() {
    let m = black(&[0.0, 0.5, 1.0], &BrownianConfig::default());
    let f = m.forward(2, 1.5).rolled_back(0);
    let expected = (-RATE).exp() * SPOT * (RATE * 1.5).exp();
    assert_relative_eq!(f.at_origin(), expected, max_relative = 1e-6);
}

#[test]
fn test_bermudan_put_bounds() {
    let times = [0.0, 0.25, 0.5, 0.75, 1.0];
    let m = black(&times, &BrownianConfig::default());
    let last = times.len() - 1;

    let european = (STRIKE - m.spot(last)).max_value(0.0).rolled_back(0).at_origin();
    let mut value = (STRIKE - m.spot(last)).max_value(0.0);
    for i in (0..last).rev() {
        value.rollback(i);
        value = value.max(&(STRIKE - m.spot(i)).max_value(0.0));
    }
    let bermudan = value.at_origin();
    assert!(bermudan >= european - 1e-10, "{bermudan} < {european}");
    assert!(bermudan <= STRIKE);
    assert!(bermudan > european + 1e-3, "early exercise should be worth something");
}

// ─── Hull-White model ────────────────────────────────────────────────────────

#[test]
fn test_zero_coupon_by_rollback() {
    init_tracing();
    let m = hull_white(&[0.0, 0.5, 1.0, 2.0]);
    let bond = m.cash(3, 1.0).rolled_back(0);
    assert_relative_eq!(bond.at_origin(), (-2.0 * RATE).exp(), max_relative = 1e-6);
}

#[test]
fn test_rolled_bond_matches_the_curve() {
    let m = hull_white(&[0.0, 0.5, 1.0, 2.0]);
    let bond = m.discount(2, 1.5).rolled_back(0);
    assert_relative_eq!(bond.at_origin(), (-1.5 * RATE).exp(), max_relative = 1e-6);
}

#[test]
fn test_bonds_depend_on_the_state() {
    let m = hull_white(&[0.0, 1.0, 2.0]);
    let p = m.discount(1, 2.0);
    assert_eq!(p.dependence(), &[0]);
    // higher state, lower rates
    assert!(p.values().windows(2).all(|w| w[0] < w[1]));
}

// ─── Slices on a lattice ─────────────────────────────────────────────────────

#[test]
fn test_broadcast_against_explicit_values() {
    let m = black(&[0.0, 1.0], &BrownianConfig::default());
    let s = m.spot(1);
    let sum = m.cash(1, 2.0) + &s;
    assert_eq!(sum.values().len(), s.values().len());
    for (a, b) in sum.values().iter().zip(s.values()) {
        assert_abs_diff_eq!(*a, b + 2.0);
    }
}

#[test]
fn test_indicator_of_a_constant() {
    let m = black(&[0.0, 1.0], &BrownianConfig::default());
    assert_eq!(indicator(&m.cash(1, 1.0), 0.5).values(), &[1.0]);
    assert_eq!(indicator(&m.cash(1, 1.0), 1.5).values(), &[0.0]);
}

// ─── Lattice geometry ────────────────────────────────────────────────────────

fn schedule() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    prop::collection::vec((0.05f64..1.0, 0.01f64..0.09), 1..6).prop_map(|steps| {
        let mut times = vec![0.0];
        let mut var = vec![0.04];
        for (dt, v) in steps {
            times.push(times[times.len() - 1] + dt);
            var.push(v);
        }
        // total variance must increase
        let mut total = 0.0;
        for i in 1..times.len() {
            let floor = total / times[i] + 1e-3;
            var[i] = var[i].max(floor);
            total = var[i] * times[i];
        }
        (times, var)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_grids_are_nested(
        (times, var) in schedule(),
        exact in any::<bool>(),
    ) {
        let policy = if exact { SizePolicy::Exact } else { SizePolicy::PowerOfTwo };
        let rollback = if exact { RollbackKind::Fft } else { RollbackKind::Fft2 };
        let config = BrownianConfig::default()
            .with_size_policy(policy)
            .with_rollback(rollback);
        let b = Brownian::new(&config.strategies(), &var, &times, 0.1).unwrap();
        let sizes = b.sizes();
        prop_assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(sizes.windows(2).all(|w| (w[1] - w[0]) % 2 == 0));
        prop_assert!(sizes[0] as f64 * b.step() > 0.1);
    }

    #[test]
    fn prop_constants_survive_rollback(
        (times, var) in schedule(),
        c in -10.0f64..10.0,
    ) {
        let b = Brownian::new(&BrownianStrategies::default(), &var, &times, 0.1).unwrap();
        let m = Model::new(b);
        let last = times.len() - 1;
        let s = m.cash(last, c).rolled_back(0);
        prop_assert_eq!(s.time_index(), 0);
        prop_assert_eq!(s.values(), &[c][..]);
    }
}
