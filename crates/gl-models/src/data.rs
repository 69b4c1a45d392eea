//! Market curves as functions of time.
//!
//! All curves are defined on `[t0, ∞)`.

use gl_core::{Real, Time, Volatility, EPS};
use gl_math::Function;

/// Discount curve of a constant yield: `exp(−y (t − t0))`.
pub fn discount(yield_rate: Real, t0: Time) -> Function {
    Function::from_time(move |t| (-yield_rate * (t - t0)).exp(), t0)
}

/// Discount curve of a yield curve: `exp(−y(t) (t − t0))`.
pub fn discount_curve(yield_curve: &Function, t0: Time) -> Function {
    let y = yield_curve.clone();
    let domain = yield_curve.clone();
    Function::with_domain(
        move |t| (-y.value(t) * (t - t0)).exp(),
        move |t| t >= t0 && domain.belongs(t),
    )
}

/// Stationary volatility of an Ornstein-Uhlenbeck factor.
///
/// With `τ = t − t0`:
///
/// ```text
/// v(t) = σ · sqrt((exp(2λτ) − 1) / (2λτ))
/// ```
///
/// and `v(t) = σ` when `λτ` vanishes.
pub fn volatility(sigma: Volatility, lambda: Real, t0: Time) -> Function {
    Function::from_time(
        move |t| {
            let x = 2.0 * lambda * (t - t0);
            if x.abs() < EPS {
                sigma
            } else {
                sigma * (x.exp_m1() / x).sqrt()
            }
        },
        t0,
    )
}

/// Forward curve with constant cost of carry: `spot · exp(q (t − t0))`.
pub fn forward(spot: Real, carry: Real, t0: Time) -> Function {
    Function::from_time(move |t| spot * (carry * (t - t0)).exp(), t0)
}

/// Forward curve with a term structure of cost of carry.
pub fn forward_curve(spot: Real, carry: &Function, t0: Time) -> Function {
    let q = carry.clone();
    let domain = carry.clone();
    Function::with_domain(
        move |t| spot * (q.value(t) * (t - t0)).exp(),
        move |t| t >= t0 && domain.belongs(t),
    )
}

/// Forward curve of a stock paying dividend yield `q`:
/// `spot · exp(−q (t − t0)) / discount(t)`.
pub fn forward_with_dividend(spot: Real, dividend_yield: Real, discount: &Function, t0: Time) -> Function {
    let d = discount.clone();
    let domain = discount.clone();
    Function::with_domain(
        move |t| spot * (-dividend_yield * (t - t0)).exp() / d.value(t),
        move |t| t >= t0 && domain.belongs(t),
    )
}
