//! Hull-White model of interest rates.
//!
//! Zero-coupon bond prices are driven by a Brownian motion `X` with
//! variance `v(t)² (t − t0)` at `t`:
//!
//! ```text
//! P(t, T) = P(T) / P(t) · exp(X_t (B − A) − ½ (B − A)(A + B − 2C) v(t)² (t − t0))
//! ```
//!
//! with `A = shape(t)`, `B = shape(T)`, `C = shape(t_n)` for the last event
//! time `t_n`, and `shape(t) = (1 − exp(−λ (t − t0))) / λ`. The lattice
//! measure is the forward measure of `t_n`: rollback divides by the bond
//! maturing at `t_n`, rolls back `X`, and multiplies again.

use gl_core::{constants::same_time, ensure, errors::Result, Real, Time, Variance, Volatility, EPS};
use gl_math::Function;

use crate::brownian::{BrownianConfig, BrownianStrategies};
use crate::data;
use crate::interest_rate_model::InterestRateModel;
use crate::model::{check_maturity, Model};
use crate::similar::similar;
use crate::slice::Slice;

/// Curves of a Hull-White model.
#[derive(Debug, Clone)]
pub struct HullWhiteData {
    /// Initial discount curve.
    pub discount: Function,
    /// Volatility `v(t)` of the driving Brownian motion.
    pub volatility: Function,
    /// Loading of the bond maturing at `T` on the state.
    pub shape: Function,
    /// Initial time.
    pub initial_time: Time,
}

/// `(1 − exp(−λ (t − t0))) / λ`, or `t − t0` when `λ` vanishes.
pub fn bond_shape(lambda: Real, t0: Time) -> Function {
    Function::from_time(
        move |t| {
            let tau = t - t0;
            if lambda.abs() <= EPS {
                tau
            } else {
                -(-lambda * tau).exp_m1() / lambda
            }
        },
        t0,
    )
}

impl HullWhiteData {
    /// Data from general curves.
    ///
    /// # Errors
    /// Unless `shape(initial_time) = 0`.
    pub fn with_curves(
        discount: Function,
        volatility: Function,
        shape: Function,
        initial_time: Time,
    ) -> Result<Self> {
        ensure!(
            shape.belongs(initial_time) && shape.value(initial_time).abs() < EPS,
            "shape must vanish at the initial time {initial_time}"
        );
        Ok(Self {
            discount,
            volatility,
            shape,
            initial_time,
        })
    }

    /// Short rate with volatility `sigma` and rate of mean reversion
    /// `lambda`.
    ///
    /// # Errors
    /// See [`with_curves`](Self::with_curves).
    pub fn new(discount: Function, sigma: Volatility, lambda: Real, initial_time: Time) -> Result<Self> {
        let volatility = data::volatility(sigma, lambda, initial_time);
        let shape = bond_shape(lambda, initial_time);
        Self::with_curves(discount, volatility, shape, initial_time)
    }
}

/// Flat market parameters of a Hull-White model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HullWhiteParams {
    /// Continuously compounded yield of the initial curve.
    pub rate: Real,
    /// Volatility of the short rate.
    pub sigma: Volatility,
    /// Rate of mean reversion.
    pub lambda: Real,
    /// Initial time.
    pub initial_time: Time,
}

impl Default for HullWhiteParams {
    fn default() -> Self {
        Self {
            rate: 0.07,
            sigma: 0.01,
            lambda: 0.02,
            initial_time: 0.0,
        }
    }
}

impl HullWhiteParams {
    /// The curves of the flat market.
    ///
    /// # Errors
    /// See [`HullWhiteData::with_curves`].
    pub fn data(&self) -> Result<HullWhiteData> {
        let discount = data::discount(self.rate, self.initial_time);
        HullWhiteData::new(discount, self.sigma, self.lambda, self.initial_time)
    }
}

/// Bond price on the lattice of `model`, whose last event time fixes the
/// measure.
fn bond(model: &Model, data: &HullWhiteData, time_index: usize, maturity: Time) -> Slice {
    check_maturity(model, time_index, maturity);
    let times = model.event_times();
    let t = times[time_index];
    if same_time(t, maturity) {
        return model.cash(time_index, 1.0);
    }
    let a = data.shape.value(t);
    let b = data.shape.value(maturity);
    let c = data.shape.value(times[times.len() - 1]);
    let var: Variance = data.volatility.value(t).powi(2) * (t - data.initial_time);
    let forward_discount = data.discount.value(maturity) / data.discount.value(t);

    let mut p = (model.state(time_index, 0) * (b - a)).exp();
    p *= forward_discount * (-0.5 * (b - a) * (a + b - 2.0 * c) * var).exp();
    p
}

/// Hull-White model on the lattice of a Brownian motion.
#[derive(Debug)]
pub struct HullWhiteModel {
    data: HullWhiteData,
    interval: Real,
    brownian: BrownianStrategies,
    model: Model,
}

impl HullWhiteModel {
    /// Model with the initial time as its only event time.
    ///
    /// # Errors
    /// If the lattice cannot be built.
    pub fn new(data: HullWhiteData, interval: Real, brownian: BrownianStrategies) -> Result<Self> {
        let model = build(&data, &[data.initial_time], interval, &brownian)?;
        Ok(Self {
            data,
            interval,
            brownian,
            model,
        })
    }

    /// Model on the lattice named by `config`.
    ///
    /// # Errors
    /// An invalid configuration, or see [`new`](Self::new).
    pub fn with_config(data: HullWhiteData, interval: Real, config: &BrownianConfig) -> Result<Self> {
        config.validate()?;
        Self::new(data, interval, config.strategies())
    }

    /// The curves of the model.
    pub fn data(&self) -> &HullWhiteData {
        &self.data
    }
}

fn build(
    data: &HullWhiteData,
    event_times: &[Time],
    interval: Real,
    brownian: &BrownianStrategies,
) -> Result<Model> {
    ensure!(
        event_times.first() == Some(&data.initial_time),
        "the first event time must be the initial time {}",
        data.initial_time
    );
    ensure!(
        event_times.iter().all(|&t| data.volatility.belongs(t)),
        "volatility is undefined at some event time"
    );
    let var: Vec<Variance> = event_times
        .iter()
        .map(|&t| data.volatility.value(t).powi(2))
        .collect();
    let base = brownian.model(&var, event_times, interval)?;

    let data = data.clone();
    Ok(similar(base, move |slice: &mut Slice, to: usize| {
        let base = slice.model().clone();
        let last = base.event_times()[base.event_times().len() - 1];
        let from = slice.time_index();
        *slice /= bond(&base, &data, from, last);
        slice.rollback(to);
        *slice *= bond(&base, &data, to, last);
    }))
}

impl InterestRateModel for HullWhiteModel {
    fn model(&self) -> &Model {
        &self.model
    }

    fn assign_event_times(&mut self, event_times: &[Time]) -> Result<()> {
        self.model = build(&self.data, event_times, self.interval, &self.brownian)?;
        tracing::debug!(event_times = event_times.len(), "Hull-White lattice rebuilt");
        Ok(())
    }

    fn discount(&self, time_index: usize, maturity: Time) -> Slice {
        bond(&self.model, &self.data, time_index, maturity)
    }
}
