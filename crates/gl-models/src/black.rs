//! Black model of an asset with deterministic interest rates.
//!
//! The log forward prices follow
//!
//! ```text
//! F(t, T) = F(T) · exp(shape(T) · X_t − ½ (v(t) · shape(T))² (t − t0))
//! ```
//!
//! where `X` is a Brownian motion with variance `v(t)² (t − t0)` at `t`.
//! With `shape(t) = exp(−λ (t − t0))` this is the one-factor model with
//! mean-reverting log forwards, `λ = 0` giving the classical Black-Scholes
//! dynamics. Rollback is the rollback of `X` followed by deterministic
//! discounting.

use gl_core::{ensure, errors::Result, Real, Time, Variance, Volatility, EPS};
use gl_math::Function;

use crate::asset_model::AssetModel;
use crate::brownian::{BrownianConfig, BrownianStrategies};
use crate::data;
use crate::model::{check_maturity, Model};
use crate::similar::similar;
use crate::slice::Slice;

/// Curves of a Black model.
#[derive(Debug, Clone)]
pub struct BlackData {
    /// Discount curve.
    pub discount: Function,
    /// Forward curve of the asset.
    pub forward: Function,
    /// Volatility `v(t)` of the driving Brownian motion.
    pub volatility: Function,
    /// Loading of the forward price at maturity `T` on the state.
    pub shape: Function,
    /// Initial time.
    pub initial_time: Time,
}

impl BlackData {
    /// Data from general curves.
    ///
    /// # Errors
    /// Unless `shape(initial_time) = 1`.
    pub fn with_curves(
        discount: Function,
        forward: Function,
        volatility: Function,
        shape: Function,
        initial_time: Time,
    ) -> Result<Self> {
        ensure!(
            shape.belongs(initial_time) && (shape.value(initial_time) - 1.0).abs() < EPS,
            "shape must equal 1 at the initial time {initial_time}"
        );
        Ok(Self {
            discount,
            forward,
            volatility,
            shape,
            initial_time,
        })
    }

    /// Mean-reverting log forwards with volatility `sigma` and rate of mean
    /// reversion `lambda`.
    ///
    /// # Errors
    /// See [`with_curves`](Self::with_curves).
    pub fn new(
        discount: Function,
        forward: Function,
        sigma: Volatility,
        lambda: Real,
        initial_time: Time,
    ) -> Result<Self> {
        let volatility = data::volatility(sigma, lambda, initial_time);
        let shape = data::discount(lambda, initial_time);
        Self::with_curves(discount, forward, volatility, shape, initial_time)
    }

    /// Black-Scholes dynamics with a term structure of volatility.
    ///
    /// # Errors
    /// See [`with_curves`](Self::with_curves).
    pub fn with_volatility(
        discount: Function,
        forward: Function,
        volatility: Function,
        initial_time: Time,
    ) -> Result<Self> {
        let shape = Function::from_time(|_| 1.0, initial_time);
        Self::with_curves(discount, forward, volatility, shape, initial_time)
    }
}

/// Flat market parameters of a Black model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlackParams {
    /// Continuously compounded interest rate.
    pub rate: Real,
    /// Spot price.
    pub spot: Real,
    /// Continuous dividend yield.
    pub dividend_yield: Real,
    /// Volatility.
    pub sigma: Volatility,
    /// Rate of mean reversion of the log forwards.
    pub lambda: Real,
    /// Initial time.
    pub initial_time: Time,
}

impl Default for BlackParams {
    fn default() -> Self {
        Self {
            rate: 0.07,
            spot: 100.0,
            dividend_yield: 0.02,
            sigma: 0.2,
            lambda: 0.05,
            initial_time: 0.0,
        }
    }
}

impl BlackParams {
    /// The curves of the flat market.
    ///
    /// # Errors
    /// See [`BlackData::with_curves`].
    pub fn data(&self) -> Result<BlackData> {
        let discount = data::discount(self.rate, self.initial_time);
        let forward =
            data::forward_with_dividend(self.spot, self.dividend_yield, &discount, self.initial_time);
        BlackData::new(discount, forward, self.sigma, self.lambda, self.initial_time)
    }
}

/// Black model on the lattice of a Brownian motion.
#[derive(Debug)]
pub struct BlackModel {
    data: BlackData,
    interval: Real,
    brownian: BrownianStrategies,
    model: Model,
}

impl BlackModel {
    /// Model with the initial time as its only event time.
    ///
    /// `interval` is the width of the initial range of the state the
    /// lattice must cover.
    ///
    /// # Errors
    /// If the lattice cannot be built.
    pub fn new(data: BlackData, interval: Real, brownian: BrownianStrategies) -> Result<Self> {
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
    pub fn with_config(data: BlackData, interval: Real, config: &BrownianConfig) -> Result<Self> {
        config.validate()?;
        Self::new(data, interval, config.strategies())
    }

    /// The curves of the model.
    pub fn data(&self) -> &BlackData {
        &self.data
    }
}

fn build(
    data: &BlackData,
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

    let times = event_times.to_vec();
    let discount = data.discount.clone();
    Ok(similar(base, move |slice: &mut Slice, to: usize| {
        let from = slice.time_index();
        let factor = discount.value(times[from]) / discount.value(times[to]);
        slice.rollback(to);
        *slice *= factor;
    }))
}

impl AssetModel for BlackModel {
    fn model(&self) -> &Model {
        &self.model
    }

    fn assign_event_times(&mut self, event_times: &[Time]) -> Result<()> {
        self.model = build(&self.data, event_times, self.interval, &self.brownian)?;
        tracing::debug!(event_times = event_times.len(), "Black lattice rebuilt");
        Ok(())
    }

    fn discount(&self, time_index: usize, maturity: Time) -> Slice {
        check_maturity(&self.model, time_index, maturity);
        let t = self.model.event_times()[time_index];
        let factor = self.data.discount.value(maturity) / self.data.discount.value(t);
        self.model.cash(time_index, factor)
    }

    fn forward(&self, time_index: usize, maturity: Time) -> Slice {
        check_maturity(&self.model, time_index, maturity);
        let t = self.model.event_times()[time_index];
        let forward = self.data.forward.value(maturity);
        let vol = self.data.volatility.value(t);
        let shape = self.data.shape.value(maturity);
        let c = forward.ln() - 0.5 * (vol * shape).powi(2) * (t - self.data.initial_time);
        (self.model.state(time_index, 0) * shape + c).exp()
    }
}
