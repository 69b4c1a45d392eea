//! Brownian motion on a uniform lattice.
//!
//! Given instantaneous variances `v_i` and event times `t_i`, the state at
//! `t_i` is a centered Brownian motion with total variance
//! `V_i = v_i (t_i − t_0)`. One step `h` serves every event time and is
//! chosen from the smallest increment `V_i − V_{i−1}`; the grid at `t_i`
//! has `size(max((interval + width(V_i)) / h, 2))` points centered at 0.
//!
//! ```text
//! t_0      ·····●·····                (initial interval)
//! t_1    ·······●·······
//! t_2  ·········●·········            sizes never shrink
//! ```
//!
//! Rolling back from `t_j` to `t_i` convolves with the Gaussian of
//! variance `V_j − V_i` on the grid of `t_j` and keeps the centered window
//! of the grid of `t_i`.

use std::fmt;
use std::sync::Arc;

use gl_core::{ensure, errors::Result, Real, Time, Variance, EPS, OMEGA, VAR_EPS};
use gl_math::{Interp, MultiFunction};
use gl_methods::{
    centered, step, width_gauss, FastScheme, GaussRollback, Indicator, IndicatorKind,
    RollbackKind, SizePolicy,
};

use crate::model::{Model, SliceData, StochasticModel};

type VarianceMap = Arc<dyn Fn(Variance) -> Real + Send + Sync>;
type SizeMap = Arc<dyn Fn(Real) -> usize + Send + Sync>;

/// Pluggable pieces of a [`Brownian`] model.
#[derive(Clone)]
pub struct BrownianStrategies {
    /// Grid step from the smallest variance increment.
    pub step: VarianceMap,
    /// Grid width from the total variance.
    pub width: VarianceMap,
    /// Number of points from `width / step`.
    pub size: SizeMap,
    /// Rollback prototype.
    pub rollback: GaussRollback,
    /// Indicator smoothing.
    pub indicator: Arc<dyn Indicator>,
    /// Interpolation prototype.
    pub interp: Interp,
}

impl BrownianStrategies {
    /// Build the model for a variance schedule.
    ///
    /// # Errors
    /// See [`Brownian::new`].
    pub fn model(&self, var: &[Variance], event_times: &[Time], interval: Real) -> Result<Model> {
        Ok(Model::new(Brownian::new(self, var, event_times, interval)?))
    }
}

impl Default for BrownianStrategies {
    fn default() -> Self {
        BrownianConfig::default().strategies()
    }
}

impl fmt::Debug for BrownianStrategies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrownianStrategies")
            .field("rollback", &self.rollback)
            .field("indicator", &self.indicator)
            .field("interp", &self.interp)
            .finish_non_exhaustive()
    }
}

/// Choice of interpolation back end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterpKind {
    /// Piecewise linear.
    Linear,
    /// Natural cubic spline.
    #[default]
    CubicSpline,
    /// Steffen's monotone cubic.
    Steffen,
    /// Akima spline.
    Akima,
    /// Polynomial through all nodes.
    Polynomial,
}

impl InterpKind {
    /// The corresponding prototype.
    pub fn build(self) -> Interp {
        match self {
            InterpKind::Linear => Interp::linear(),
            InterpKind::CubicSpline => Interp::cspline(),
            InterpKind::Steffen => Interp::steffen(),
            InterpKind::Akima => Interp::akima(),
            InterpKind::Polynomial => Interp::polynomial(),
        }
    }
}

/// Named configuration of a [`Brownian`] model.
///
/// ```
/// use gl_models::BrownianConfig;
/// use gl_methods::{IndicatorKind, SizePolicy};
///
/// let config = BrownianConfig::default()
///     .with_step_quality(400.0)
///     .with_indicator(IndicatorKind::Quadratic);
/// assert_eq!(config.width_quality, 100.0);
/// assert_eq!(config.size_policy, SizePolicy::PowerOfTwo);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BrownianConfig {
    /// The step never exceeds `1 / step_quality`.
    pub step_quality: Real,
    /// The Gaussian tail beyond the grid contributes at most `1 / width_quality²`.
    pub width_quality: Real,
    /// Explicit sub-steps resolving the smallest variance increment.
    pub uniform_steps: usize,
    /// Rounding of the number of points.
    pub size_policy: SizePolicy,
    /// Rollback scheme.
    pub rollback: RollbackKind,
    /// Indicator smoothing.
    pub indicator: IndicatorKind,
    /// Interpolation back end.
    pub interpolation: InterpKind,
}

impl Default for BrownianConfig {
    fn default() -> Self {
        Self {
            step_quality: 200.0,
            width_quality: 100.0,
            uniform_steps: 3,
            size_policy: SizePolicy::PowerOfTwo,
            rollback: RollbackKind::Chain(FastScheme::Fft2),
            indicator: IndicatorKind::Linear,
            interpolation: InterpKind::CubicSpline,
        }
    }
}

impl BrownianConfig {
    /// Set the step quality.
    pub fn with_step_quality(mut self, q: Real) -> Self {
        self.step_quality = q;
        self
    }

    /// Set the width quality.
    pub fn with_width_quality(mut self, q: Real) -> Self {
        self.width_quality = q;
        self
    }

    /// Set the number of uniform explicit sub-steps.
    pub fn with_uniform_steps(mut self, n: usize) -> Self {
        self.uniform_steps = n;
        self
    }

    /// Set the size rounding policy.
    pub fn with_size_policy(mut self, policy: SizePolicy) -> Self {
        self.size_policy = policy;
        self
    }

    /// Set the rollback scheme.
    pub fn with_rollback(mut self, rollback: RollbackKind) -> Self {
        self.rollback = rollback;
        self
    }

    /// Set the indicator smoothing.
    pub fn with_indicator(mut self, indicator: IndicatorKind) -> Self {
        self.indicator = indicator;
        self
    }

    /// Set the interpolation back end.
    pub fn with_interpolation(mut self, interpolation: InterpKind) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    /// [`gl_core::Error::InvalidArgument`] for non-positive qualities, zero
    /// uniform steps, or a radix-2 FFT on grids of arbitrary size.
    pub fn validate(&self) -> Result<()> {
        use gl_core::Error::InvalidArgument;
        if !(self.step_quality > 0.0) {
            return Err(InvalidArgument(format!(
                "step quality {} must be positive",
                self.step_quality
            )));
        }
        if !(self.width_quality > 1.0) {
            return Err(InvalidArgument(format!(
                "width quality {} must exceed 1",
                self.width_quality
            )));
        }
        if self.uniform_steps == 0 {
            return Err(InvalidArgument("need at least one uniform step".into()));
        }
        let radix2 = matches!(
            self.rollback,
            RollbackKind::Fft2 | RollbackKind::Chain(FastScheme::Fft2)
        );
        if radix2 && self.size_policy != SizePolicy::PowerOfTwo {
            return Err(InvalidArgument(
                "the radix-2 FFT needs power-of-two grid sizes".into(),
            ));
        }
        Ok(())
    }

    /// The strategy objects named by the configuration.
    ///
    /// # Panics
    /// If the configuration does not [`validate`](Self::validate).
    pub fn strategies(&self) -> BrownianStrategies {
        if let Err(e) = self.validate() {
            panic!("invalid Brownian configuration: {e}");
        }
        let policy = self.size_policy;
        BrownianStrategies {
            step: Arc::new(step(self.step_quality, self.uniform_steps)),
            width: Arc::new(width_gauss(self.width_quality)),
            size: Arc::new(move |ratio| policy.round(ratio)),
            rollback: self.rollback.build(),
            indicator: self.indicator.build(),
            interp: self.interpolation.build(),
        }
    }

    /// Build the model for a variance schedule.
    ///
    /// # Errors
    /// An invalid configuration, or see [`Brownian::new`].
    pub fn model(&self, var: &[Variance], event_times: &[Time], interval: Real) -> Result<Model> {
        self.validate()?;
        self.strategies().model(var, event_times, interval)
    }
}

/// One-dimensional Brownian motion on a uniform lattice.
pub struct Brownian {
    event_times: Vec<Time>,
    total_var: Vec<Variance>,
    sizes: Vec<usize>,
    h: Real,
    rollback: GaussRollback,
    indicator: Arc<dyn Indicator>,
    interp: Interp,
}

fn min_increment(total_var: &[Variance]) -> Variance {
    total_var
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(OMEGA, Real::min)
}

impl Brownian {
    /// Lattice for instantaneous variances `var` at `event_times`, wide
    /// enough at the initial time to cover `interval` around the origin.
    ///
    /// # Errors
    /// If the schedules are empty or differ in length, event times are not
    /// strictly increasing, total variances are not strictly increasing,
    /// `interval` is negative, or the sizing strategies return a grid
    /// that does not cover its width.
    pub fn new(
        strategies: &BrownianStrategies,
        var: &[Variance],
        event_times: &[Time],
        interval: Real,
    ) -> Result<Self> {
        ensure!(!event_times.is_empty(), "no event times");
        ensure!(
            var.len() == event_times.len(),
            "{} variances for {} event times",
            var.len(),
            event_times.len()
        );
        ensure!(
            event_times.windows(2).all(|w| w[0] < w[1]),
            "event times must be strictly increasing"
        );
        ensure!(interval >= 0.0, "initial interval {interval} is negative");

        let t0 = event_times[0];
        let total_var: Vec<Variance> = var
            .iter()
            .zip(event_times)
            .map(|(v, t)| v * (t - t0))
            .collect();
        ensure!(
            total_var.windows(2).all(|w| w[0] < w[1]),
            "total variances must be strictly increasing"
        );
        let min_var = min_increment(&total_var);
        ensure!(min_var > EPS, "variance increment {min_var} is too small");
        let h = (strategies.step)(min_var);
        ensure!(h > 0.0, "grid step {h} must be positive");

        let mut sizes = Vec::with_capacity(total_var.len());
        for &v in &total_var {
            let w = (strategies.width)(v);
            ensure!(w > 0.0, "grid width {w} must be positive");
            let n = (strategies.size)(((interval + w) / h).max(2.0) + EPS);
            ensure!(
                n as Real * h > interval + w,
                "{n} points of step {h} do not cover width {}",
                interval + w
            );
            sizes.push(n);
        }
        // earlier grids must be centered windows of later ones
        if let Some(&last) = sizes.last() {
            for n in sizes.iter_mut() {
                if last.abs_diff(*n) % 2 != 0 {
                    *n += 1;
                }
            }
        }
        gl_core::ensure_post!(
            sizes.windows(2).all(|w| w[0] <= w[1]),
            "grid sizes {sizes:?} decrease"
        );
        ensure!(
            !strategies.rollback.requires_power_of_two() || sizes.iter().all(|n| n.is_power_of_two()),
            "rollback scheme needs power-of-two grid sizes, got {sizes:?}"
        );

        tracing::debug!(
            event_times = event_times.len(),
            h,
            min_var,
            first = sizes[0],
            last = sizes[sizes.len() - 1],
            "Brownian lattice built"
        );

        Ok(Self {
            event_times: event_times.to_vec(),
            total_var,
            sizes,
            h,
            rollback: strategies.rollback.clone(),
            indicator: Arc::clone(&strategies.indicator),
            interp: strategies.interp.clone(),
        })
    }

    /// The grid step.
    pub fn step(&self) -> Real {
        self.h
    }

    /// Number of grid points at every event time.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Total variance of the state at every event time.
    pub fn total_variances(&self) -> &[Variance] {
        &self.total_var
    }

    /// Grid points at `time_index`.
    pub fn grid(&self, time_index: usize) -> Vec<Real> {
        centered(self.sizes[time_index], self.h)
    }
}

impl StochasticModel for Brownian {
    fn event_times(&self) -> &[Time] {
        &self.event_times
    }

    fn number_of_states(&self) -> usize {
        1
    }

    fn number_of_nodes(&self, time_index: usize, dependence: &[usize]) -> usize {
        assert!(dependence.len() <= 1, "Brownian motion has one state");
        match dependence {
            [] => 1,
            [0] => self.sizes[time_index],
            _ => panic!("Brownian motion has no state {:?}", dependence),
        }
    }

    fn state(&self, time_index: usize, state: usize) -> SliceData {
        assert_eq!(state, 0, "Brownian motion has one state");
        SliceData {
            time_index,
            dependence: vec![0],
            values: self.grid(time_index),
        }
    }

    fn origin(&self) -> Vec<Real> {
        vec![0.0]
    }

    fn add_dependence(&self, slice: &mut SliceData, dependence: &[usize]) {
        assert!(dependence.len() <= 1, "Brownian motion has one state");
        if slice.dependence.is_empty() && dependence.len() == 1 {
            assert_eq!(slice.values.len(), 1);
            slice.values = vec![slice.values[0]; self.sizes[slice.time_index]];
            slice.dependence = dependence.to_vec();
        }
    }

    fn rollback(&self, slice: &mut SliceData, time_index: usize) {
        assert!(slice.dependence.len() <= 1);
        assert!(
            slice.time_index > time_index,
            "rollback from event time {} to {time_index}",
            slice.time_index
        );
        let var = self.total_var[slice.time_index] - self.total_var[time_index];
        assert!(var > VAR_EPS, "rollback variance {var} is below the floor");

        let len = slice.values.len();
        if len > 1 {
            assert!(
                self.h * self.h <= 1.5001 * var,
                "grid step {} is too coarse for variance {var}",
                self.h
            );
            tracing::trace!(from = slice.time_index, to = time_index, var, size = len, "rollback");
            self.rollback
                .assigned(len, self.h, var)
                .rollback(&mut slice.values);
        }

        let target = self.number_of_nodes(time_index, &slice.dependence);
        assert!(target <= len);
        if target < len {
            let first = (len - target) / 2;
            slice.values.drain(..first);
            slice.values.truncate(target);
        }
        slice.time_index = time_index;
    }

    fn indicator(&self, slice: &mut SliceData, barrier: Real) {
        self.indicator.indicator(&mut slice.values, barrier);
    }

    fn interpolate(&self, slice: &SliceData) -> MultiFunction {
        let x = self.grid(slice.time_index);
        match self.interp.assigned(&x, &slice.values) {
            Ok(f) => f.interp().into(),
            Err(e) => panic!("cannot interpolate slice at event time {}: {e}", slice.time_index),
        }
    }
}

impl fmt::Debug for Brownian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Brownian")
            .field("event_times", &self.event_times)
            .field("h", &self.h)
            .field("sizes", &self.sizes)
            .field("rollback", &self.rollback)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn lattice(policy: SizePolicy) -> Brownian {
        let config = BrownianConfig::default()
            .with_size_policy(policy)
            .with_rollback(RollbackKind::Chain(FastScheme::Fft));
        let times = [0.0, 0.25, 0.5, 1.0];
        Brownian::new(&config.strategies(), &[0.04; 4], &times, 0.2).unwrap()
    }

    #[test]
    fn step_follows_smallest_increment() {
        let b = lattice(SizePolicy::PowerOfTwo);
        // smallest increment 0.01, sqrt(1.5 · 0.01 / 3) > 1/200
        assert_abs_diff_eq!(b.step(), 0.005);
        assert_abs_diff_eq!(b.total_variances()[3], 0.04);
        assert!(b.sizes().iter().all(|n| n.is_power_of_two()));
        assert_eq!(b.sizes()[0], 64);
    }

    #[test]
    fn radix2_rollback_rejects_other_sizes() {
        let strategies = BrownianStrategies {
            size: Arc::new(gl_methods::size()),
            rollback: GaussRollback::fft2(),
            ..BrownianStrategies::default()
        };
        let times = [0.0, 0.25, 0.5, 1.0];
        assert!(Brownian::new(&strategies, &[0.04; 4], &times, 0.2).is_err());

        let strategies = BrownianStrategies {
            size: Arc::new(gl_methods::size2()),
            ..strategies
        };
        assert!(Brownian::new(&strategies, &[0.04; 4], &times, 0.2).is_ok());
    }

    #[test]
    fn exact_sizes_share_parity() {
        let b = lattice(SizePolicy::Exact);
        let last = *b.sizes().last().unwrap();
        for (i, &n) in b.sizes().iter().enumerate() {
            assert_eq!((last - n) % 2, 0, "size {n} at event time {i}");
            assert!(n as Real * b.step() > 0.2);
        }
    }

    #[test]
    fn grids_are_nested_windows() {
        let b = lattice(SizePolicy::Exact);
        let outer = b.grid(3);
        let inner = b.grid(1);
        let first = (outer.len() - inner.len()) / 2;
        for (i, x) in inner.iter().enumerate() {
            assert_abs_diff_eq!(*x, outer[first + i], epsilon = 1e-12);
        }
    }

    #[test]
    fn rollback_keeps_centered_window() {
        let b = lattice(SizePolicy::PowerOfTwo);
        let mut s = b.state(3, 0);
        b.rollback(&mut s, 0);
        assert_eq!(s.time_index, 0);
        assert_eq!(s.values.len(), b.sizes()[0]);
        // E[x_T | x_0] = x_0
        for (v, x) in s.values.iter().zip(b.grid(0)) {
            assert_abs_diff_eq!(*v, x, epsilon = 1e-6);
        }
    }

    #[test]
    fn constants_only_change_time() {
        let b = lattice(SizePolicy::PowerOfTwo);
        let mut c = SliceData::constant(2, 1.5);
        b.rollback(&mut c, 1);
        assert_eq!(c, SliceData::constant(1, 1.5));
    }

    #[test]
    fn single_event_time_uses_the_coarsest_step() {
        let b = Brownian::new(&BrownianStrategies::default(), &[0.04], &[0.0], 0.2).unwrap();
        assert_abs_diff_eq!(b.step(), 0.005);
        assert_eq!(b.sizes(), &[64]);
    }

    #[test]
    fn rejects_bad_schedules() {
        let s = BrownianStrategies::default();
        assert!(Brownian::new(&s, &[0.04, 0.04], &[0.0, 0.0], 0.2).is_err());
        assert!(Brownian::new(&s, &[0.04], &[0.0, 1.0], 0.2).is_err());
        assert!(Brownian::new(&s, &[], &[], 0.2).is_err());
        // total variance must grow
        assert!(Brownian::new(&s, &[0.04, 0.04, 0.01], &[0.0, 1.0, 2.0], 0.2).is_err());
    }

    #[test]
    fn config_rejects_radix2_on_exact_sizes() {
        let config = BrownianConfig::default().with_size_policy(SizePolicy::Exact);
        assert!(config.validate().is_err());
        assert!(config.with_rollback(RollbackKind::Fft).validate().is_ok());
        assert!(BrownianConfig::default().with_uniform_steps(0).validate().is_err());
    }

    #[test]
    #[should_panic(expected = "rollback from event time")]
    fn rollback_to_the_same_time_panics() {
        let b = lattice(SizePolicy::PowerOfTwo);
        let mut s = b.state(1, 0);
        b.rollback(&mut s, 1);
    }
}
