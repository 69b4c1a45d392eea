//! Grid geometry as a function of variance.
//!
//! * [`step`] — spacing fine enough to resolve the smallest variance
//!   increment with a given number of explicit sub-steps
//! * [`width_gauss`] — width capturing the Gaussian tail to a given quality
//! * [`size`] / [`size2`] — rounding of `width / step` to a point count
//!
//! All three are closure factories so that a Brownian model can take any
//! of them, or a caller-supplied rule, as a strategy.

use gl_core::{Real, Variance, VAR_EPS, EPS};

/// Grid step as a function of the smallest variance increment.
///
/// `h(v) = min(1 / step_quality, sqrt(1.5 · v / uniform_steps))`.
///
/// # Panics
/// The returned closure panics if `v` does not exceed [`VAR_EPS`].
pub fn step(step_quality: Real, uniform_steps: usize) -> impl Fn(Variance) -> Real + Clone + Send + Sync {
    assert!(step_quality > 0.0, "step quality must be positive");
    assert!(uniform_steps > 0, "need at least one uniform step");
    move |var| {
        assert!(var > VAR_EPS, "variance {var} is below the floor");
        let coarse = 1.0 / step_quality;
        let fine = (1.5 * var / uniform_steps as Real).sqrt();
        coarse.min(fine)
    }
}

/// Grid width as a function of the total variance.
///
/// With `Q = width_quality` the tail of a centered Gaussian `X` with
/// variance `v` beyond `width / 2` satisfies
/// `E[e^X 1{X > width/2}] ≤ 1 / Q²`:
///
/// ```text
/// width(v) = 2 (v + sqrt(v (v + 4 ln Q))) + EPS
/// ```
pub fn width_gauss(width_quality: Real) -> impl Fn(Variance) -> Real + Clone + Send + Sync {
    assert!(width_quality > 1.0, "width quality must exceed 1");
    let log_q = width_quality.ln();
    move |var| {
        let w = 2.0 * (var + (var * (var + 4.0 * log_q)).sqrt()) + EPS;
        debug_assert!(w > 0.0);
        w
    }
}

/// Smallest integer not below the ratio.
pub fn size() -> impl Fn(Real) -> usize + Clone + Send + Sync {
    |ratio| {
        let n = ratio.ceil() as usize;
        debug_assert!(n as Real >= ratio);
        n
    }
}

/// Smallest power of two not below the ratio.
pub fn size2() -> impl Fn(Real) -> usize + Clone + Send + Sync {
    |ratio| {
        let log2 = ratio.log2().ceil().max(0.0) as u32;
        let n = 1usize << log2;
        debug_assert!(n as Real >= ratio);
        n
    }
}

/// Rounding rule for the number of grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizePolicy {
    /// Round up to an integer.
    Exact,
    /// Round up to a power of two, as required by the radix-2 FFT.
    #[default]
    PowerOfTwo,
}

impl SizePolicy {
    /// Apply the rounding rule.
    pub fn round(self, ratio: Real) -> usize {
        match self {
            SizePolicy::Exact => size()(ratio),
            SizePolicy::PowerOfTwo => size2()(ratio),
        }
    }
}

/// Centered grid of `n` points with spacing `h`: `x_i = -(n−1)h/2 + i·h`.
pub fn centered(n: usize, h: Real) -> Vec<Real> {
    let x0 = -((n as Real - 1.0) * h) / 2.0;
    (0..n).map(|i| x0 + i as Real * h).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn step_is_capped_by_quality() {
        let h = step(200.0, 3);
        assert_abs_diff_eq!(h(1.0), 0.005, epsilon = 1e-15);
        assert_abs_diff_eq!(h(1e-6), (0.5e-6_f64).sqrt(), epsilon = 1e-15);
    }

    #[test]
    #[should_panic(expected = "below the floor")]
    fn step_rejects_tiny_variance() {
        step(200.0, 3)(1e-13);
    }

    #[test]
    fn width_grows_with_variance() {
        let w = width_gauss(100.0);
        let ln_q = 100.0_f64.ln();
        assert_abs_diff_eq!(w(0.04), 2.0 * (0.04 + (0.04 * (0.04 + 4.0 * ln_q)).sqrt()) + EPS);
        assert!(w(0.09) > w(0.04));
    }

    #[test]
    fn rounding_rules() {
        assert_eq!(size()(7.0), 7);
        assert_eq!(size()(7.2), 8);
        assert_eq!(size2()(7.2), 8);
        assert_eq!(size2()(8.0), 8);
        assert_eq!(size2()(8.5), 16);
        assert_eq!(size2()(0.5), 1);
        assert_eq!(SizePolicy::default().round(100.0), 128);
        assert_eq!(SizePolicy::Exact.round(100.0), 100);
    }

    #[test]
    fn centered_grid_is_symmetric() {
        let x = centered(5, 0.5);
        assert_eq!(x, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        let y = centered(4, 1.0);
        assert_abs_diff_eq!(y[0] + y[3], 0.0);
    }
}
