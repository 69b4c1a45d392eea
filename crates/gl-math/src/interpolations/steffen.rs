//! Steffen's monotone cubic interpolation.
//!
//! Interior slopes are limited so that the interpolant is monotone between
//! any two nodes where the data is monotone:
//!
//! ```text
//! p_i  = (s_{i-1} h_i + s_i h_{i-1}) / (h_{i-1} + h_i)
//! t_i  = (sgn s_{i-1} + sgn s_i) · min(|s_{i-1}|, |s_i|, |p_i|/2)
//! ```
//!
//! End slopes use a one-sided parabola, clipped to `[0, 2 s]`.

use gl_core::{ensure, errors::Result, Real};

use super::cubic::{secants, PiecewiseCubic};
use super::{check_nodes, Interpolation1D};

/// Monotonicity-preserving cubic Hermite spline (M. Steffen, 1990).
#[derive(Debug, Clone)]
pub struct SteffenSpline {
    inner: PiecewiseCubic,
}

fn end_slope(s0: Real, s1: Real, h0: Real, h1: Real) -> Real {
    let p = s0 * (1.0 + h0 / (h0 + h1)) - s1 * h0 / (h0 + h1);
    if p * s0 <= 0.0 {
        0.0
    } else if p.abs() > 2.0 * s0.abs() {
        2.0 * s0
    } else {
        p
    }
}

impl SteffenSpline {
    /// Build a Steffen spline through the given data.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys)?;
        let n = xs.len();
        ensure!(n >= 3, "Steffen spline requires at least 3 points");

        let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let s = secants(xs, ys);

        let mut ts = vec![0.0; n];
        ts[0] = end_slope(s[0], s[1], h[0], h[1]);
        ts[n - 1] = end_slope(s[n - 2], s[n - 3], h[n - 2], h[n - 3]);
        for i in 1..n - 1 {
            let p = (s[i - 1] * h[i] + s[i] * h[i - 1]) / (h[i - 1] + h[i]);
            let bound = s[i - 1].abs().min(s[i].abs()).min(0.5 * p.abs());
            ts[i] = (s[i - 1].signum() + s[i].signum()) * bound;
        }

        Ok(Self {
            inner: PiecewiseCubic::from_slopes(xs.to_vec(), ys.to_vec(), &ts),
        })
    }
}

impl Interpolation1D for SteffenSpline {
    fn x_min(&self) -> Real {
        self.inner.x_min()
    }

    fn x_max(&self) -> Real {
        self.inner.x_max()
    }

    fn operator(&self, x: Real) -> Real {
        self.inner.operator(x)
    }

    fn derivative(&self, x: Real) -> Real {
        self.inner.derivative(x)
    }

    fn second_derivative(&self, x: Real) -> Real {
        self.inner.second_derivative(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steffen_exact_on_nodes() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 1.0, 1.5, 3.0, 5.0];
        let s = SteffenSpline::new(&xs, &ys).unwrap();
        for (&x, &y) in xs.iter().zip(ys.iter()) {
            let v = s.operator(x);
            assert!((v - y).abs() < 1e-12, "at x={x}: expected {y}, got {v}");
        }
    }

    #[test]
    fn steffen_preserves_monotonicity() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 0.1, 0.5, 2.0, 4.0];
        let s = SteffenSpline::new(&xs, &ys).unwrap();
        let mut prev = -1e30;
        for i in 0..=100 {
            let x = 4.0 * (i as f64) / 100.0;
            let v = s.operator(x);
            assert!(v >= prev - 1e-12, "not monotone at x={x}: {v} < {prev}");
            prev = v;
        }
    }

    #[test]
    fn steffen_step_stays_in_range() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 0.0, 1.0, 1.0];
        let s = SteffenSpline::new(&xs, &ys).unwrap();
        for i in 0..=100 {
            let x = 3.0 * (i as f64) / 100.0;
            let v = s.operator(x);
            assert!(
                (-1e-10..=1.0 + 1e-10).contains(&v),
                "out of range at x={x}: {v}"
            );
        }
    }
}
