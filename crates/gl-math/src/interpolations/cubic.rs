//! Piecewise cubic Hermite polynomials.
//!
//! Once the slope `t_i` at every node is known, each interval carries
//!
//! ```text
//! f(x) = y_i + dx*(a_i + dx*(b_i + dx*c_i)),   dx = x - x_i
//! ```
//!
//! with `a_i = t_i`, chosen so that `f` and `f'` match at both ends.

use gl_core::Real;

use super::{locate, Interpolation1D};

/// A C¹ piecewise cubic through `(xs, ys)` with prescribed node slopes.
#[derive(Debug, Clone)]
pub struct PiecewiseCubic {
    xs: Vec<Real>,
    ys: Vec<Real>,
    a: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
}

impl PiecewiseCubic {
    /// Build from nodes and slopes. Inputs are assumed validated.
    pub fn from_slopes(xs: Vec<Real>, ys: Vec<Real>, ts: &[Real]) -> Self {
        let n = xs.len();
        debug_assert!(n >= 2 && ys.len() == n && ts.len() == n);
        let mut a = Vec::with_capacity(n - 1);
        let mut b = Vec::with_capacity(n - 1);
        let mut c = Vec::with_capacity(n - 1);

        for i in 0..n - 1 {
            let dx = xs[i + 1] - xs[i];
            let s = (ys[i + 1] - ys[i]) / dx;
            a.push(ts[i]);
            b.push((3.0 * s - ts[i + 1] - 2.0 * ts[i]) / dx);
            c.push((ts[i + 1] + ts[i] - 2.0 * s) / (dx * dx));
        }

        Self { xs, ys, a, b, c }
    }

    fn segment(&self, x: Real) -> (usize, Real) {
        let i = locate(&self.xs, x);
        (i, x - self.xs[i])
    }
}

/// Secant slopes of consecutive nodes.
pub(crate) fn secants(xs: &[Real], ys: &[Real]) -> Vec<Real> {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (y[1] - y[0]) / (x[1] - x[0]))
        .collect()
}

impl Interpolation1D for PiecewiseCubic {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        let (i, dx) = self.segment(x);
        self.ys[i] + dx * (self.a[i] + dx * (self.b[i] + dx * self.c[i]))
    }

    fn derivative(&self, x: Real) -> Real {
        let (i, dx) = self.segment(x);
        self.a[i] + dx * (2.0 * self.b[i] + 3.0 * dx * self.c[i])
    }

    fn second_derivative(&self, x: Real) -> Real {
        let (i, dx) = self.segment(x);
        2.0 * self.b[i] + 6.0 * dx * self.c[i]
    }
}
