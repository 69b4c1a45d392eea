//! Polynomial interpolation through all nodes (Newton form).
//!
//! Only sensible for a handful of well-spread points; the lattice uses it
//! for short slices near the initial time.

use gl_core::{ensure, errors::Result, Real};

use super::{check_nodes, Interpolation1D};

/// The unique polynomial of degree `n - 1` through `n` nodes.
#[derive(Debug, Clone)]
pub struct PolynomialInterpolation {
    xs: Vec<Real>,
    /// Divided differences `f[x_0], f[x_0, x_1], ...`
    coeffs: Vec<Real>,
}

impl PolynomialInterpolation {
    /// Build the interpolating polynomial.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys)?;
        let n = xs.len();
        let mut coeffs = ys.to_vec();
        for k in 1..n {
            for i in (k..n).rev() {
                coeffs[i] = (coeffs[i] - coeffs[i - 1]) / (xs[i] - xs[i - k]);
            }
        }
        ensure!(
            coeffs.iter().all(|c| c.is_finite()),
            "divided differences overflowed"
        );
        Ok(Self {
            xs: xs.to_vec(),
            coeffs,
        })
    }

    /// Value, first and second derivative by Horner's scheme.
    fn eval(&self, x: Real) -> (Real, Real, Real) {
        let n = self.coeffs.len();
        let mut p = self.coeffs[n - 1];
        let mut dp = 0.0;
        let mut d2p = 0.0;
        for k in (0..n - 1).rev() {
            let dx = x - self.xs[k];
            d2p = d2p * dx + 2.0 * dp;
            dp = dp * dx + p;
            p = p * dx + self.coeffs[k];
        }
        (p, dp, d2p)
    }
}

impl Interpolation1D for PolynomialInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        self.eval(x).0
    }

    fn derivative(&self, x: Real) -> Real {
        self.eval(x).1
    }

    fn second_derivative(&self, x: Real) -> Real {
        self.eval(x).2
    }
}
