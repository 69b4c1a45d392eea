//! Natural cubic spline.
//!
//! Second derivatives `M_i` at the nodes solve
//!
//! ```text
//! h_{i-1} M_{i-1} + 2 (h_{i-1} + h_i) M_i + h_i M_{i+1} = 6 (s_i - s_{i-1})
//! M_0 = M_{n-1} = 0
//! ```
//!
//! and are turned into node slopes for the shared Hermite form.

use gl_core::{errors::Result, Real};

use super::cubic::{secants, PiecewiseCubic};
use super::{check_nodes, Interpolation1D};
use crate::tridiagonal::TridiagonalOperator;

/// C² cubic spline with zero curvature at both ends.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    inner: PiecewiseCubic,
}

impl CubicNaturalSpline {
    /// Build a natural spline through the given data points.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys)?;
        let n = xs.len();
        let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let s = secants(xs, ys);

        let mut op = TridiagonalOperator::new(n);
        let mut rhs = vec![0.0; n];
        op.diag[0] = 1.0;
        op.diag[n - 1] = 1.0;
        for i in 1..n - 1 {
            op.lower[i] = h[i - 1];
            op.diag[i] = 2.0 * (h[i - 1] + h[i]);
            op.upper[i] = h[i];
            rhs[i] = 6.0 * (s[i] - s[i - 1]);
        }
        let m = op.solve(&rhs)?;

        let mut ts = Vec::with_capacity(n);
        for i in 0..n - 1 {
            ts.push(s[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0);
        }
        ts.push(s[n - 2] + h[n - 2] * (m[n - 2] + 2.0 * m[n - 1]) / 6.0);

        Ok(Self {
            inner: PiecewiseCubic::from_slopes(xs.to_vec(), ys.to_vec(), &ts),
        })
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn operator(&self, x: Real) -> Real {
        self.inner.operator(x)
    }

    fn derivative(&self, x: Real) -> Real {
        self.inner.derivative(x)
    }

    fn second_derivative(&self, x: Real) -> Real {
        self.inner.second_derivative(x)
    }

    fn x_min(&self) -> Real {
        self.inner.x_min()
    }

    fn x_max(&self) -> Real {
        self.inner.x_max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn natural_end_conditions() {
        let xs = [0.0, 0.5, 1.5, 2.0, 3.0];
        let ys = [1.0, -1.0, 2.0, 0.0, 1.0];
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        assert_abs_diff_eq!(s.second_derivative(0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.second_derivative(3.0), 0.0, epsilon = 1e-12);
        for (&x, &y) in xs.iter().zip(&ys) {
            assert_abs_diff_eq!(s.operator(x), y, epsilon = 1e-13);
        }
    }

    #[test]
    fn curvature_is_continuous_at_knots() {
        let xs = [0.0, 1.0, 2.0, 4.0];
        let ys = [0.0, 1.0, 0.0, 2.0];
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        for &x in &xs[1..3] {
            let left = s.second_derivative(x - 1e-9);
            let right = s.second_derivative(x + 1e-9);
            assert_abs_diff_eq!(left, right, epsilon = 1e-6);
        }
    }

    #[test]
    fn accurate_on_smooth_data() {
        let xs: Vec<Real> = (0..=40).map(|i| -2.0 + 0.1 * i as Real).collect();
        let ys: Vec<Real> = xs.iter().map(|&x| (-x * x).exp()).collect();
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        let x = 0.05;
        assert_abs_diff_eq!(s.operator(x), (-x * x).exp(), epsilon = 1e-4);
        assert_abs_diff_eq!(s.derivative(x), -2.0 * x * (-x * x).exp(), epsilon = 1e-3);
    }
}
