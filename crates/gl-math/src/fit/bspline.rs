//! B-spline basis on clamped knots.
//!
//! For order `k` (degree `k − 1`) and breakpoints `b_0 < … < b_{m−1}` the
//! knot vector repeats each end `k` times, giving `m + k − 2` basis
//! functions. Values are computed with the Cox-de Boor recursion restricted
//! to the `k` functions that do not vanish at `x`.

use gl_core::{ensure, errors::Result, Real};

/// Clamped B-spline basis.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineBasis {
    order: usize,
    breakpoints: Vec<Real>,
    knots: Vec<Real>,
}

impl BSplineBasis {
    /// Basis of the given order on the given breakpoints.
    pub fn new(order: usize, breakpoints: &[Real]) -> Result<Self> {
        ensure!(order >= 1, "B-spline order must be positive");
        ensure!(breakpoints.len() >= 2, "need at least 2 breakpoints");
        ensure!(
            breakpoints.windows(2).all(|w| w[0] < w[1]),
            "breakpoints must be strictly increasing"
        );
        let m = breakpoints.len();
        let mut knots = Vec::with_capacity(m + 2 * order - 2);
        knots.extend(std::iter::repeat(breakpoints[0]).take(order));
        knots.extend_from_slice(&breakpoints[1..m - 1]);
        knots.extend(std::iter::repeat(breakpoints[m - 1]).take(order));
        Ok(Self {
            order,
            breakpoints: breakpoints.to_vec(),
            knots,
        })
    }

    /// `n` equally spaced breakpoints from `left` to `right`.
    pub fn uniform(order: usize, left: Real, right: Real, n: usize) -> Result<Self> {
        ensure!(left < right, "empty interval [{left}, {right}]");
        ensure!(n > 1, "need at least 2 breakpoints");
        let step = (right - left) / (n - 1) as Real;
        let mut points: Vec<Real> = (0..n).map(|i| left + step * i as Real).collect();
        points[n - 1] = right;
        Self::new(order, &points)
    }

    /// Number of basis functions.
    pub fn len(&self) -> usize {
        self.breakpoints.len() + self.order - 2
    }

    /// Always `false`; a basis has at least one function.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Left end of the support.
    pub fn left(&self) -> Real {
        self.breakpoints[0]
    }

    /// Right end of the support.
    pub fn right(&self) -> Real {
        self.breakpoints[self.breakpoints.len() - 1]
    }

    /// Values of all basis functions at `x ∈ [left, right]`.
    pub fn values(&self, x: Real) -> Vec<Real> {
        let n = self.len();
        let k = self.order;
        let t = &self.knots;

        // knot span: t[i] <= x < t[i+1], the right end belongs to the last span
        let mut i = k - 1;
        while i < n - 1 && x >= t[i + 1] {
            i += 1;
        }

        let mut nb = vec![0.0; k];
        let mut left = vec![0.0; k];
        let mut right = vec![0.0; k];
        nb[0] = 1.0;
        for j in 1..k {
            left[j] = x - t[i + 1 - j];
            right[j] = t[i + j] - x;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = nb[r] / (right[r + 1] + left[j - r]);
                nb[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            nb[j] = saved;
        }

        let mut out = vec![0.0; n];
        out[i + 1 - k..=i].copy_from_slice(&nb);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn partition_of_unity() {
        let basis = BSplineBasis::new(4, &[0.0, 0.3, 1.0, 1.2, 2.0]).unwrap();
        assert_eq!(basis.len(), 7);
        for i in 0..=40 {
            let x = 2.0 * i as Real / 40.0;
            let v = basis.values(x);
            assert_abs_diff_eq!(v.iter().sum::<Real>(), 1.0, epsilon = 1e-13);
            assert!(v.iter().all(|&b| b >= -1e-15));
        }
    }

    #[test]
    fn linear_order_is_hat_functions() {
        let basis = BSplineBasis::uniform(2, 0.0, 2.0, 3).unwrap();
        assert_eq!(basis.len(), 3);
        let v = basis.values(0.5);
        assert_abs_diff_eq!(v[0], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(v[1], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(basis.values(2.0)[2], 1.0, epsilon = 1e-15);
    }
}
