//! Tridiagonal systems.
//!
//! [`TridiagonalOperator`] stores the three bands of a matrix; the
//! Thomas algorithm solves `A · x = rhs` in `O(n)`. When the same matrix is
//! solved against many right-hand sides (every sub-step of an implicit
//! rollback), [`TridiagonalOperator::factorize`] performs the forward sweep
//! once and keeps the multipliers.

use gl_core::{ensure, errors::Result, Real};

/// A tridiagonal matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalOperator {
    /// Lower diagonal (index 0 unused, starts from row 1).
    pub lower: Vec<Real>,
    /// Main diagonal.
    pub diag: Vec<Real>,
    /// Upper diagonal (last index unused, ends at row n−2).
    pub upper: Vec<Real>,
}

impl TridiagonalOperator {
    /// Create a zero tridiagonal operator of size `n`.
    pub fn new(n: usize) -> Self {
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    /// Size (number of rows/columns).
    pub fn size(&self) -> usize {
        self.diag.len()
    }

    /// Apply the operator: `y = A · x`.
    pub fn apply(&self, x: &[Real]) -> Vec<Real> {
        let n = self.size();
        assert_eq!(x.len(), n);
        if n == 1 {
            return vec![self.diag[0] * x[0]];
        }
        let mut y = vec![0.0; n];
        y[0] = self.diag[0] * x[0] + self.upper[0] * x[1];
        for i in 1..n - 1 {
            y[i] = self.lower[i] * x[i - 1] + self.diag[i] * x[i] + self.upper[i] * x[i + 1];
        }
        y[n - 1] = self.lower[n - 1] * x[n - 2] + self.diag[n - 1] * x[n - 1];
        y
    }

    /// Precompute the forward sweep of the Thomas algorithm.
    ///
    /// # Errors
    /// Fails if a pivot vanishes; diagonally dominant matrices never do.
    pub fn factorize(&self) -> Result<TridiagonalSolver> {
        let n = self.size();
        ensure!(n > 0, "cannot factorize an empty operator");
        let mut c_prime = vec![0.0; n];
        let mut pivot = vec![0.0; n];

        pivot[0] = self.diag[0];
        ensure!(pivot[0].abs() > 0.0, "zero pivot in row 0");
        for i in 1..n {
            c_prime[i - 1] = self.upper[i - 1] / pivot[i - 1];
            pivot[i] = self.diag[i] - self.lower[i] * c_prime[i - 1];
            ensure!(pivot[i].abs() > 0.0, "zero pivot in row {i}");
        }

        Ok(TridiagonalSolver {
            lower: self.lower.clone(),
            c_prime,
            pivot,
        })
    }

    /// Solve `A · x = rhs`.
    ///
    /// # Errors
    /// Fails if the matrix is singular for the Thomas algorithm.
    pub fn solve(&self, rhs: &[Real]) -> Result<Vec<Real>> {
        let mut x = rhs.to_vec();
        self.factorize()?.solve_in_place(&mut x);
        Ok(x)
    }
}

/// A factorized [`TridiagonalOperator`].
#[derive(Debug, Clone)]
pub struct TridiagonalSolver {
    lower: Vec<Real>,
    c_prime: Vec<Real>,
    pivot: Vec<Real>,
}

impl TridiagonalSolver {
    /// Size of the system.
    pub fn size(&self) -> usize {
        self.pivot.len()
    }

    /// Overwrite `x` (holding the right-hand side) with the solution.
    pub fn solve_in_place(&self, x: &mut [Real]) {
        let n = self.size();
        assert_eq!(x.len(), n, "right-hand side has the wrong size");

        // Forward sweep
        x[0] /= self.pivot[0];
        for i in 1..n {
            x[i] = (x[i] - self.lower[i] * x[i - 1]) / self.pivot[i];
        }

        // Back substitution
        for i in (0..n - 1).rev() {
            x[i] -= self.c_prime[i] * x[i + 1];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn laplacian(n: usize, q: Real) -> TridiagonalOperator {
        let mut op = TridiagonalOperator::new(n);
        for i in 0..n {
            op.diag[i] = 1.0 + 2.0 * q;
            op.lower[i] = -q;
            op.upper[i] = -q;
        }
        op
    }

    #[test]
    fn solve_inverts_apply() {
        let op = laplacian(7, 0.8);
        let x: Vec<Real> = (0..7).map(|i| (i as Real).sin()).collect();
        let rhs = op.apply(&x);
        let y = op.solve(&rhs).unwrap();
        for (a, b) in x.iter().zip(&y) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-13);
        }
    }

    #[test]
    fn factorized_solver_is_reusable() {
        let op = laplacian(5, 2.0);
        let solver = op.factorize().unwrap();
        for k in 1..4 {
            let x: Vec<Real> = (0..5).map(|i| (k * i) as Real).collect();
            let mut rhs = op.apply(&x);
            solver.solve_in_place(&mut rhs);
            for (a, b) in x.iter().zip(&rhs) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn singular_pivot_is_reported() {
        let op = TridiagonalOperator::new(3);
        assert!(op.factorize().is_err());
    }
}
