use std::sync::Arc;

use gl_core::{ensure_range, errors::Result, Real, Variance};
use gl_math::{TridiagonalOperator, TridiagonalSolver};

use super::explicit::{explicit_step, sub_steps};
use super::{RollbackOperator, RollbackScheme};

/// How the relaxation parameter depends on the grid step.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Relaxation {
    /// `p` regardless of the step.
    Fixed(Real),
    /// `p(h) = r / (2h)`.
    Scaled(Real),
}

impl Relaxation {
    fn at(self, h: Real) -> Real {
        match self {
            Relaxation::Fixed(p) => p,
            Relaxation::Scaled(r) => r / (2.0 * h),
        }
    }
}

/// θ-scheme: each sub-step is an explicit step of weight `1 − θ`
/// followed by an implicit solve of weight `θ`.
///
/// The implicit matrix has `1 + 2qθ` on the diagonal and `−qθ` off it;
/// the first and last rows are the identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theta {
    theta: Real,
    relaxation: Relaxation,
}

impl Theta {
    /// Fully implicit scheme (`θ = 1`) with relaxation `p`.
    ///
    /// # Errors
    /// [`gl_core::Error::Range`] unless `p > 0`.
    pub fn implicit(p: Real) -> Result<Self> {
        ensure_range!(p > 0.0, "implicit relaxation {p} must be positive");
        Ok(Self {
            theta: 1.0,
            relaxation: Relaxation::Fixed(p),
        })
    }

    /// Crank-Nicolson scheme (`θ = 1/2`) with relaxation `r / (2h)`.
    ///
    /// # Errors
    /// [`gl_core::Error::Range`] unless `r > 0`.
    pub fn crank_nicolson(r: Real) -> Result<Self> {
        ensure_range!(r > 0.0, "Crank-Nicolson ratio {r} must be positive");
        Ok(Self {
            theta: 0.5,
            relaxation: Relaxation::Scaled(r),
        })
    }

    pub(crate) fn default_implicit() -> Self {
        Self {
            theta: 1.0,
            relaxation: Relaxation::Fixed(1.0),
        }
    }

    pub(crate) fn default_crank_nicolson() -> Self {
        Self {
            theta: 0.5,
            relaxation: Relaxation::Scaled(1.0),
        }
    }

    /// Weight of the implicit part.
    pub fn theta(&self) -> Real {
        self.theta
    }
}

impl RollbackScheme for Theta {
    fn configure(&self, size: usize, h: Real, var: Variance) -> Arc<dyn RollbackOperator> {
        let (steps, q) = if size >= 2 {
            sub_steps(h, var, self.relaxation.at(h))
        } else {
            (0, 0.0)
        };
        tracing::trace!(size, h, var, steps, q, theta = self.theta, "theta scheme configured");
        if steps == 0 {
            return Arc::new(ThetaOperator {
                size,
                steps,
                explicit_q: 0.0,
                solver: None,
            });
        }

        let qt = q * self.theta;
        let mut op = TridiagonalOperator::new(size);
        op.diag.iter_mut().for_each(|d| *d = 1.0 + 2.0 * qt);
        op.lower.iter_mut().for_each(|l| *l = -qt);
        op.upper.iter_mut().for_each(|u| *u = -qt);
        op.diag[0] = 1.0;
        op.diag[size - 1] = 1.0;
        op.upper[0] = 0.0;
        op.lower[size - 1] = 0.0;
        let solver = match op.factorize() {
            Ok(s) => s,
            Err(e) => panic!("implicit step matrix cannot be factorized: {e}"),
        };

        Arc::new(ThetaOperator {
            size,
            steps,
            explicit_q: if size >= 3 { q * (1.0 - self.theta) } else { 0.0 },
            solver: Some(solver),
        })
    }
}

#[derive(Debug)]
struct ThetaOperator {
    size: usize,
    steps: usize,
    explicit_q: Real,
    solver: Option<TridiagonalSolver>,
}

impl RollbackOperator for ThetaOperator {
    fn rollback(&self, values: &mut [Real]) {
        assert_eq!(values.len(), self.size);
        let Some(solver) = &self.solver else {
            return;
        };
        let mut temp = vec![0.0; self.size];
        for _ in 0..self.steps {
            if self.explicit_q > 0.0 {
                explicit_step(values, &mut temp, self.explicit_q);
            }
            solver.solve_in_place(values);
        }
    }
}
