use std::sync::Arc;

use gl_core::{ensure_range, errors::Result, Real, Variance};

use super::{RollbackOperator, RollbackScheme};

/// One explicit step `v += q · Δv` with the boundary second differences
/// copied from their neighbours. `temp` is scratch space of the same size.
pub(crate) fn explicit_step(values: &mut [Real], temp: &mut [Real], q: Real) {
    let n = values.len();
    debug_assert!(n >= 3 && temp.len() == n);
    for i in 1..n - 1 {
        temp[i] = values[i - 1] - 2.0 * values[i] + values[i + 1];
    }
    temp[0] = temp[1];
    temp[n - 1] = temp[n - 2];
    for (v, t) in values.iter_mut().zip(temp.iter()) {
        *v += q * t;
    }
}

/// Number of sub-steps and the relaxation actually used so that
/// `steps · 2h²q = var` with `q ≤ p`.
pub(crate) fn sub_steps(h: Real, var: Variance, p: Real) -> (usize, Real) {
    assert!(h > 0.0, "grid step must be positive, got {h}");
    assert!(var >= 0.0, "variance must be non-negative, got {var}");
    if var == 0.0 {
        return (0, 0.0);
    }
    let x = 2.0 * h * h;
    let steps = (var / (x * p)).ceil() as usize;
    let q = (var / (x * steps as Real)).min(p);
    debug_assert!(q > 0.0 && q <= p);
    (steps, q)
}

/// Explicit finite-difference scheme.
///
/// Each sub-step moves variance `2h²q`, with `q` never above the relaxation
/// parameter `p`; `p ≤ 1/2` keeps the scheme monotone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explicit {
    p: Real,
}

impl Explicit {
    /// Scheme with relaxation `p`.
    ///
    /// # Errors
    /// [`gl_core::Error::Range`] unless `0 < p ≤ 1/2`.
    pub fn new(p: Real) -> Result<Self> {
        ensure_range!(p > 0.0 && p <= 0.5, "explicit relaxation {p} not in (0, 0.5]");
        Ok(Self { p })
    }

    /// Relaxation parameter.
    pub fn p(&self) -> Real {
        self.p
    }
}

impl Default for Explicit {
    fn default() -> Self {
        Self { p: 1.0 / 3.0 }
    }
}

impl RollbackScheme for Explicit {
    fn configure(&self, size: usize, h: Real, var: Variance) -> Arc<dyn RollbackOperator> {
        let (steps, q) = if size >= 3 { sub_steps(h, var, self.p) } else { (0, 0.0) };
        tracing::trace!(size, h, var, steps, q, "explicit scheme configured");
        Arc::new(ExplicitOperator { size, steps, q })
    }
}

#[derive(Debug)]
struct ExplicitOperator {
    size: usize,
    steps: usize,
    q: Real,
}

impl RollbackOperator for ExplicitOperator {
    fn rollback(&self, values: &mut [Real]) {
        assert_eq!(values.len(), self.size);
        if self.steps == 0 {
            return;
        }
        let mut temp = vec![0.0; self.size];
        for _ in 0..self.steps {
            explicit_step(values, &mut temp, self.q);
        }
    }
}
