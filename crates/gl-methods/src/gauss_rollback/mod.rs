//! Conditional expectation under a centered Gaussian kernel on a uniform grid.
//!
//! Given values `f(x_i)` on the grid `x_i = -(n−1)h/2 + i·h`, a rollback
//! replaces them with `E[f(x_i + X)]`, `X ~ N(0, var)`. At the grid edges the
//! second derivative is held equal to that of the neighbouring node.
//!
//! # Overview
//!
//! * [`GaussRollback`] — prototype holding a scheme; [`GaussRollback::assign`]
//!   configures it for a `(size, h, var)` triple
//! * [`Explicit`] — explicit finite differences, stable for `p ≤ 1/2`
//! * [`Theta`] — implicit (`θ = 1`) and Crank-Nicolson (`θ = 1/2`) schemes
//! * [`Fft`] — multiplication by the Gaussian characteristic function
//! * [`Chain`] — explicit prefix, fast bulk, implicit suffix
//! * [`DefaultChain`] — [`Chain`] with step counts chosen from the grid

mod chain;
mod explicit;
mod fft;
mod theta;

use std::fmt;
use std::sync::Arc;

use gl_core::{errors::Result, Real, Variance, EPS};

pub use chain::{Chain, DefaultChain, FastScheme};
pub use explicit::Explicit;
pub use fft::Fft;
pub use theta::Theta;

use crate::grid::centered;

/// An unconfigured rollback scheme.
pub trait RollbackScheme: fmt::Debug + Send + Sync {
    /// Prepare the scheme for arrays of `size` values on a grid with step
    /// `h`, rolling back over variance `var`.
    ///
    /// # Panics
    /// If `h` is not positive or `var` is negative.
    fn configure(&self, size: usize, h: Real, var: Variance) -> Arc<dyn RollbackOperator>;

    /// Returns `true` if `configure` only accepts power-of-two sizes.
    fn requires_power_of_two(&self) -> bool {
        false
    }
}

/// A rollback scheme configured for one `(size, h, var)` triple.
pub trait RollbackOperator: fmt::Debug + Send + Sync {
    /// Replace `values` with their conditional expectation.
    ///
    /// # Panics
    /// If `values` does not have the configured size.
    fn rollback(&self, values: &mut [Real]);
}

/// Gaussian rollback prototype, optionally configured.
#[derive(Clone)]
pub struct GaussRollback {
    scheme: Arc<dyn RollbackScheme>,
    operator: Option<Arc<dyn RollbackOperator>>,
    size: usize,
    h: Real,
    var: Variance,
}

impl GaussRollback {
    /// Prototype over an arbitrary scheme.
    pub fn new(scheme: Arc<dyn RollbackScheme>) -> Self {
        Self {
            scheme,
            operator: None,
            size: 0,
            h: 0.0,
            var: 0.0,
        }
    }

    /// Explicit scheme with relaxation `p ∈ (0, 1/2]`.
    ///
    /// # Errors
    /// [`gl_core::Error::Range`] if `p` is outside `(0, 1/2]`.
    pub fn explicit(p: Real) -> Result<Self> {
        Ok(Self::new(Arc::new(Explicit::new(p)?)))
    }

    /// Fully implicit scheme with relaxation `p > 0`.
    ///
    /// # Errors
    /// [`gl_core::Error::Range`] if `p` is not positive.
    pub fn implicit(p: Real) -> Result<Self> {
        Ok(Self::new(Arc::new(Theta::implicit(p)?)))
    }

    /// Crank-Nicolson scheme with relaxation `p(h) = r / (2h)`.
    ///
    /// # Errors
    /// [`gl_core::Error::Range`] if `r` is not positive.
    pub fn crank_nicolson(r: Real) -> Result<Self> {
        Ok(Self::new(Arc::new(Theta::crank_nicolson(r)?)))
    }

    /// Radix-2 FFT; the configured size must be a power of two.
    pub fn fft2() -> Self {
        Self::new(Arc::new(Fft::radix2()))
    }

    /// Mixed-radix FFT for any size.
    pub fn fft() -> Self {
        Self::new(Arc::new(Fft::mixed()))
    }

    /// `n_expl` explicit steps, then `fast`, then `n_impl` implicit steps.
    ///
    /// # Errors
    /// [`gl_core::Error::Range`] if `p_expl ∉ (0, 1/2]` or `p_impl ≤ 0`.
    pub fn chain(
        n_expl: usize,
        fast: GaussRollback,
        n_impl: usize,
        p_expl: Real,
        p_impl: Real,
    ) -> Result<Self> {
        Ok(Self::new(Arc::new(Chain::new(n_expl, fast, n_impl, p_expl, p_impl)?)))
    }

    /// [`Chain`] with step counts chosen at configuration.
    pub fn chain_default(fast: FastScheme) -> Self {
        Self::new(Arc::new(DefaultChain::new(fast)))
    }

    /// Configure for `size` values, step `h` and variance `var`.
    pub fn assign(&mut self, size: usize, h: Real, var: Variance) {
        self.operator = Some(self.scheme.configure(size, h, var));
        self.size = size;
        self.h = h;
        self.var = var;
    }

    /// Configured copy, leaving `self` untouched.
    pub fn assigned(&self, size: usize, h: Real, var: Variance) -> Self {
        let mut other = self.clone();
        other.assign(size, h, var);
        other
    }

    /// Returns `true` if the scheme only runs on power-of-two sizes.
    pub fn requires_power_of_two(&self) -> bool {
        self.scheme.requires_power_of_two()
    }

    /// Configured size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Configured grid step.
    pub fn step(&self) -> Real {
        self.h
    }

    /// Configured variance.
    pub fn variance(&self) -> Variance {
        self.var
    }

    fn operator(&self) -> &Arc<dyn RollbackOperator> {
        match &self.operator {
            Some(op) => op,
            None => panic!("rollback scheme used before it was configured"),
        }
    }

    /// Roll `values` back in place.
    pub fn rollback(&self, values: &mut [Real]) {
        assert_eq!(values.len(), self.size, "values do not match the configured size");
        self.operator().rollback(values);
    }

    /// Roll `values` back and return the first derivative in the state.
    ///
    /// With `R` the rollback and `x` the grid,
    /// `delta = (R(f·x) − x·R(f)) / var`.
    pub fn rollback_delta(&self, values: &mut [Real]) -> Vec<Real> {
        assert!(self.var > EPS, "variance {} too small for delta", self.var);
        let x = centered(self.size, self.h);
        let mut delta: Vec<Real> = values.iter().zip(&x).map(|(v, x)| v * x).collect();
        self.rollback(values);
        self.rollback(&mut delta);
        for ((d, v), x) in delta.iter_mut().zip(values.iter()).zip(&x) {
            *d = (*d - v * x) / self.var;
        }
        delta
    }

    /// Roll `values` back and return the first and second derivatives in
    /// the state.
    ///
    /// `gamma = (R(f·x²) − 2x·R(f·x) + x²·R(f)) / var² − R(f) / var`.
    pub fn rollback_gamma(&self, values: &mut [Real]) -> (Vec<Real>, Vec<Real>) {
        assert!(self.var > EPS, "variance {} too small for gamma", self.var);
        let x = centered(self.size, self.h);
        let mut delta: Vec<Real> = values.iter().zip(&x).map(|(v, x)| v * x).collect();
        let mut gamma: Vec<Real> = values.iter().zip(&x).map(|(v, x)| v * x * x).collect();
        self.rollback(values);
        self.rollback(&mut delta);
        self.rollback(&mut gamma);
        let var = self.var;
        for i in 0..self.size {
            let (xi, v, d) = (x[i], values[i], delta[i]);
            gamma[i] = ((gamma[i] - 2.0 * xi * d + xi * xi * v) / var - v) / var;
            delta[i] = (d - v * xi) / var;
        }
        (delta, gamma)
    }

    /// Turn a gamma array into vega by scaling with `sqrt(var)`.
    pub fn vega(&self, gamma: &mut [Real]) {
        let s = self.var.sqrt();
        for g in gamma.iter_mut() {
            *g *= s;
        }
    }
}

impl Default for GaussRollback {
    fn default() -> Self {
        Self::chain_default(FastScheme::Fft2)
    }
}

impl fmt::Debug for GaussRollback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaussRollback")
            .field("scheme", &self.scheme)
            .field("size", &self.size)
            .field("h", &self.h)
            .field("var", &self.var)
            .finish()
    }
}

/// Named rollback schemes with default parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollbackKind {
    /// Explicit, `p = 1/3`.
    Explicit,
    /// Fully implicit, `p = 1`.
    Implicit,
    /// Crank-Nicolson, `r = 1`.
    CrankNicolson,
    /// Radix-2 FFT.
    Fft2,
    /// Mixed-radix FFT.
    Fft,
    /// Default chain around a fast scheme.
    Chain(FastScheme),
}

impl Default for RollbackKind {
    fn default() -> Self {
        RollbackKind::Chain(FastScheme::Fft2)
    }
}

impl RollbackKind {
    /// The corresponding prototype.
    pub fn build(self) -> GaussRollback {
        match self {
            RollbackKind::Explicit => GaussRollback::new(Arc::new(Explicit::default())),
            RollbackKind::Implicit => GaussRollback::new(Arc::new(Theta::default_implicit())),
            RollbackKind::CrankNicolson => GaussRollback::new(Arc::new(Theta::default_crank_nicolson())),
            RollbackKind::Fft2 => GaussRollback::fft2(),
            RollbackKind::Fft => GaussRollback::fft(),
            RollbackKind::Chain(fast) => GaussRollback::chain_default(fast),
        }
    }
}
