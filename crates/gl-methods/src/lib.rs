//! # gl-methods
//!
//! Numerical methods of the Gaussian lattice: grid sizing, rollback under a
//! Gaussian kernel, and smoothed indicators.
//!
//! # Modules
//!
//! * [`grid`] — step, width and point count as functions of variance
//! * [`gauss_rollback`] — explicit, implicit, Crank-Nicolson, FFT and
//!   chained schemes behind [`GaussRollback`]
//! * [`indicator`] — naive, linear and quadratic indicators

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Grid geometry.
pub mod grid;

/// Gaussian rollback schemes.
pub mod gauss_rollback;

/// Smoothed indicator functions.
pub mod indicator;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use gauss_rollback::{
    Chain, DefaultChain, Explicit, FastScheme, Fft, GaussRollback, RollbackKind, RollbackOperator,
    RollbackScheme, Theta,
};
pub use grid::{centered, size, size2, step, width_gauss, SizePolicy};
pub use indicator::{Indicator, IndicatorKind};
