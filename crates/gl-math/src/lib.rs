//! # gl-math
//!
//! Mathematical building blocks for gausslattice: functions with explicit
//! domains, interpolation back ends, weighted least-squares fitting, and
//! tridiagonal solvers.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Real functions of one variable with a domain.
pub mod function;

/// Vector-valued functions of several variables.
pub mod multi_function;

/// Tridiagonal operators and the Thomas algorithm.
pub mod tridiagonal;

/// 1D interpolation curves.
pub mod interpolations;

/// Interpolation prototypes producing [`Function`]s.
pub mod interp;

/// Weighted least-squares fits.
pub mod fit;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use fit::{BSplineBasis, Fit, FitBasis, FitParam, FunctionBasis};
pub use function::Function;
pub use interp::{Interp, InterpMethod};
pub use interpolations::Interpolation1D;
pub use multi_function::MultiFunction;
pub use tridiagonal::{TridiagonalOperator, TridiagonalSolver};
