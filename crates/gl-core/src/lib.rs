//! # gl-core
//!
//! Core types, numerical constants, and error definitions for gausslattice.
//!
//! Every other crate in the workspace builds on the aliases and the error
//! enum defined here.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Tolerances and sentinels shared by the numerical code.
pub mod constants;

/// Error types and the `ensure!` / `fail!` / `ensure_post!` macros.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// A time measurement in years.
pub type Time = Real;

/// A variance of the driving Brownian motion.
pub type Variance = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use constants::{EPS, OMEGA, TIME_EPS, VAR_EPS};
pub use errors::{Error, Result};
