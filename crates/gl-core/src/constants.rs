//! Numerical tolerances.
//!
//! ```text
//! EPS      generic absolute tolerance
//! TIME_EPS two times closer than this are the same event time
//! VAR_EPS  smallest variance a rollback may be asked to apply
//! OMEGA    stands in for +∞ in running minima
//! ```

use crate::Real;

/// Generic absolute tolerance.
pub const EPS: Real = 1e-10;

/// Tolerance used when comparing times.
pub const TIME_EPS: Real = 1e-5;

/// Floor on variances handed to grid sizing and rollback.
pub const VAR_EPS: Real = 1e-12;

/// A very large number used as the identity of `min`.
pub const OMEGA: Real = 1e20;

/// Returns `true` if `t1` and `t2` are the same time up to [`TIME_EPS`].
pub fn same_time(t1: Real, t2: Real) -> bool {
    (t1 - t2).abs() < TIME_EPS
}
