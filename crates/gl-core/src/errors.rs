//! Error types for gausslattice.
//!
//! Recoverable failures (bad configuration, not enough data for a fit) are
//! reported through [`Error`]. Broken invariants during a valuation, such as
//! combining slices from different event times, are programming errors and
//! panic through `assert!` instead.

use thiserror::Error;

/// The top-level error type used throughout gausslattice.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Too few data points for the requested fit or interpolation.
    #[error("insufficient size: {0}")]
    InsufficientSize(String),

    /// A numerical parameter lies outside its admissible range.
    #[error("parameter out of range: {0}")]
    Range(String),
}

/// Shorthand `Result` type used throughout gausslattice.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use gl_core::{ensure, errors::Error};
/// fn positive(x: f64) -> gl_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use gl_core::{ensure_post, errors::Error};
/// fn grid_size(width: f64, h: f64) -> gl_core::errors::Result<usize> {
///     let n = (width / h).ceil() as usize;
///     ensure_post!(n >= 2, "grid needs two points, got {n}");
///     Ok(n)
/// }
/// assert!(grid_size(1.0, 0.1).is_ok());
/// assert!(grid_size(0.1, 1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use gl_core::{fail, errors::Error};
/// fn always_err() -> gl_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

/// Returns `Err(Error::Range(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use gl_core::{ensure_range, errors::Error};
/// fn relaxation(p: f64) -> gl_core::errors::Result<f64> {
///     ensure_range!(p > 0.0 && p <= 0.5, "relaxation {p} not in (0, 0.5]");
///     Ok(p)
/// }
/// assert!(relaxation(0.25).is_ok());
/// assert!(matches!(relaxation(0.75), Err(Error::Range(_))));
/// ```
#[macro_export]
macro_rules! ensure_range {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Range(format!($($msg)*)));
        }
    };
}
