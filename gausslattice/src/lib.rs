//! # gausslattice
//!
//! Backward induction on Gaussian lattices.
//!
//! This crate is a **façade** that re-exports the public items of the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `gl-*` crates.
//!
//! ## Quick start
//!
//! A one-year at-the-money call under Black-Scholes dynamics:
//!
//! ```rust
//! use approx::assert_relative_eq;
//! use gausslattice::models::{data, AssetModel, BlackData, BlackModel, BrownianConfig};
//!
//! # fn main() -> Result<(), gausslattice::core::Error> {
//! let discount = data::discount(0.07, 0.0);
//! let forward = data::forward_with_dividend(100.0, 0.0, &discount, 0.0);
//! let curves = BlackData::new(discount, forward, 0.2, 0.0, 0.0)?;
//!
//! let mut model = BlackModel::with_config(curves, 0.2, &BrownianConfig::default())?;
//! model.assign_event_times(&[0.0, 1.0])?;
//!
//! let mut call = (model.spot(1) - 100.0).max_value(0.0);
//! call.rollback(0);
//! assert_relative_eq!(call.at_origin(), 11.5415, max_relative = 1e-4);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core aliases, tolerances, and error definitions.
pub use gl_core as core;

/// Functions of time, interpolation, and least-squares fits.
pub use gl_math as math;

/// Grid sizing, Gaussian rollback schemes, and indicators.
pub use gl_methods as methods;

/// State processes, slices, and the Black and Hull-White models.
pub use gl_models as models;
