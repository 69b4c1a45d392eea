//! # gl-models
//!
//! State processes, random payoffs, and the models built on them.
//!
//! ## Trait hierarchy
//!
//! ```text
//! StochasticModel
//! ├── Brownian                    uniform lattice, Gaussian rollback
//! └── SimilarModel                base lattice, substituted rollback
//!
//! AssetModel        → BlackModel
//! InterestRateModel → HullWhiteModel
//! ```
//!
//! A [`Slice`] holds the values of a payoff at one event time. Pricing is
//! backward induction: build the payoff from [`Model::state`] at its
//! maturity, [`Slice::rollback`] it to the initial time, and read the price
//! with [`Slice::at_origin`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Infrastructure ───────────────────────────────────────────────────────
pub mod model;
pub mod slice;

// ── State processes ──────────────────────────────────────────────────────
pub mod brownian;
pub mod similar;

// ── Market data ──────────────────────────────────────────────────────────
pub mod data;

// ── Asset and interest-rate models ───────────────────────────────────────
pub mod asset_model;
pub mod black;
pub mod hull_white;
pub mod interest_rate_model;

// ── Re-exports ───────────────────────────────────────────────────────────
pub use asset_model::AssetModel;
pub use black::{BlackData, BlackModel, BlackParams};
pub use brownian::{Brownian, BrownianConfig, BrownianStrategies, InterpKind};
pub use hull_white::{bond_shape, HullWhiteData, HullWhiteModel, HullWhiteParams};
pub use interest_rate_model::InterestRateModel;
pub use model::{Model, SliceData, StochasticModel};
pub use similar::{similar, RollbackFn, SimilarModel};
pub use slice::{indicator, indicator_below, indicator_slice, Slice};
