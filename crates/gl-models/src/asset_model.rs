//! Models of one asset on a lattice.
//!
//! ```text
//! AssetModel
//! └── BlackModel
//! ```
//!
//! An asset model owns a [`Model`] for its current event times. Replacing
//! the event times rebuilds the lattice, since grid sizes depend on the
//! whole horizon.

use std::fmt;

use gl_core::{errors::Result, Real, Time};

use crate::model::Model;
use crate::slice::Slice;

/// A lattice model of an asset with deterministic or stochastic rates.
pub trait AssetModel: fmt::Debug + Send + Sync {
    /// The lattice for the current event times.
    fn model(&self) -> &Model;

    /// Rebuild the lattice for new event times; the first must be the
    /// initial time.
    ///
    /// # Errors
    /// If the event times are rejected by the lattice.
    fn assign_event_times(&mut self, event_times: &[Time]) -> Result<()>;

    /// Price at event time `time_index` of the zero-coupon bond maturing
    /// at `maturity`.
    fn discount(&self, time_index: usize, maturity: Time) -> Slice;

    /// Forward price at event time `time_index` for delivery at `maturity`.
    fn forward(&self, time_index: usize, maturity: Time) -> Slice;

    /// Event times of the lattice.
    fn event_times(&self) -> &[Time] {
        self.model().event_times()
    }

    /// The first event time.
    fn initial_time(&self) -> Time {
        self.event_times()[0]
    }

    /// Spot price at event time `time_index`.
    fn spot(&self, time_index: usize) -> Slice {
        let t = self.event_times()[time_index];
        self.forward(time_index, t)
    }

    /// Constant `amount` at event time `time_index`.
    fn cash(&self, time_index: usize, amount: Real) -> Slice {
        self.model().cash(time_index, amount)
    }

    /// State process `state` at event time `time_index`.
    fn state(&self, time_index: usize, state: usize) -> Slice {
        self.model().state(time_index, state)
    }
}
