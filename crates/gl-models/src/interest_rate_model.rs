//! Models of the term structure of interest rates on a lattice.
//!
//! ```text
//! InterestRateModel
//! └── HullWhiteModel
//! ```

use std::fmt;

use gl_core::{errors::Result, Real, Time};

use crate::model::Model;
use crate::slice::Slice;

/// A lattice model of stochastic discount factors.
pub trait InterestRateModel: fmt::Debug + Send + Sync {
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

    /// Event times of the lattice.
    fn event_times(&self) -> &[Time] {
        self.model().event_times()
    }

    /// The first event time.
    fn initial_time(&self) -> Time {
        self.event_times()[0]
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
