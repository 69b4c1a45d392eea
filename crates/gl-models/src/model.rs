//! The state-process contract and its shared handle.
//!
//! ```text
//! StochasticModel
//! ├── Brownian        grid per event time, Gaussian rollback
//! └── SimilarModel    base model + substituted rollback
//! ```
//!
//! Models are immutable once built. A [`Model`] is a cheap, cloneable
//! handle to one of them; every [`Slice`] carries such a handle, so a
//! model lives at least as long as the slices built from it.

use std::fmt;
use std::sync::Arc;

use gl_core::{Real, Time};
use gl_math::MultiFunction;

use crate::slice::Slice;

/// Raw contents of a [`Slice`]: the event time it is observed at, the
/// state coordinates it depends on, and its values on the grid.
///
/// `dependence` is sorted and `values.len()` equals
/// `number_of_nodes(time_index, &dependence)` of the owning model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceData {
    /// Index of the event time.
    pub time_index: usize,
    /// Sorted indices of the state processes the values vary with.
    pub dependence: Vec<usize>,
    /// Values on the grid, a single value for a constant.
    pub values: Vec<Real>,
}

impl SliceData {
    /// Constant `value` at event time `time_index`.
    pub fn constant(time_index: usize, value: Real) -> Self {
        Self {
            time_index,
            dependence: Vec::new(),
            values: vec![value],
        }
    }
}

/// A discretized state process driving a lattice model.
///
/// Implementations describe the grids, the conditional expectation
/// between event times, and the conversion of grid values into functions
/// of the state. Violated preconditions are programming errors and panic.
pub trait StochasticModel: fmt::Debug + Send + Sync {
    /// Strictly increasing event times, the first being the initial time.
    fn event_times(&self) -> &[Time];

    /// Dimension of the state process.
    fn number_of_states(&self) -> usize;

    /// Number of values of a slice at `time_index` depending on `dependence`.
    fn number_of_nodes(&self, time_index: usize, dependence: &[usize]) -> usize;

    /// Values of the state process `state` at `time_index`.
    fn state(&self, time_index: usize, state: usize) -> SliceData;

    /// Initial values of the state processes.
    fn origin(&self) -> Vec<Real>;

    /// Broadcast `slice` so that it depends at least on `dependence`.
    fn add_dependence(&self, slice: &mut SliceData, dependence: &[usize]);

    /// Replace `slice` by its conditional expectation at the earlier event
    /// time `time_index`.
    fn rollback(&self, slice: &mut SliceData, time_index: usize);

    /// Replace `slice` by the indicator of `{slice ≥ barrier}`.
    fn indicator(&self, slice: &mut SliceData, barrier: Real);

    /// The values of `slice` as a function of the states it depends on.
    fn interpolate(&self, slice: &SliceData) -> MultiFunction;
}

/// Shared handle to a [`StochasticModel`].
#[derive(Clone)]
pub struct Model {
    inner: Arc<dyn StochasticModel>,
}

impl Model {
    /// Wrap a concrete model.
    pub fn new<M: StochasticModel + 'static>(model: M) -> Self {
        Self {
            inner: Arc::new(model),
        }
    }

    /// Wrap an already shared model.
    pub fn from_arc(inner: Arc<dyn StochasticModel>) -> Self {
        Self { inner }
    }

    /// The underlying model.
    pub fn inner(&self) -> &dyn StochasticModel {
        self.inner.as_ref()
    }

    /// Returns `true` if both handles refer to the same model instance.
    pub fn same_as(&self, other: &Model) -> bool {
        // compare data pointers only, vtables may be duplicated
        Arc::as_ptr(&self.inner) as *const () == Arc::as_ptr(&other.inner) as *const ()
    }

    /// Event times of the model.
    pub fn event_times(&self) -> &[Time] {
        self.inner.event_times()
    }

    /// The first event time.
    pub fn initial_time(&self) -> Time {
        self.event_times()[0]
    }

    /// Dimension of the state process.
    pub fn number_of_states(&self) -> usize {
        self.inner.number_of_states()
    }

    /// Initial values of the state processes.
    pub fn origin(&self) -> Vec<Real> {
        self.inner.origin()
    }

    /// State process `state` at event time `time_index` as a slice.
    ///
    /// # Panics
    /// If either index is out of range.
    pub fn state(&self, time_index: usize, state: usize) -> Slice {
        assert!(
            time_index < self.event_times().len(),
            "event time index {time_index} out of range"
        );
        assert!(
            state < self.number_of_states(),
            "state index {state} out of range"
        );
        Slice::from_data(self.clone(), self.inner.state(time_index, state))
    }

    /// Constant `amount` at event time `time_index`.
    ///
    /// # Panics
    /// If `time_index` is out of range.
    pub fn cash(&self, time_index: usize, amount: Real) -> Slice {
        Slice::constant(self, time_index, amount)
    }
}

/// Panics unless `time_index` is an event time not after `maturity`.
pub(crate) fn check_maturity(model: &Model, time_index: usize, maturity: Time) {
    let times = model.event_times();
    assert!(
        time_index < times.len(),
        "event time index {time_index} out of range"
    );
    assert!(
        times[time_index] <= maturity,
        "maturity {maturity} precedes event time {}",
        times[time_index]
    );
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Model").field(&self.inner).finish()
    }
}
