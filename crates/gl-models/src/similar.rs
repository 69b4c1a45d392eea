//! A model sharing the lattice of another but rolling back differently.
//!
//! Black and Hull-White models live on the lattice of a Brownian motion:
//! grids, states, indicators and interpolation are those of the base, only
//! the rollback adds discounting or a change of numeraire. The substituted
//! rollback receives a view of the slice on the base model, so inside it
//! plain base-model slice arithmetic and rollback apply.

use std::fmt;
use std::mem;
use std::sync::Arc;

use gl_core::{Real, Time};
use gl_math::MultiFunction;

use crate::model::{Model, SliceData, StochasticModel};
use crate::slice::Slice;

/// Rollback acting on a slice of the base model.
pub type RollbackFn = Arc<dyn Fn(&mut Slice, usize) + Send + Sync>;

/// Decorator replacing the rollback of a base model.
pub struct SimilarModel {
    base: Model,
    rollback: RollbackFn,
}

impl SimilarModel {
    /// Decorate `base` with `rollback`.
    pub fn new<F>(base: Model, rollback: F) -> Self
    where
        F: Fn(&mut Slice, usize) + Send + Sync + 'static,
    {
        Self {
            base,
            rollback: Arc::new(rollback),
        }
    }

    /// The decorated model.
    pub fn base(&self) -> &Model {
        &self.base
    }
}

/// Shared handle to a [`SimilarModel`].
pub fn similar<F>(base: Model, rollback: F) -> Model
where
    F: Fn(&mut Slice, usize) + Send + Sync + 'static,
{
    Model::new(SimilarModel::new(base, rollback))
}

impl StochasticModel for SimilarModel {
    fn event_times(&self) -> &[Time] {
        self.base.event_times()
    }

    fn number_of_states(&self) -> usize {
        self.base.number_of_states()
    }

    fn number_of_nodes(&self, time_index: usize, dependence: &[usize]) -> usize {
        self.base.inner().number_of_nodes(time_index, dependence)
    }

    fn state(&self, time_index: usize, state: usize) -> SliceData {
        self.base.inner().state(time_index, state)
    }

    fn origin(&self) -> Vec<Real> {
        self.base.origin()
    }

    fn add_dependence(&self, slice: &mut SliceData, dependence: &[usize]) {
        self.base.inner().add_dependence(slice, dependence);
    }

    fn rollback(&self, slice: &mut SliceData, time_index: usize) {
        let mut view = Slice::from_data(self.base.clone(), mem::take(slice));
        (self.rollback)(&mut view, time_index);
        assert!(
            view.model().same_as(&self.base),
            "substituted rollback replaced the base model"
        );
        *slice = view.into_data();
        assert_eq!(
            slice.time_index, time_index,
            "substituted rollback stopped at the wrong event time"
        );
    }

    fn indicator(&self, slice: &mut SliceData, barrier: Real) {
        self.base.inner().indicator(slice, barrier);
    }

    fn interpolate(&self, slice: &SliceData) -> MultiFunction {
        self.base.inner().interpolate(slice)
    }
}

impl fmt::Debug for SimilarModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimilarModel")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}
