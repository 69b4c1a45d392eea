//! Random payoffs observed at one event time.
//!
//! A [`Slice`] is the value of a payoff on the grid of its model at one
//! event time. Slices combine only with slices of the same model and the
//! same event time; a slice that depends on fewer states than the other
//! operand is broadcast through the model first, and a single-valued
//! slice acts as a scalar.
//!
//! ```text
//! payoff at T ──rollback──▶ value at t < T ──at_origin──▶ price
//! ```

use std::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign,
};

use gl_core::Real;
use gl_math::MultiFunction;

use crate::model::{Model, SliceData};

/// A random variable on the lattice of a [`Model`] at one event time.
#[derive(Debug, Clone)]
pub struct Slice {
    model: Model,
    data: SliceData,
}

fn includes(outer: &[usize], inner: &[usize]) -> bool {
    inner.iter().all(|i| outer.binary_search(i).is_ok())
}

fn union(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut u: Vec<usize> = a.iter().chain(b).copied().collect();
    u.sort_unstable();
    u.dedup();
    u
}

impl Slice {
    /// Slice with explicit dependence and values.
    ///
    /// # Panics
    /// If `dependence` is not strictly increasing or the number of values
    /// does not match the model's grid.
    pub fn new(model: &Model, time_index: usize, dependence: Vec<usize>, values: Vec<Real>) -> Self {
        let data = SliceData {
            time_index,
            dependence,
            values,
        };
        Self::from_data(model.clone(), data)
    }

    /// Constant `value` at event time `time_index`.
    pub fn constant(model: &Model, time_index: usize, value: Real) -> Self {
        Self::from_data(model.clone(), SliceData::constant(time_index, value))
    }

    pub(crate) fn from_data(model: Model, data: SliceData) -> Self {
        assert!(
            data.time_index < model.event_times().len(),
            "event time index {} out of range",
            data.time_index
        );
        assert!(
            data.dependence.windows(2).all(|w| w[0] < w[1]),
            "dependence {:?} is not strictly increasing",
            data.dependence
        );
        let n = model.inner().number_of_nodes(data.time_index, &data.dependence);
        assert_eq!(
            data.values.len(),
            n,
            "slice at event time {} needs {n} values",
            data.time_index
        );
        Self { model, data }
    }

    pub(crate) fn into_data(self) -> SliceData {
        self.data
    }

    /// The model the slice lives on.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Index of the event time.
    pub fn time_index(&self) -> usize {
        self.data.time_index
    }

    /// Sorted indices of the states the slice depends on.
    pub fn dependence(&self) -> &[usize] {
        &self.data.dependence
    }

    /// Values on the grid.
    pub fn values(&self) -> &[Real] {
        &self.data.values
    }

    /// Mutable values on the grid; the length is fixed.
    pub fn values_mut(&mut self) -> &mut [Real] {
        &mut self.data.values
    }

    /// Turn the slice into the constant `value`.
    pub fn set_constant(&mut self, value: Real) {
        self.data.dependence.clear();
        self.data.values.clear();
        self.data.values.push(value);
    }

    fn map_in_place<Op: Fn(Real) -> Real>(&mut self, op: Op) {
        for v in self.data.values.iter_mut() {
            *v = op(*v);
        }
    }

    /// `op` applied to every value.
    pub fn apply<Op: Fn(Real) -> Real>(&self, op: Op) -> Slice {
        let mut r = self.clone();
        r.map_in_place(op);
        r
    }

    /// Elementwise `op(self, rhs)` after reconciling the dependences.
    fn zip_with<Op: Fn(Real, Real) -> Real>(&mut self, rhs: &Slice, op: Op) {
        assert!(
            self.model.same_as(&rhs.model),
            "slices belong to different models"
        );
        assert_eq!(
            self.data.time_index, rhs.data.time_index,
            "slices live at different event times"
        );
        if rhs.data.values.len() == 1 {
            let v = rhs.data.values[0];
            self.map_in_place(|x| op(x, v));
            return;
        }

        let model = self.model.inner();
        let (d1, d2) = (self.data.dependence.clone(), rhs.data.dependence.clone());
        let broadcast;
        let other: &[Real] = if d1 == d2 {
            rhs.data.values.as_slice()
        } else if d1.len() > d2.len() && includes(&d1, &d2) {
            let mut r = rhs.data.clone();
            model.add_dependence(&mut r, &d1);
            broadcast = r;
            broadcast.values.as_slice()
        } else if d2.len() > d1.len() && includes(&d2, &d1) {
            model.add_dependence(&mut self.data, &d2);
            rhs.data.values.as_slice()
        } else {
            let u = union(&d1, &d2);
            model.add_dependence(&mut self.data, &u);
            let mut r = rhs.data.clone();
            model.add_dependence(&mut r, &u);
            broadcast = r;
            broadcast.values.as_slice()
        };

        assert_eq!(self.data.values.len(), other.len());
        for (x, &y) in self.data.values.iter_mut().zip(other) {
            *x = op(*x, y);
        }
    }

    /// Pointwise maximum with another slice.
    pub fn max(&self, rhs: &Slice) -> Slice {
        let mut r = self.clone();
        r.zip_with(rhs, Real::max);
        r
    }

    /// Pointwise minimum with another slice.
    pub fn min(&self, rhs: &Slice) -> Slice {
        let mut r = self.clone();
        r.zip_with(rhs, Real::min);
        r
    }

    /// Pointwise maximum with a number.
    pub fn max_value(&self, v: Real) -> Slice {
        self.apply(|x| x.max(v))
    }

    /// Pointwise minimum with a number.
    pub fn min_value(&self, v: Real) -> Slice {
        self.apply(|x| x.min(v))
    }

    /// Pointwise power.
    pub fn pow(&self, p: Real) -> Slice {
        self.apply(|x| x.powf(p))
    }

    /// Pointwise absolute value.
    pub fn abs(&self) -> Slice {
        self.apply(Real::abs)
    }

    /// Pointwise exponential.
    pub fn exp(&self) -> Slice {
        self.apply(Real::exp)
    }

    /// Pointwise natural logarithm.
    pub fn ln(&self) -> Slice {
        self.apply(Real::ln)
    }

    /// Pointwise square root.
    pub fn sqrt(&self) -> Slice {
        self.apply(Real::sqrt)
    }

    /// Roll back to the earlier event time `time_index`.
    ///
    /// Nothing happens if the slice is already there.
    ///
    /// # Panics
    /// If `time_index` is later than the slice's event time.
    pub fn rollback(&mut self, time_index: usize) {
        assert!(
            time_index <= self.data.time_index,
            "cannot roll a slice at event time {} forward to {time_index}",
            self.data.time_index
        );
        if time_index < self.data.time_index {
            self.model.inner().rollback(&mut self.data, time_index);
            debug_assert_eq!(self.data.time_index, time_index);
        }
    }

    /// Copy rolled back to `time_index`.
    pub fn rolled_back(&self, time_index: usize) -> Slice {
        let mut r = self.clone();
        r.rollback(time_index);
        r
    }

    /// The slice as a function of the states in `states`, the remaining
    /// states held at the origin.
    ///
    /// # Panics
    /// If `states` is empty, unsorted or names a state the model lacks.
    pub fn interpolate_over(&self, states: &[usize]) -> MultiFunction {
        let n = self.model.number_of_states();
        assert!(!states.is_empty(), "no states to interpolate over");
        assert!(states.windows(2).all(|w| w[0] < w[1]));
        assert!(states.iter().all(|&s| s < n), "state index out of range");

        let model = self.model.inner();
        let mut data = self.data.clone();
        model.add_dependence(&mut data, states);
        let ix = data.dependence.clone();
        assert!(includes(&ix, states));

        let f = model.interpolate(&data);
        assert_eq!(f.dim_d(), ix.len());
        if ix.len() == states.len() {
            return f;
        }
        let origin = model.origin();
        let fixed: Vec<Real> = ix
            .iter()
            .filter(|i| states.binary_search(i).is_err())
            .map(|&i| origin[i])
            .collect();
        let flex: Vec<usize> = states.iter().map(|s| ix.partition_point(|i| i < s)).collect();
        f.section(&flex, &fixed)
    }

    /// The slice as a function of all states.
    pub fn interpolate(&self) -> MultiFunction {
        let all: Vec<usize> = (0..self.model.number_of_states()).collect();
        self.interpolate_over(&all)
    }

    /// Value at the initial point of the state processes.
    pub fn at_origin(&self) -> Real {
        if self.data.dependence.is_empty() {
            return self.data.values[0];
        }
        let origin = self.model.origin();
        let point: Vec<Real> = self.data.dependence.iter().map(|&i| origin[i]).collect();
        self.model.inner().interpolate(&self.data).value(&point)[0]
    }
}

/// Smoothed indicator of `{slice ≥ barrier}`.
pub fn indicator(slice: &Slice, barrier: Real) -> Slice {
    let mut r = slice.clone();
    slice.model.inner().indicator(&mut r.data, barrier);
    r
}

/// Smoothed indicator of `{slice < barrier}`.
pub fn indicator_below(barrier: Real, slice: &Slice) -> Slice {
    1.0 - indicator(slice, barrier)
}

/// Smoothed indicator of `{slice ≥ barrier}` for a random barrier.
pub fn indicator_slice(slice: &Slice, barrier: &Slice) -> Slice {
    indicator(&(slice - barrier), 0.0)
}

macro_rules! slice_assign_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Slice> for Slice {
            fn $method(&mut self, rhs: &Slice) {
                self.zip_with(rhs, |a, b| a $op b);
            }
        }

        impl $trait<Slice> for Slice {
            fn $method(&mut self, rhs: Slice) {
                self.zip_with(&rhs, |a, b| a $op b);
            }
        }

        impl $trait<Real> for Slice {
            fn $method(&mut self, rhs: Real) {
                self.map_in_place(|a| a $op rhs);
            }
        }
    };
}

slice_assign_op!(AddAssign, add_assign, +);
slice_assign_op!(SubAssign, sub_assign, -);
slice_assign_op!(MulAssign, mul_assign, *);
slice_assign_op!(DivAssign, div_assign, /);

macro_rules! slice_binary_op {
    ($trait:ident, $method:ident, $assign:ident, $op:tt) => {
        impl $trait<&Slice> for &Slice {
            type Output = Slice;
            fn $method(self, rhs: &Slice) -> Slice {
                let mut r = self.clone();
                r.$assign(rhs);
                r
            }
        }

        impl $trait<&Slice> for Slice {
            type Output = Slice;
            fn $method(mut self, rhs: &Slice) -> Slice {
                self.$assign(rhs);
                self
            }
        }

        impl $trait<Slice> for Slice {
            type Output = Slice;
            fn $method(mut self, rhs: Slice) -> Slice {
                self.$assign(&rhs);
                self
            }
        }

        impl $trait<Real> for &Slice {
            type Output = Slice;
            fn $method(self, rhs: Real) -> Slice {
                self.apply(|a| a $op rhs)
            }
        }

        impl $trait<Real> for Slice {
            type Output = Slice;
            fn $method(mut self, rhs: Real) -> Slice {
                self.$assign(rhs);
                self
            }
        }

        impl $trait<&Slice> for Real {
            type Output = Slice;
            fn $method(self, rhs: &Slice) -> Slice {
                rhs.apply(|b| self $op b)
            }
        }

        impl $trait<Slice> for Real {
            type Output = Slice;
            fn $method(self, mut rhs: Slice) -> Slice {
                rhs.map_in_place(|b| self $op b);
                rhs
            }
        }
    };
}

slice_binary_op!(Add, add, add_assign, +);
slice_binary_op!(Sub, sub, sub_assign, -);
slice_binary_op!(Mul, mul, mul_assign, *);
slice_binary_op!(Div, div, div_assign, /);

impl Neg for &Slice {
    type Output = Slice;
    fn neg(self) -> Slice {
        self.apply(|x| -x)
    }
}

impl Neg for Slice {
    type Output = Slice;
    fn neg(mut self) -> Slice {
        self.map_in_place(|x| -x);
        self
    }
}
