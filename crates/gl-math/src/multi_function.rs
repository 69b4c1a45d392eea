//! Vector-valued functions of several variables.
//!
//! Interpolating a slice produces a [`MultiFunction`] of the model's state
//! variables. In the one-dimensional lattice `dim_d == dim_r == 1` and
//! [`MultiFunction::to_function`] recovers a plain [`Function`].

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::sync::Arc;

use gl_core::Real;

use crate::function::Function;

type Map = Arc<dyn Fn(&[Real]) -> Vec<Real> + Send + Sync>;
type Domain = Arc<dyn Fn(&[Real]) -> bool + Send + Sync>;

/// A map from `R^dim_d` to `R^dim_r` with a domain predicate.
#[derive(Clone)]
pub struct MultiFunction {
    f: Map,
    domain: Domain,
    dim_d: usize,
    dim_r: usize,
}

impl MultiFunction {
    /// Wrap a closure together with its domain and dimensions.
    pub fn new<F, D>(f: F, domain: D, dim_d: usize, dim_r: usize) -> Self
    where
        F: Fn(&[Real]) -> Vec<Real> + Send + Sync + 'static,
        D: Fn(&[Real]) -> bool + Send + Sync + 'static,
    {
        assert!(dim_d > 0 && dim_r > 0, "dimensions must be positive");
        Self {
            f: Arc::new(f),
            domain: Arc::new(domain),
            dim_d,
            dim_r,
        }
    }

    /// The constant map `x ↦ values` on all of `R^dim_d`.
    pub fn constant(values: Vec<Real>, dim_d: usize) -> Self {
        let dim_r = values.len();
        Self::new(move |_| values.clone(), |_| true, dim_d, dim_r)
    }

    /// Number of arguments.
    pub fn dim_d(&self) -> usize {
        self.dim_d
    }

    /// Number of results.
    pub fn dim_r(&self) -> usize {
        self.dim_r
    }

    /// Returns `true` if `x` belongs to the domain.
    pub fn belongs(&self, x: &[Real]) -> bool {
        x.len() == self.dim_d && (self.domain)(x)
    }

    /// Evaluate at `x`.
    ///
    /// # Panics
    /// If `x` has the wrong length or lies outside the domain.
    pub fn value(&self, x: &[Real]) -> Vec<Real> {
        assert_eq!(x.len(), self.dim_d, "wrong number of arguments");
        assert!((self.domain)(x), "argument {x:?} is outside the domain");
        let y = (self.f)(x);
        debug_assert_eq!(y.len(), self.dim_r);
        y
    }

    /// Collapse a one-to-one dimensional map into a [`Function`].
    ///
    /// # Panics
    /// If `dim_d != 1` or `dim_r != 1`.
    pub fn to_function(&self) -> Function {
        assert!(
            self.dim_d == 1 && self.dim_r == 1,
            "not a scalar function of one variable"
        );
        let (f, domain) = (Arc::clone(&self.f), Arc::clone(&self.domain));
        Function::with_domain(move |x| f(&[x])[0], move |x| domain(&[x]))
    }

    /// Componentwise `op` applied to the results.
    pub fn apply<Op>(&self, op: Op) -> Self
    where
        Op: Fn(Real) -> Real + Send + Sync + 'static,
    {
        let f = Arc::clone(&self.f);
        Self {
            f: Arc::new(move |x: &[Real]| f(x).into_iter().map(&op).collect()),
            domain: Arc::clone(&self.domain),
            dim_d: self.dim_d,
            dim_r: self.dim_r,
        }
    }

    /// Componentwise `op(f(x), g(x))` on the intersection of domains.
    pub fn combine<Op>(&self, other: &MultiFunction, op: Op) -> Self
    where
        Op: Fn(Real, Real) -> Real + Send + Sync + 'static,
    {
        assert_eq!(self.dim_d, other.dim_d, "argument dimensions differ");
        assert_eq!(self.dim_r, other.dim_r, "result dimensions differ");
        let (f, g) = (Arc::clone(&self.f), Arc::clone(&other.f));
        let (df, dg) = (Arc::clone(&self.domain), Arc::clone(&other.domain));
        Self {
            f: Arc::new(move |x: &[Real]| {
                f(x).into_iter()
                    .zip(g(x))
                    .map(|(a, b)| op(a, b))
                    .collect()
            }),
            domain: Arc::new(move |x: &[Real]| df(x) && dg(x)),
            dim_d: self.dim_d,
            dim_r: self.dim_r,
        }
    }

    /// Restrict to the arguments at `flex`, holding the others at `fixed`.
    ///
    /// `flex` must be strictly increasing and `fixed` lists the values of the
    /// remaining arguments in their natural order.
    pub fn section(&self, flex: &[usize], fixed: &[Real]) -> Self {
        assert_eq!(
            self.dim_d,
            flex.len() + fixed.len(),
            "section must fix every non-flexible argument"
        );
        assert!(!flex.is_empty() && !fixed.is_empty());
        assert!(flex.windows(2).all(|w| w[0] < w[1]));
        assert!(flex.iter().all(|&i| i < self.dim_d));

        let mut template = vec![0.0; self.dim_d];
        let mut values = fixed.iter();
        for (i, slot) in template.iter_mut().enumerate() {
            if flex.binary_search(&i).is_err() {
                // lengths were checked above
                *slot = values.next().copied().unwrap_or_default();
            }
        }

        let flex = flex.to_vec();
        let embed = Arc::new(move |x: &[Real]| {
            let mut full = template.clone();
            for (&i, &xi) in flex.iter().zip(x) {
                full[i] = xi;
            }
            full
        });
        let (f, domain) = (Arc::clone(&self.f), Arc::clone(&self.domain));
        let embed_domain = Arc::clone(&embed);
        let dim_d = self.dim_d - fixed.len();
        Self {
            f: Arc::new(move |x: &[Real]| f(&embed(x))),
            domain: Arc::new(move |x: &[Real]| domain(&embed_domain(x))),
            dim_d,
            dim_r: self.dim_r,
        }
    }

    /// Stack several maps with a common argument into one.
    pub fn stack(parts: &[MultiFunction]) -> Self {
        assert!(!parts.is_empty(), "nothing to stack");
        let dim_d = parts[0].dim_d;
        assert!(parts.iter().all(|p| p.dim_d == dim_d));
        let dim_r = parts.iter().map(|p| p.dim_r).sum();
        let fs: Vec<MultiFunction> = parts.to_vec();
        let ds = fs.clone();
        Self {
            f: Arc::new(move |x: &[Real]| fs.iter().flat_map(|p| (p.f)(x)).collect()),
            domain: Arc::new(move |x: &[Real]| ds.iter().all(|p| (p.domain)(x))),
            dim_d,
            dim_r,
        }
    }
}

impl From<Function> for MultiFunction {
    fn from(f: Function) -> Self {
        let g = f.clone();
        Self::new(move |x| vec![f.value(x[0])], move |x| g.belongs(x[0]), 1, 1)
    }
}

impl fmt::Debug for MultiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiFunction")
            .field("dim_d", &self.dim_d)
            .field("dim_r", &self.dim_r)
            .finish_non_exhaustive()
    }
}

macro_rules! multi_function_binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&MultiFunction> for &MultiFunction {
            type Output = MultiFunction;
            fn $method(self, rhs: &MultiFunction) -> MultiFunction {
                self.combine(rhs, |a, b| a $op b)
            }
        }

        impl $trait<Real> for &MultiFunction {
            type Output = MultiFunction;
            fn $method(self, rhs: Real) -> MultiFunction {
                self.apply(move |a| a $op rhs)
            }
        }

        impl $trait<Real> for MultiFunction {
            type Output = MultiFunction;
            fn $method(self, rhs: Real) -> MultiFunction {
                (&self).$method(rhs)
            }
        }
    };
}

multi_function_binary_op!(Add, add, +);
multi_function_binary_op!(Sub, sub, -);
multi_function_binary_op!(Mul, mul, *);
multi_function_binary_op!(Div, div, /);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn plane() -> MultiFunction {
        MultiFunction::new(
            |x| vec![x[0] + 2.0 * x[1] + 3.0 * x[2]],
            |x| x[0] >= 0.0,
            3,
            1,
        )
    }

    #[test]
    fn section_fixes_remaining_arguments() {
        let f = plane().section(&[1], &[1.0, 10.0]);
        assert_eq!(f.dim_d(), 1);
        assert_abs_diff_eq!(f.value(&[0.5])[0], 1.0 + 1.0 + 30.0, epsilon = 1e-14);
        let g = plane().section(&[0, 2], &[-1.0]);
        assert_abs_diff_eq!(g.value(&[1.0, 1.0])[0], 1.0 - 2.0 + 3.0, epsilon = 1e-14);
        assert!(!g.belongs(&[-1.0, 0.0]));
    }

    #[test]
    fn function_round_trip_keeps_domain() {
        let f = Function::new(|x| x * x, -1.0, 1.0);
        let m = MultiFunction::from(f) * 2.0;
        assert!(!m.belongs(&[2.0]));
        let g = m.to_function();
        assert_abs_diff_eq!(g.value(0.5), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn stack_concatenates_results() {
        let a = MultiFunction::constant(vec![1.0, 2.0], 1);
        let b = MultiFunction::from(Function::new(|x| -x, -5.0, 5.0));
        let s = MultiFunction::stack(&[a, b]);
        assert_eq!(s.dim_r(), 3);
        assert_eq!(s.value(&[4.0]), vec![1.0, 2.0, -4.0]);
    }
}
