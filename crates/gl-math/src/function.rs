//! One-dimensional functions with an explicit domain.
//!
//! A [`Function`] pairs a shared closure with a membership predicate.
//! Curves in the models (discount, forward, volatility, shape) and the
//! outputs of interpolation and fitting are all `Function`s.
//!
//! Evaluating outside the domain is a programming error and panics.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use gl_core::Real;

type Map = Arc<dyn Fn(Real) -> Real + Send + Sync>;
type Domain = Arc<dyn Fn(Real) -> bool + Send + Sync>;

/// A real function of one real variable defined on a subset of the line.
#[derive(Clone)]
pub struct Function {
    f: Map,
    domain: Domain,
}

impl Function {
    /// A function defined on the closed interval `[left, right]`.
    ///
    /// Either end may be infinite.
    pub fn new<F>(f: F, left: Real, right: Real) -> Self
    where
        F: Fn(Real) -> Real + Send + Sync + 'static,
    {
        assert!(left <= right, "empty domain [{left}, {right}]");
        Self {
            f: Arc::new(f),
            domain: Arc::new(move |x| left <= x && x <= right),
        }
    }

    /// A function defined on `[left, +∞)`.
    pub fn from_time<F>(f: F, left: Real) -> Self
    where
        F: Fn(Real) -> Real + Send + Sync + 'static,
    {
        Self::new(f, left, Real::INFINITY)
    }

    /// A function whose domain is given by an arbitrary predicate.
    pub fn with_domain<F, D>(f: F, domain: D) -> Self
    where
        F: Fn(Real) -> Real + Send + Sync + 'static,
        D: Fn(Real) -> bool + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            domain: Arc::new(domain),
        }
    }

    /// The constant `value` on `[left, right]`.
    pub fn constant(value: Real, left: Real, right: Real) -> Self {
        Self::new(move |_| value, left, right)
    }

    /// Evaluate at `x`.
    ///
    /// # Panics
    /// If `x` is outside the domain.
    pub fn value(&self, x: Real) -> Real {
        assert!(self.belongs(x), "argument {x} is outside the domain");
        (self.f)(x)
    }

    /// Returns `true` if `x` belongs to the domain.
    pub fn belongs(&self, x: Real) -> bool {
        (self.domain)(x)
    }

    /// `x ↦ op(f(x))` on the same domain.
    pub fn apply<Op>(&self, op: Op) -> Self
    where
        Op: Fn(Real) -> Real + Send + Sync + 'static,
    {
        let f = Arc::clone(&self.f);
        Self {
            f: Arc::new(move |x| op(f(x))),
            domain: Arc::clone(&self.domain),
        }
    }

    /// `x ↦ op(f(x), g(x))` on the intersection of the two domains.
    pub fn combine<Op>(&self, other: &Function, op: Op) -> Self
    where
        Op: Fn(Real, Real) -> Real + Send + Sync + 'static,
    {
        let (f, g) = (Arc::clone(&self.f), Arc::clone(&other.f));
        let (df, dg) = (Arc::clone(&self.domain), Arc::clone(&other.domain));
        Self {
            f: Arc::new(move |x| op(f(x), g(x))),
            domain: Arc::new(move |x| df(x) && dg(x)),
        }
    }

    /// Pointwise square root.
    pub fn sqrt(&self) -> Self {
        self.apply(Real::sqrt)
    }

    /// Pointwise exponential.
    pub fn exp(&self) -> Self {
        self.apply(Real::exp)
    }

    /// Pointwise natural logarithm.
    pub fn ln(&self) -> Self {
        self.apply(Real::ln)
    }

    /// Pointwise absolute value.
    pub fn abs(&self) -> Self {
        self.apply(Real::abs)
    }

    /// Pointwise power.
    pub fn powf(&self, p: Real) -> Self {
        self.apply(move |x| x.powf(p))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function { .. }")
    }
}

macro_rules! function_binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Function> for &Function {
            type Output = Function;
            fn $method(self, rhs: &Function) -> Function {
                self.combine(rhs, |a, b| a $op b)
            }
        }

        impl $trait<Function> for Function {
            type Output = Function;
            fn $method(self, rhs: Function) -> Function {
                (&self).$method(&rhs)
            }
        }

        impl $trait<Real> for &Function {
            type Output = Function;
            fn $method(self, rhs: Real) -> Function {
                self.apply(move |a| a $op rhs)
            }
        }

        impl $trait<Real> for Function {
            type Output = Function;
            fn $method(self, rhs: Real) -> Function {
                (&self).$method(rhs)
            }
        }

        impl $trait<&Function> for Real {
            type Output = Function;
            fn $method(self, rhs: &Function) -> Function {
                rhs.apply(move |b| self $op b)
            }
        }

        impl $trait<Function> for Real {
            type Output = Function;
            fn $method(self, rhs: Function) -> Function {
                self.$method(&rhs)
            }
        }
    };
}

function_binary_op!(Add, add, +);
function_binary_op!(Sub, sub, -);
function_binary_op!(Mul, mul, *);
function_binary_op!(Div, div, /);

impl Neg for &Function {
    type Output = Function;
    fn neg(self) -> Function {
        self.apply(|x| -x)
    }
}

impl Neg for Function {
    type Output = Function;
    fn neg(self) -> Function {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn arithmetic_intersects_domains() {
        let f = Function::new(|x| x * x, 0.0, 2.0);
        let g = Function::new(|x| x + 1.0, 1.0, 3.0);
        let h = &f * &g - 1.0;
        assert!(!h.belongs(0.5));
        assert!(h.belongs(1.5));
        assert!(!h.belongs(2.5));
        assert_abs_diff_eq!(h.value(2.0), 4.0 * 3.0 - 1.0, epsilon = 1e-15);
    }

    #[test]
    fn scalar_on_the_left() {
        let f = Function::constant(4.0, 0.0, 1.0);
        assert_abs_diff_eq!((1.0 / &f).value(0.5), 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!((10.0 - f).value(0.5), 6.0, epsilon = 1e-15);
    }

    #[test]
    fn half_line_domain() {
        let f = Function::from_time(|t| (-0.05 * t).exp(), 0.0);
        assert!(f.belongs(1e6));
        assert!(!f.belongs(-1e-3));
        assert_abs_diff_eq!(f.ln().value(2.0), -0.1, epsilon = 1e-14);
    }

    #[test]
    #[should_panic(expected = "outside the domain")]
    fn evaluation_outside_domain_panics() {
        let f = Function::new(|x| x, 0.0, 1.0);
        f.value(2.0);
    }
}
