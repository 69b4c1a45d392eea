//! Pluggable interpolation back ends.
//!
//! An [`Interp`] starts life as an unconfigured prototype naming a method
//! (`linear`, `cspline`, `steffen`, `akima`, `polynomial`). Assigning nodes
//! builds the curve; the value and its first two derivatives are then
//! available as [`Function`]s on `[x_0, x_{n-1}]`.
//!
//! When there are not more nodes than the method's minimal size the curve
//! silently degrades to linear interpolation.

use std::fmt;
use std::sync::Arc;

use gl_core::{errors::Result, Real};

use crate::function::Function;
use crate::interpolations::{
    check_nodes, AkimaSpline, CubicNaturalSpline, Interpolation1D, LinearInterpolation,
    PolynomialInterpolation, SteffenSpline,
};

/// A method for building an interpolating curve from nodes.
pub trait InterpMethod: fmt::Debug + Send + Sync {
    /// The method is used only with strictly more nodes than this.
    fn min_size(&self) -> usize;

    /// Build the curve through `(xs, ys)`.
    fn build(&self, xs: &[Real], ys: &[Real]) -> Result<Arc<dyn Interpolation1D>>;
}

macro_rules! interp_method {
    ($(#[$doc:meta])* $name:ident, $curve:ty, $min:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl InterpMethod for $name {
            fn min_size(&self) -> usize {
                $min
            }

            fn build(&self, xs: &[Real], ys: &[Real]) -> Result<Arc<dyn Interpolation1D>> {
                Ok(Arc::new(<$curve>::new(xs, ys)?))
            }
        }
    };
}

interp_method!(
    /// Piecewise linear.
    Linear, LinearInterpolation, 2
);
interp_method!(
    /// Natural cubic spline.
    CubicSpline, CubicNaturalSpline, 3
);
interp_method!(
    /// Steffen's monotone cubic.
    Steffen, SteffenSpline, 3
);
interp_method!(
    /// Akima spline.
    Akima, AkimaSpline, 5
);
interp_method!(
    /// Polynomial through all nodes.
    Polynomial, PolynomialInterpolation, 3
);

/// Interpolation prototype, optionally configured with nodes.
#[derive(Clone)]
pub struct Interp {
    method: Arc<dyn InterpMethod>,
    curve: Option<Arc<dyn Interpolation1D>>,
}

impl Interp {
    /// Prototype for a custom method.
    pub fn new(method: Arc<dyn InterpMethod>) -> Self {
        Self {
            method,
            curve: None,
        }
    }

    /// Piecewise linear interpolation.
    pub fn linear() -> Self {
        Self::new(Arc::new(Linear))
    }

    /// Natural cubic spline.
    pub fn cspline() -> Self {
        Self::new(Arc::new(CubicSpline))
    }

    /// Steffen's monotone cubic.
    pub fn steffen() -> Self {
        Self::new(Arc::new(Steffen))
    }

    /// Akima spline.
    pub fn akima() -> Self {
        Self::new(Arc::new(Akima))
    }

    /// Polynomial through all nodes.
    pub fn polynomial() -> Self {
        Self::new(Arc::new(Polynomial))
    }

    /// The method this prototype builds with.
    pub fn method(&self) -> &Arc<dyn InterpMethod> {
        &self.method
    }

    /// Build the curve through `(xs, ys)`.
    ///
    /// # Errors
    /// If fewer than two nodes are given, lengths differ, or `xs` is not
    /// strictly increasing.
    pub fn assign(&mut self, xs: &[Real], ys: &[Real]) -> Result<()> {
        check_nodes(xs, ys)?;
        let curve = if xs.len() > self.method.min_size() {
            self.method.build(xs, ys)?
        } else {
            tracing::trace!(
                nodes = xs.len(),
                method = ?self.method,
                "too few nodes, falling back to linear interpolation"
            );
            Linear.build(xs, ys)?
        };
        self.curve = Some(curve);
        Ok(())
    }

    /// Configured copy through `(xs, ys)`, leaving `self` untouched.
    pub fn assigned(&self, xs: &[Real], ys: &[Real]) -> Result<Self> {
        let mut other = self.clone();
        other.assign(xs, ys)?;
        Ok(other)
    }

    fn curve(&self) -> Arc<dyn Interpolation1D> {
        match &self.curve {
            Some(c) => Arc::clone(c),
            None => panic!("interpolation used before nodes were assigned"),
        }
    }

    /// The interpolating curve.
    pub fn interp(&self) -> Function {
        let c = self.curve();
        let (l, r) = (c.x_min(), c.x_max());
        Function::new(move |x| c.operator(x), l, r)
    }

    /// First derivative of the curve.
    pub fn deriv(&self) -> Function {
        let c = self.curve();
        let (l, r) = (c.x_min(), c.x_max());
        Function::new(move |x| c.derivative(x), l, r)
    }

    /// Second derivative of the curve.
    pub fn deriv2(&self) -> Function {
        let c = self.curve();
        let (l, r) = (c.x_min(), c.x_max());
        Function::new(move |x| c.second_derivative(x), l, r)
    }
}

impl Default for Interp {
    fn default() -> Self {
        Self::cspline()
    }
}

impl fmt::Debug for Interp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interp")
            .field("method", &self.method)
            .field("assigned", &self.curve.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn falls_back_to_linear_with_few_nodes() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 4.0];
        let f = Interp::cspline().assigned(&xs, &ys).unwrap();
        assert_abs_diff_eq!(f.interp().value(1.5), 2.5, epsilon = 1e-15);
        assert_abs_diff_eq!(f.deriv2().value(0.5), 0.0, epsilon = 1e-15);

        let g = Interp::akima().assigned(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0; 5]).unwrap();
        assert_abs_diff_eq!(g.interp().value(2.5), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn domain_is_node_range() {
        let f = Interp::steffen()
            .assigned(&[-1.0, 0.0, 1.0, 2.0], &[1.0, 0.0, 1.0, 4.0])
            .unwrap();
        let g = f.interp();
        assert!(g.belongs(-1.0) && g.belongs(2.0));
        assert!(!g.belongs(2.1));
    }

    #[test]
    fn every_method_interpolates_nodes() {
        let xs: Vec<Real> = (0..8).map(|i| i as Real * 0.5).collect();
        let ys: Vec<Real> = xs.iter().map(|x| x.sin()).collect();
        for proto in [
            Interp::linear(),
            Interp::cspline(),
            Interp::steffen(),
            Interp::akima(),
            Interp::polynomial(),
        ] {
            let f = proto.assigned(&xs, &ys).unwrap().interp();
            for (&x, &y) in xs.iter().zip(&ys) {
                assert_abs_diff_eq!(f.value(x), y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    #[should_panic(expected = "before nodes were assigned")]
    fn unassigned_prototype_panics() {
        Interp::linear().interp();
    }
}
