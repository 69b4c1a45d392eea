//! Weighted least-squares fitting of curves.
//!
//! A [`Fit`] is a prototype holding a linear family
//!
//! ```text
//! g(x) = Σ_j c_j φ_j(x) + f_free(x)
//! ```
//!
//! Assigning data `(x_i, y_i, w_i)` estimates the coefficients. The fitted
//! curve, the standard deviation of its value, and the raw parameters are
//! then available through [`Fit::fit`], [`Fit::err`] and [`Fit::param`].
//!
//! A fit needs strictly more points than basis functions; otherwise
//! assignment fails with [`Error::InsufficientSize`].

mod bspline;
mod least_squares;

use std::fmt;
use std::sync::Arc;

use gl_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use nalgebra::DMatrix;

use crate::function::Function;
pub use bspline::BSplineBasis;

/// Estimated parameters of a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitParam {
    /// Coefficients of the basis functions.
    pub fit: Vec<Real>,
    /// Covariance matrix of the coefficients, row-major.
    pub cov: Vec<Real>,
    /// Weighted sum of squared residuals.
    pub chi2: Real,
}

/// A finite family of basis functions plus a fixed free term.
pub trait FitBasis: fmt::Debug + Send + Sync {
    /// Number of basis functions.
    fn size(&self) -> usize;

    /// Values of the basis functions at `x`.
    fn values(&self, x: Real) -> Vec<Real>;

    /// The free term at `x`.
    fn free(&self, x: Real) -> Real;

    /// Returns `true` if every basis function and the free term are
    /// defined at `x`.
    fn belongs(&self, x: Real) -> bool;
}

/// Basis given by explicit [`Function`]s.
#[derive(Debug, Clone)]
pub struct FunctionBasis {
    basis: Vec<Function>,
    free: Function,
}

impl FunctionBasis {
    /// Basis `basis` with free term `free`.
    pub fn new(basis: Vec<Function>, free: Function) -> Self {
        assert!(!basis.is_empty(), "a fit needs at least one basis function");
        Self { basis, free }
    }
}

impl FitBasis for FunctionBasis {
    fn size(&self) -> usize {
        self.basis.len()
    }

    fn values(&self, x: Real) -> Vec<Real> {
        self.basis.iter().map(|f| f.value(x)).collect()
    }

    fn free(&self, x: Real) -> Real {
        self.free.value(x)
    }

    fn belongs(&self, x: Real) -> bool {
        self.free.belongs(x) && self.basis.iter().all(|f| f.belongs(x))
    }
}

impl FitBasis for BSplineBasis {
    fn size(&self) -> usize {
        self.len()
    }

    fn values(&self, x: Real) -> Vec<Real> {
        assert!(FitBasis::belongs(self, x), "argument {x} is outside the B-spline support");
        BSplineBasis::values(self, x)
    }

    fn free(&self, _x: Real) -> Real {
        0.0
    }

    fn belongs(&self, x: Real) -> bool {
        self.left() <= x && x <= self.right()
    }
}

fn zero() -> Function {
    Function::new(|_| 0.0, Real::NEG_INFINITY, Real::INFINITY)
}

fn one() -> Function {
    Function::new(|_| 1.0, Real::NEG_INFINITY, Real::INFINITY)
}

/// Least-squares fit prototype, optionally assigned with data.
#[derive(Clone)]
pub struct Fit {
    basis: Arc<dyn FitBasis>,
    param: Option<Arc<FitParam>>,
}

impl Fit {
    /// Fit over an arbitrary basis.
    pub fn new(basis: Arc<dyn FitBasis>) -> Self {
        Self { basis, param: None }
    }

    /// `Σ c_j basis_j + free`.
    pub fn linear(basis: Vec<Function>, free: Function) -> Self {
        Self::new(Arc::new(FunctionBasis::new(basis, free)))
    }

    /// `c · base + free`.
    pub fn linear_one(base: Function, free: Function) -> Self {
        Self::linear(vec![base], free)
    }

    /// `c · base` with no free term.
    pub fn proportional(base: Function) -> Self {
        Self::linear(vec![base], zero())
    }

    /// `c_0 + c_1 · base + free`.
    pub fn linear_regression(base: Function, free: Function) -> Self {
        Self::linear(vec![one(), base], free)
    }

    /// B-splines of the given order on explicit breakpoints.
    pub fn bspline(order: usize, breakpoints: &[Real]) -> Result<Self> {
        Ok(Self::new(Arc::new(BSplineBasis::new(order, breakpoints)?)))
    }

    /// B-splines of the given order on `n` uniform breakpoints in `[left, right]`.
    pub fn bspline_uniform(order: usize, left: Real, right: Real, n: usize) -> Result<Self> {
        Ok(Self::new(Arc::new(BSplineBasis::uniform(order, left, right, n)?)))
    }

    /// Estimate the coefficients from weighted data.
    ///
    /// With `chi2 = true` the covariance is scaled by the residual variance
    /// `χ² / (n − #basis)`, as appropriate when the weights are only known up
    /// to a common factor.
    ///
    /// # Errors
    /// [`Error::InsufficientSize`] if there are not more points than basis
    /// functions; [`Error::Precondition`] for mismatched lengths, non-positive
    /// weights, or arguments outside the basis domain.
    pub fn assign(&mut self, args: &[Real], values: &[Real], weights: &[Real], chi2: bool) -> Result<()> {
        let n = args.len();
        let m = self.basis.size();
        ensure!(
            values.len() == n && weights.len() == n,
            "arguments, values and weights must have the same length"
        );
        ensure!(weights.iter().all(|&w| w > 0.0), "weights must be positive");
        ensure!(
            args.iter().all(|&x| self.basis.belongs(x)),
            "fit arguments must lie in the domain of the basis"
        );
        if n <= m {
            return Err(Error::InsufficientSize(format!(
                "{n} points are not enough to fit {m} basis functions"
            )));
        }

        let mut design = DMatrix::zeros(n, m);
        let mut y = Vec::with_capacity(n);
        for (i, (&x, &v)) in args.iter().zip(values).enumerate() {
            for (j, b) in self.basis.values(x).into_iter().enumerate() {
                design[(i, j)] = b;
            }
            y.push(v - self.basis.free(x));
        }

        let mut sol = least_squares::solve(&design, &y, weights)?;
        if chi2 {
            sol.covariance *= sol.chi2 / (n - m) as Real;
        }
        tracing::trace!(points = n, basis = m, chi2 = sol.chi2, "least-squares fit");

        self.param = Some(Arc::new(FitParam {
            fit: sol.coefficients.iter().copied().collect(),
            cov: sol.covariance.transpose().iter().copied().collect(),
            chi2: sol.chi2,
        }));
        Ok(())
    }

    /// Assigned copy, leaving `self` untouched.
    pub fn assigned(&self, args: &[Real], values: &[Real], weights: &[Real], chi2: bool) -> Result<Self> {
        let mut other = self.clone();
        other.assign(args, values, weights, chi2)?;
        Ok(other)
    }

    fn fitted(&self) -> Arc<FitParam> {
        match &self.param {
            Some(p) => Arc::clone(p),
            None => panic!("fit used before data was assigned"),
        }
    }

    /// The fitted curve.
    pub fn fit(&self) -> Function {
        let param = self.fitted();
        let (basis, domain) = (Arc::clone(&self.basis), Arc::clone(&self.basis));
        Function::with_domain(
            move |x| {
                let v = basis.values(x);
                v.iter().zip(&param.fit).map(|(b, c)| b * c).sum::<Real>() + basis.free(x)
            },
            move |x| domain.belongs(x),
        )
    }

    /// Standard deviation of the fitted value, `sqrt(φ(x)ᵀ Cov φ(x))`.
    pub fn err(&self) -> Function {
        let param = self.fitted();
        let (basis, domain) = (Arc::clone(&self.basis), Arc::clone(&self.basis));
        Function::with_domain(
            move |x| {
                let v = basis.values(x);
                let m = v.len();
                let mut q = 0.0;
                for i in 0..m {
                    for j in 0..m {
                        q += v[i] * param.cov[i * m + j] * v[j];
                    }
                }
                q.max(0.0).sqrt()
            },
            move |x| domain.belongs(x),
        )
    }

    /// The estimated parameters.
    pub fn param(&self) -> FitParam {
        (*self.fitted()).clone()
    }
}

impl fmt::Debug for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fit")
            .field("basis", &self.basis)
            .field("param", &self.param)
            .finish()
    }
}
