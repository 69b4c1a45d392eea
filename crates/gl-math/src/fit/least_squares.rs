//! Weighted linear least squares by singular value decomposition.
//!
//! Solves `min Σ w_i (y_i − Σ_j X_ij c_j)²` by scaling the rows of the
//! design matrix with `sqrt(w_i)` and pseudo-inverting
//! `√W X = U Σ Vᵀ`:
//!
//! ```text
//! c   = V Σ⁺ Uᵀ √W y
//! cov = V Σ⁺² Vᵀ          (= (Xᵀ W X)⁻¹ at full rank)
//! χ²  = Σ w_i r_i²
//! ```

use gl_core::{
    errors::{Error, Result},
    Real,
};
use nalgebra::{DMatrix, DVector};

/// Coefficients, covariance, and weighted residual sum of a fit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WeightedSolution {
    pub coefficients: DVector<Real>,
    pub covariance: DMatrix<Real>,
    pub chi2: Real,
}

/// Solve the weighted problem for an `n × m` design matrix.
pub(crate) fn solve(design: &DMatrix<Real>, y: &[Real], w: &[Real]) -> Result<WeightedSolution> {
    let (n, m) = design.shape();
    debug_assert!(y.len() == n && w.len() == n);

    let sqrt_w: Vec<Real> = w.iter().map(|wi| wi.sqrt()).collect();
    let mut a = design.clone();
    for (i, &s) in sqrt_w.iter().enumerate() {
        a.row_mut(i).scale_mut(s);
    }
    let b = DVector::from_iterator(n, y.iter().zip(&sqrt_w).map(|(yi, s)| yi * s));

    let svd = a.clone().svd(true, true);
    let u = svd
        .u
        .as_ref()
        .ok_or_else(|| Error::Runtime("SVD did not return U".into()))?;
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| Error::Runtime("SVD did not return Vᵀ".into()))?;
    let sv = &svd.singular_values;

    // Threshold: max(n,m) * eps * max(singular_values)
    let sv_max = sv.iter().copied().fold(0.0_f64, f64::max);
    let threshold = n.max(m) as Real * f64::EPSILON * sv_max;

    let ut_b = u.transpose() * &b;
    let mut coefficients = DVector::zeros(m);
    let mut covariance = DMatrix::zeros(m, m);
    for k in 0..sv.len() {
        let s = sv[k];
        if s <= threshold {
            continue;
        }
        let v_k = v_t.row(k).transpose();
        coefficients += &v_k * (ut_b[k] / s);
        covariance += &v_k * v_k.transpose() / (s * s);
    }

    let residual = &b - &a * &coefficients;
    let chi2 = residual.norm_squared();

    Ok(WeightedSolution {
        coefficients,
        covariance,
        chi2,
    })
}
