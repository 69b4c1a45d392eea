//! Smoothed indicator functions on a uniform grid.
//!
//! Replacing `1{f ≥ b}` by its grid values introduces an error of the order
//! of the grid step at the jump, which the Gaussian rollback then carries
//! into every price. The smoothed variants instead assign to each node the
//! fraction of its half-cells on which the linearly interpolated `f − b` is
//! non-negative.
//!
//! * [`Naive`] — hard `0 / 1`
//! * [`Linear`] — fraction measured linearly in the crossing position
//! * [`Quadratic`] — fraction measured quadratically in the crossing position

use std::fmt;

use gl_core::Real;

/// Converts grid values of `f` into the indicator of `{f ≥ barrier}`.
pub trait Indicator: fmt::Debug + Send + Sync {
    /// Overwrite `values` with the indicator of `values ≥ barrier`.
    fn indicator(&self, values: &mut [Real], barrier: Real);
}

/// Hard indicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Naive;

impl Indicator for Naive {
    fn indicator(&self, values: &mut [Real], barrier: Real) {
        for v in values.iter_mut() {
            *v = if *v >= barrier { 1.0 } else { 0.0 };
        }
    }
}

/// Indicator linear in the position of the sign change.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl Indicator for Linear {
    fn indicator(&self, values: &mut [Real], barrier: Real) {
        sweep(values, barrier, |left, right, carry| {
            let prev = *carry;
            *carry = if left != right {
                ((left.max(0.0) - right.max(0.0)) / (left - right)).abs()
            } else if left >= 0.0 {
                1.0
            } else {
                0.0
            };
            0.5 * (prev + *carry)
        });
    }
}

/// Indicator quadratic in the position of the sign change.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quadratic;

impl Indicator for Quadratic {
    fn indicator(&self, values: &mut [Real], barrier: Real) {
        sweep(values, barrier, |left, right, carry| {
            let mut ind = *carry;
            if left < 0.0 && right >= 0.0 {
                ind += (right / (right - left)).powi(2);
                *carry = 1.0 - (left / (left - right)).powi(2);
            } else if left >= 0.0 && right < 0.0 {
                ind += 1.0 - (right / (right - left)).powi(2);
                *carry = 1.0 - (left / (left - right)).powi(2);
            } else {
                *carry = if left >= 0.0 && right >= 0.0 { 1.0 } else { 0.0 };
                ind += *carry;
            }
            0.5 * ind
        });
    }
}

/// One pass over neighbouring pairs of `values − barrier`.
///
/// `pair(left, right, carry)` returns the new value of the left node; the
/// carry holds the contribution of the right half-cell of the left node to
/// the next node. The last node closes with its own sign.
fn sweep<F>(values: &mut [Real], barrier: Real, mut pair: F)
where
    F: FnMut(Real, Real, &mut Real) -> Real,
{
    let n = values.len();
    if n == 0 {
        return;
    }
    for v in values.iter_mut() {
        *v -= barrier;
    }
    let last = values[n - 1];
    let mut carry = if values[0] < 0.0 { 0.0 } else { 1.0 };
    for i in 0..n - 1 {
        // values[i + 1] still holds the shifted input
        values[i] = pair(values[i], values[i + 1], &mut carry);
    }
    values[n - 1] = 0.5 * carry + if last >= 0.0 { 0.5 } else { 0.0 };
}

/// Choice of indicator smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndicatorKind {
    /// [`Naive`].
    Naive,
    /// [`Linear`].
    #[default]
    Linear,
    /// [`Quadratic`].
    Quadratic,
}

impl IndicatorKind {
    /// The corresponding strategy object.
    pub fn build(self) -> std::sync::Arc<dyn Indicator> {
        match self {
            IndicatorKind::Naive => std::sync::Arc::new(Naive),
            IndicatorKind::Linear => std::sync::Arc::new(Linear),
            IndicatorKind::Quadratic => std::sync::Arc::new(Quadratic),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndicatorKind::Naive => "naive",
            IndicatorKind::Linear => "linear",
            IndicatorKind::Quadratic => "quadratic",
        };
        f.write_str(name)
    }
}
