//! Akima spline interpolation.
//!
//! Akima splines avoid the overshooting problems of natural cubic splines by
//! using a weighted average of neighbouring slopes to determine the tangent at
//! each point.

use gl_core::{errors::Result, Real};

use super::cubic::{secants, PiecewiseCubic};
use super::{check_nodes, Interpolation1D};

/// Akima spline interpolation.
#[derive(Debug, Clone)]
pub struct AkimaSpline {
    inner: PiecewiseCubic,
}

impl AkimaSpline {
    /// Build an Akima spline through the given data points.
    ///
    /// The full Akima formula wants at least 5 points; with fewer, the
    /// phantom end slopes degenerate gracefully.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys)?;
        let n = xs.len();
        let m = secants(xs, ys);
        let nm = m.len();

        // Phantom slopes beyond both ends, linear extrapolation of the secants
        let (m_neg2, m_neg1, m_np1, m_np2) = if nm >= 2 {
            (
                3.0 * m[0] - 2.0 * m[1],
                2.0 * m[0] - m[1],
                2.0 * m[nm - 1] - m[nm - 2],
                3.0 * m[nm - 1] - 2.0 * m[nm - 2],
            )
        } else {
            (m[0], m[0], m[0], m[0])
        };

        // Extended slope array: indices -2, -1, 0, ..., n-2, n-1, n
        let mut me = Vec::with_capacity(nm + 4);
        me.push(m_neg2);
        me.push(m_neg1);
        me.extend_from_slice(&m);
        me.push(m_np1);
        me.push(m_np2);

        let ts: Vec<Real> = (0..n)
            .map(|i| {
                let k = i + 2;
                let w1 = (me[k + 1] - me[k]).abs();
                let w2 = (me[k - 1] - me[k - 2]).abs();
                if w1 + w2 < 1e-30 {
                    0.5 * (me[k - 1] + me[k])
                } else {
                    (w1 * me[k - 1] + w2 * me[k]) / (w1 + w2)
                }
            })
            .collect();

        Ok(Self {
            inner: PiecewiseCubic::from_slopes(xs.to_vec(), ys.to_vec(), &ts),
        })
    }
}

impl Interpolation1D for AkimaSpline {
    fn x_min(&self) -> Real {
        self.inner.x_min()
    }

    fn x_max(&self) -> Real {
        self.inner.x_max()
    }

    fn operator(&self, x: Real) -> Real {
        self.inner.operator(x)
    }

    fn derivative(&self, x: Real) -> Real {
        self.inner.derivative(x)
    }

    fn second_derivative(&self, x: Real) -> Real {
        self.inner.second_derivative(x)
    }
}
