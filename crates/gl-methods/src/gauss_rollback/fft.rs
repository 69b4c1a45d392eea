use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use gl_core::{Real, Variance};
use num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

use super::{RollbackOperator, RollbackScheme};

#[derive(Clone)]
struct RealPlan {
    forward: Arc<dyn RealToComplex<Real>>,
    inverse: Arc<dyn ComplexToReal<Real>>,
}

static REAL_FFT_CACHE: OnceLock<Mutex<HashMap<usize, RealPlan>>> = OnceLock::new();

fn real_plan(n: usize) -> RealPlan {
    let cache = REAL_FFT_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().expect("real FFT cache lock poisoned");
    if let Some(plan) = guard.get(&n) {
        return plan.clone();
    }

    let mut planner = RealFftPlanner::<Real>::new();
    let plan = RealPlan {
        forward: planner.plan_fft_forward(n),
        inverse: planner.plan_fft_inverse(n),
    };
    guard.insert(n, plan.clone());
    plan
}

/// Gaussian multipliers of the half spectrum: bin `k` is damped by
/// `exp(−k² a)`, `a = 2·var·(π / (n·h))²`.
fn weights(n: usize, h: Real, var: Variance) -> Vec<Real> {
    let a = 2.0 * var * (std::f64::consts::PI / (n as Real * h)).powi(2);
    (0..n / 2 + 1).map(|k| (-((k * k) as Real) * a).exp()).collect()
}

/// Spectral rollback: periodic convolution with the Gaussian kernel.
///
/// The radix-2 variant insists on power-of-two sizes, as produced by
/// [`crate::grid::size2`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fft {
    radix2: bool,
}

impl Fft {
    /// Radix-2 transform.
    pub fn radix2() -> Self {
        Self { radix2: true }
    }

    /// Mixed-radix transform.
    pub fn mixed() -> Self {
        Self { radix2: false }
    }
}

impl RollbackScheme for Fft {
    fn configure(&self, size: usize, h: Real, var: Variance) -> Arc<dyn RollbackOperator> {
        assert!(size > 0 && h > 0.0 && var >= 0.0, "invalid FFT configuration");
        if self.radix2 {
            assert!(size.is_power_of_two(), "radix-2 FFT needs a power-of-two size, got {size}");
        }
        tracing::trace!(size, h, var, radix2 = self.radix2, "FFT scheme configured");
        Arc::new(FftOperator {
            size,
            weights: weights(size, h, var),
            plan: (size > 1).then(|| real_plan(size)),
        })
    }

    fn requires_power_of_two(&self) -> bool {
        self.radix2
    }
}

struct FftOperator {
    size: usize,
    weights: Vec<Real>,
    plan: Option<RealPlan>,
}

impl fmt::Debug for FftOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftOperator").field("size", &self.size).finish()
    }
}

impl RollbackOperator for FftOperator {
    fn rollback(&self, values: &mut [Real]) {
        let n = self.size;
        assert_eq!(values.len(), n);
        let Some(plan) = &self.plan else {
            return;
        };

        let mut input = values.to_vec();
        let mut spectrum: Vec<Complex<Real>> = plan.forward.make_output_vec();
        if let Err(e) = plan.forward.process(&mut input, &mut spectrum) {
            panic!("forward FFT failed: {e}");
        }
        for (c, w) in spectrum.iter_mut().zip(&self.weights) {
            *c *= *w;
        }
        spectrum[0].im = 0.0;
        if n % 2 == 0 {
            spectrum[n / 2].im = 0.0;
        }
        if let Err(e) = plan.inverse.process(&mut spectrum, values) {
            panic!("inverse FFT failed: {e}");
        }
        let inv_n = 1.0 / n as Real;
        for v in values.iter_mut() {
            *v *= inv_n;
        }
    }
}
