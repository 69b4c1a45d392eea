use std::fmt;
use std::sync::Arc;

use gl_core::{errors::Result, Real, Variance};

use super::{Explicit, GaussRollback, RollbackOperator, RollbackScheme, Theta};

/// Explicit prefix, fast bulk, implicit suffix.
///
/// A few explicit steps smooth kinks that would otherwise make the fast
/// scheme oscillate; a few implicit steps damp the high frequencies it
/// leaves behind. The explicit and implicit stages move variance
/// `2h²·p·n` each and the fast scheme takes the rest. When nothing is
/// left for it the whole variance goes to the explicit scheme.
#[derive(Debug, Clone)]
pub struct Chain {
    n_expl: usize,
    fast: GaussRollback,
    n_impl: usize,
    p_expl: Real,
    p_impl: Real,
}

impl Chain {
    /// Chain of `n_expl` explicit steps with relaxation `p_expl`, the `fast`
    /// scheme, and `n_impl` implicit steps with relaxation `p_impl`.
    ///
    /// # Errors
    /// [`gl_core::Error::Range`] for an invalid relaxation parameter.
    pub fn new(
        n_expl: usize,
        fast: GaussRollback,
        n_impl: usize,
        p_expl: Real,
        p_impl: Real,
    ) -> Result<Self> {
        Explicit::new(p_expl)?;
        Theta::implicit(p_impl)?;
        Ok(Self {
            n_expl,
            fast,
            n_impl,
            p_expl,
            p_impl,
        })
    }

    fn with_defaults(n_expl: usize, fast: GaussRollback, n_impl: usize) -> Self {
        Self {
            n_expl,
            fast,
            n_impl,
            p_expl: 1.0 / 3.0,
            p_impl: 1.0,
        }
    }

    fn prototypes(&self) -> (GaussRollback, GaussRollback) {
        // parameters were validated in `new`
        let expl = Explicit::new(self.p_expl).unwrap_or_default();
        let implicit = Theta::implicit(self.p_impl).unwrap_or_else(|_| Theta::default_implicit());
        (GaussRollback::new(Arc::new(expl)), GaussRollback::new(Arc::new(implicit)))
    }
}

impl RollbackScheme for Chain {
    fn configure(&self, size: usize, h: Real, var: Variance) -> Arc<dyn RollbackOperator> {
        let (expl, implicit) = self.prototypes();
        let expl_var = 2.0 * h * h * self.p_expl * self.n_expl as Real;
        let impl_var = 2.0 * h * h * self.p_impl * self.n_impl as Real;
        let fast_var = var - (expl_var + impl_var);
        tracing::trace!(size, h, var, expl_var, fast_var, impl_var, "chain configured");

        let op = if fast_var > 0.0 {
            ChainOperator {
                expl: (self.n_expl > 0).then(|| expl.assigned(size, h, expl_var)),
                fast: Some(self.fast.assigned(size, h, fast_var)),
                implicit: (self.n_impl > 0).then(|| implicit.assigned(size, h, impl_var)),
            }
        } else {
            ChainOperator {
                expl: Some(expl.assigned(size, h, var)),
                fast: None,
                implicit: None,
            }
        };
        Arc::new(op)
    }

    fn requires_power_of_two(&self) -> bool {
        self.fast.requires_power_of_two()
    }
}

#[derive(Debug)]
struct ChainOperator {
    expl: Option<GaussRollback>,
    fast: Option<GaussRollback>,
    implicit: Option<GaussRollback>,
}

impl RollbackOperator for ChainOperator {
    fn rollback(&self, values: &mut [Real]) {
        for stage in [&self.expl, &self.fast, &self.implicit].into_iter().flatten() {
            stage.rollback(values);
        }
    }
}

/// Fast scheme inside a [`DefaultChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FastScheme {
    /// Crank-Nicolson with `r = 1`.
    CrankNicolson,
    /// Radix-2 FFT.
    #[default]
    Fft2,
    /// Mixed-radix FFT.
    Fft,
}

impl fmt::Display for FastScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FastScheme::CrankNicolson => "crankNicolson",
            FastScheme::Fft2 => "fft2",
            FastScheme::Fft => "fft",
        };
        f.write_str(name)
    }
}

/// [`Chain`] whose step counts follow the grid.
///
/// * Crank-Nicolson: `n_expl = 2(⌈var / h⌉ + 1)`
/// * FFT: `n_expl = 2⌈log₂ size⌉ + 10`
///
/// and `n_impl = n_expl / 2` in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultChain {
    fast: FastScheme,
}

impl DefaultChain {
    /// Default chain around `fast`.
    pub fn new(fast: FastScheme) -> Self {
        Self { fast }
    }

    /// Explicit and implicit step counts for a configuration.
    pub fn step_counts(&self, size: usize, h: Real, var: Variance) -> (usize, usize) {
        let n_expl = match self.fast {
            FastScheme::CrankNicolson => 2 * ((var / h).ceil() as usize + 1),
            FastScheme::Fft2 | FastScheme::Fft => {
                2 * (size as Real).log2().ceil().max(0.0) as usize + 10
            }
        };
        (n_expl, n_expl / 2)
    }
}

impl RollbackScheme for DefaultChain {
    fn configure(&self, size: usize, h: Real, var: Variance) -> Arc<dyn RollbackOperator> {
        assert!(size > 0 && h > 0.0 && var >= 0.0, "invalid chain configuration");
        let (n_expl, n_impl) = self.step_counts(size, h, var);
        let fast = match self.fast {
            FastScheme::CrankNicolson => GaussRollback::new(Arc::new(Theta::default_crank_nicolson())),
            FastScheme::Fft2 => GaussRollback::fft2(),
            FastScheme::Fft => GaussRollback::fft(),
        };
        Chain::with_defaults(n_expl, fast, n_impl).configure(size, h, var)
    }

    fn requires_power_of_two(&self) -> bool {
        self.fast == FastScheme::Fft2
    }
}
