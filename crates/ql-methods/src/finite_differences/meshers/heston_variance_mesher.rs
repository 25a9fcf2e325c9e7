//! Variance mesher for the Heston model.
//!
//! The range spans the `ε` and `1 − ε` quantiles of the stationary law of the
//! square-root process, a Gamma distribution with shape `2κθ/σ²` and rate
//! `2κ/σ²`, extended to contain `v₀`. When the Feller condition fails the
//! variance reaches zero, so the lower end is pinned at zero. Nodes cluster
//! around `v₀`.

use ql_core::{ensure, errors::Result, Real, Size, Time};
use ql_math::GammaDistribution;
use ql_processes::HestonProcess;
use tracing::debug;

use super::{ConcentrationPoint, Fdm1dMesher};

/// Variance mesher and the volatility level used to size the spot mesher.
#[derive(Debug, Clone)]
pub struct FdmHestonVarianceMesher {
    mesher: Fdm1dMesher,
    vol_estimate: Real,
}

impl FdmHestonVarianceMesher {
    /// Build a mesher of `size` points; `eps` is the tail probability.
    pub fn new(size: Size, process: &HestonProcess, maturity: Time, eps: Real) -> Result<Self> {
        ensure!(maturity > 0.0, "maturity ({maturity}) must be positive");
        ensure!(eps > 0.0 && eps < 0.5, "tail probability ({eps}) must be in (0, 0.5)");
        let (v0, kappa, theta, sigma) = (process.v0(), process.kappa(), process.theta(), process.sigma());

        let (q_lo, q_hi) = if sigma > 0.0 && kappa > 0.0 && theta > 0.0 {
            let s2 = sigma * sigma;
            let law = GammaDistribution::new(2.0 * kappa * theta / s2, 2.0 * kappa / s2)?;
            (law.inverse_cdf(eps)?, law.inverse_cdf(1.0 - eps)?)
        } else {
            (theta.min(v0), theta.max(v0))
        };

        let mut lower = if process.feller_condition() { q_lo.min(v0) } else { 0.0 };
        let mut upper = q_hi.max(v0);
        // degenerate law (σ → 0): keep a band of ±25% around the level
        let level = v0.max(theta);
        ensure!(level > 0.0, "variance level must be positive");
        if upper - lower < 0.5 * level {
            lower = (lower.min(v0) - 0.25 * level).max(0.0);
            upper = upper.max(v0) + 0.25 * level;
        }

        let vol_estimate = process.expected_average_variance(maturity).sqrt();
        debug!(size, lower, upper, vol_estimate, "heston variance mesher");

        let mesher = Fdm1dMesher::concentrating(
            lower,
            upper,
            size,
            Some(ConcentrationPoint::new(v0, 0.1).required()),
        )?;
        Ok(Self {
            mesher,
            vol_estimate,
        })
    }

    /// The variance grid.
    pub fn mesher(&self) -> &Fdm1dMesher {
        &self.mesher
    }

    /// Consume into the variance grid.
    pub fn into_mesher(self) -> Fdm1dMesher {
        self.mesher
    }

    /// Square root of the expected average variance over the life.
    pub fn vol_estimate(&self) -> Real {
        self.vol_estimate
    }
}
