//! Gamma distribution, wrapping `statrs`.
//!
//! Used for the stationary law of the square-root variance process.

use ql_core::{ensure, Error, Real, Result};
use statrs::distribution::{ContinuousCDF, Gamma};

/// Gamma distribution with shape `k` and rate `λ` (mean `k/λ`).
#[derive(Debug, Clone)]
pub struct GammaDistribution {
    dist: Gamma,
}

impl GammaDistribution {
    /// Create a gamma distribution from a positive shape and rate.
    pub fn new(shape: Real, rate: Real) -> Result<Self> {
        ensure!(
            shape > 0.0 && rate > 0.0,
            "shape ({shape}) and rate ({rate}) must be positive"
        );
        let dist = Gamma::new(shape, rate)
            .map_err(|e| Error::InvalidArgument(format!("gamma distribution: {e}")))?;
        Ok(Self { dist })
    }

    /// Cumulative distribution `P(X ≤ x)`.
    pub fn cdf(&self, x: Real) -> Real {
        if x <= 0.0 {
            0.0
        } else {
            self.dist.cdf(x)
        }
    }

    /// Quantile function; `p` must lie in (0, 1).
    pub fn inverse_cdf(&self, p: Real) -> Result<Real> {
        ensure!(p > 0.0 && p < 1.0, "probability ({p}) must be in (0, 1)");
        Ok(self.dist.inverse_cdf(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exponential_special_case() {
        // shape 1 is the exponential law with the same rate
        let g = GammaDistribution::new(1.0, 2.0).unwrap();
        let q = g.inverse_cdf(0.5).unwrap();
        assert_abs_diff_eq!(q, 2.0_f64.ln() / 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(g.cdf(q), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(GammaDistribution::new(0.0, 1.0).is_err());
        assert!(GammaDistribution::new(1.0, -1.0).is_err());
    }
}
