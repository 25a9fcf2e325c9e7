//! Heston stochastic volatility process.
//!
//! ```text
//! dS = (r − q) S dt + √v S dW₁
//! dv = κ(θ − v) dt + σ √v dW₂
//! dW₁ dW₂ = ρ dt
//! ```

use ql_core::{ensure, errors::Result, Real, Time};
use ql_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Parameters and curves of the Heston model.
#[derive(Debug, Clone)]
pub struct HestonProcess {
    spot: Real,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
}

impl HestonProcess {
    /// Create a Heston process.
    ///
    /// Fails unless `spot > 0`, `v0, κ, θ, σ ≥ 0` and `ρ ∈ [-1, 1]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        spot: Real,
        v0: Real,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> Result<Self> {
        ensure!(spot > 0.0, "spot ({spot}) must be positive");
        ensure!(v0 >= 0.0, "initial variance ({v0}) must be non-negative");
        ensure!(kappa >= 0.0, "mean-reversion speed ({kappa}) must be non-negative");
        ensure!(theta >= 0.0, "long-run variance ({theta}) must be non-negative");
        ensure!(sigma >= 0.0, "vol-of-vol ({sigma}) must be non-negative");
        ensure!((-1.0..=1.0).contains(&rho), "correlation ({rho}) must be in [-1, 1]");
        Ok(Self {
            spot,
            v0,
            kappa,
            theta,
            sigma,
            rho,
            risk_free_rate,
            dividend_yield,
        })
    }

    /// Spot price.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
    }

    /// Mean-reversion speed κ.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance θ.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Vol-of-vol σ.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Correlation ρ.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// Risk-free curve.
    pub fn risk_free_rate(&self) -> &dyn YieldTermStructure {
        &*self.risk_free_rate
    }

    /// Dividend-yield curve.
    pub fn dividend_yield(&self) -> &dyn YieldTermStructure {
        &*self.dividend_yield
    }

    /// Shared handle on the risk-free curve.
    pub fn risk_free_rate_arc(&self) -> Arc<dyn YieldTermStructure> {
        Arc::clone(&self.risk_free_rate)
    }

    /// Shared handle on the dividend-yield curve.
    pub fn dividend_yield_arc(&self) -> Arc<dyn YieldTermStructure> {
        Arc::clone(&self.dividend_yield)
    }

    /// `true` if `2κθ ≥ σ²`, i.e. the variance never reaches zero.
    pub fn feller_condition(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.sigma * self.sigma
    }

    /// Expected average variance over `[0, t]`.
    pub fn expected_average_variance(&self, t: Time) -> Real {
        if self.kappa * t < 1e-8 {
            return self.v0;
        }
        self.theta + (self.v0 - self.theta) * (1.0 - (-self.kappa * t).exp()) / (self.kappa * t)
    }
}
