//! Generalized Black-Scholes process in log-spot coordinates.
//!
//! With `x = ln S`,
//!
//! ```text
//! dx = (r(t) − q(t) − σ²(t, S)/2) dt + σ(t, S) dW
//! ```
//!
//! where `r` and `q` are the instantaneous forward rates of the risk-free and
//! dividend curves and `σ` comes from the Black volatility term structure.

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time};
use ql_termstructures::{BlackVolTermStructure, FlatForward, YieldTermStructure};
use std::sync::Arc;

/// Black-Scholes-Merton dynamics for the log of the spot price.
#[derive(Debug, Clone)]
pub struct GeneralizedBlackScholesProcess {
    spot: Real,
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    black_vol: Arc<dyn BlackVolTermStructure>,
}

impl GeneralizedBlackScholesProcess {
    /// Process with explicit risk-free, dividend and volatility structures.
    pub fn new(
        spot: Real,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        black_vol: Arc<dyn BlackVolTermStructure>,
    ) -> Result<Self> {
        ensure!(spot > 0.0, "spot ({spot}) must be positive");
        Ok(Self {
            spot,
            risk_free_rate,
            dividend_yield,
            black_vol,
        })
    }

    /// Process without dividend yield.
    pub fn without_dividends(
        spot: Real,
        risk_free_rate: Arc<dyn YieldTermStructure>,
        black_vol: Arc<dyn BlackVolTermStructure>,
    ) -> Result<Self> {
        Self::new(
            spot,
            risk_free_rate,
            Arc::new(FlatForward::new(0.0)),
            black_vol,
        )
    }

    /// The spot price `S₀`.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// The risk-free curve.
    pub fn risk_free_rate(&self) -> &dyn YieldTermStructure {
        &*self.risk_free_rate
    }

    /// The dividend-yield curve.
    pub fn dividend_yield(&self) -> &dyn YieldTermStructure {
        &*self.dividend_yield
    }

    /// The Black volatility structure.
    pub fn black_volatility(&self) -> &dyn BlackVolTermStructure {
        &*self.black_vol
    }

    /// Shared handle on the risk-free curve.
    pub fn risk_free_rate_arc(&self) -> Arc<dyn YieldTermStructure> {
        Arc::clone(&self.risk_free_rate)
    }

    /// Shared handle on the dividend-yield curve.
    pub fn dividend_yield_arc(&self) -> Arc<dyn YieldTermStructure> {
        Arc::clone(&self.dividend_yield)
    }

    /// Shared handle on the volatility structure.
    pub fn black_volatility_arc(&self) -> Arc<dyn BlackVolTermStructure> {
        Arc::clone(&self.black_vol)
    }

    /// Forward price `S₀ · Q(t) / P(t)` for maturity `t`.
    pub fn forward(&self, t: Time) -> Real {
        self.spot * self.dividend_yield.discount(t) / self.risk_free_rate.discount(t)
    }
}

impl StochasticProcess1D for GeneralizedBlackScholesProcess {
    fn x0(&self) -> Real {
        self.spot.ln()
    }

    fn drift(&self, t: Time, x: Real) -> Real {
        let sigma = self.diffusion(t, x);
        let r = self.risk_free_rate.forward_rate(t, t);
        let q = self.dividend_yield.forward_rate(t, t);
        r - q - 0.5 * sigma * sigma
    }

    fn diffusion(&self, t: Time, x: Real) -> Real {
        self.black_vol.black_vol(t, x.exp())
    }
}
