//! `BlackVolTermStructure`: implied Black volatility on a time axis.
//!
//! Implementors supply the total variance `σ²(t, K)·t`; volatilities and
//! forward variances between two times follow.

use ql_core::{ensure, errors::Result, Real, Time, Volatility};

/// A Black-volatility term structure.
pub trait BlackVolTermStructure: std::fmt::Debug + Send + Sync {
    /// Total Black variance `σ²·t` for time `t` and strike `strike`.
    fn black_variance(&self, t: Time, strike: Real) -> Real;

    /// Black volatility for time `t` and strike `strike`.
    fn black_vol(&self, t: Time, strike: Real) -> Volatility {
        if t <= 0.0 {
            let dt = 1.0e-5;
            return (self.black_variance(dt, strike) / dt).sqrt();
        }
        (self.black_variance(t, strike) / t).sqrt()
    }

    /// Forward variance `σ²(t2)·t2 − σ²(t1)·t1` between two times.
    fn black_forward_variance(&self, t1: Time, t2: Time, strike: Real) -> Result<Real> {
        ensure!(t1 <= t2, "t1 ({t1}) later than t2 ({t2})");
        let v = self.black_variance(t2, strike) - self.black_variance(t1, strike);
        ensure!(v >= -1e-12, "negative forward variance {v} over [{t1}, {t2}]");
        Ok(v.max(0.0))
    }

    /// Forward volatility between two times.
    fn black_forward_vol(&self, t1: Time, t2: Time, strike: Real) -> Result<Volatility> {
        if t2 == t1 {
            return Ok(self.black_vol(t1, strike));
        }
        Ok((self.black_forward_variance(t1, t2, strike)? / (t2 - t1)).sqrt())
    }
}

// ── BlackConstantVol ──────────────────────────────────────────────────────────

/// Flat Black volatility for every time and strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackConstantVol {
    volatility: Volatility,
}

impl BlackConstantVol {
    /// Constant surface with volatility `volatility`.
    pub fn new(volatility: Volatility) -> Self {
        Self { volatility }
    }

    /// The constant volatility.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }
}

impl BlackVolTermStructure for BlackConstantVol {
    fn black_variance(&self, t: Time, _strike: Real) -> Real {
        self.volatility * self.volatility * t
    }

    fn black_vol(&self, _t: Time, _strike: Real) -> Volatility {
        self.volatility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_vol() {
        let v = BlackConstantVol::new(0.2);
        assert_abs_diff_eq!(v.black_variance(2.0, 100.0), 0.08, epsilon = 1e-15);
        assert_abs_diff_eq!(v.black_vol(0.0, 100.0), 0.2, epsilon = 1e-15);
        assert_abs_diff_eq!(
            v.black_forward_variance(0.5, 1.5, 90.0).unwrap(),
            0.04,
            epsilon = 1e-15
        );
        assert!(v.black_forward_variance(1.0, 0.5, 90.0).is_err());
    }
}
