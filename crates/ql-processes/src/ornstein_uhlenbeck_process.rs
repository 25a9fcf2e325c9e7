//! Ornstein-Uhlenbeck mean-reverting process `dX = a(b − X) dt + σ dW`.

use crate::stochastic_process::StochasticProcess1D;
use ql_core::{ensure, errors::Result, Real, Time};

/// Ornstein-Uhlenbeck process with exact conditional moments.
#[derive(Debug, Clone)]
pub struct OrnsteinUhlenbeckProcess {
    x0: Real,
    speed: Real,
    level: Real,
    volatility: Real,
}

impl OrnsteinUhlenbeckProcess {
    /// Create the process; `speed` and `volatility` must be non-negative.
    pub fn new(speed: Real, volatility: Real, x0: Real, level: Real) -> Result<Self> {
        ensure!(speed >= 0.0, "mean-reversion speed ({speed}) must be non-negative");
        ensure!(volatility >= 0.0, "volatility ({volatility}) must be non-negative");
        Ok(Self {
            x0,
            speed,
            level,
            volatility,
        })
    }

    /// Speed of mean reversion.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Long-run level.
    pub fn level(&self) -> Real {
        self.level
    }

    /// Volatility.
    pub fn volatility(&self) -> Real {
        self.volatility
    }
}

impl StochasticProcess1D for OrnsteinUhlenbeckProcess {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.level - x)
    }

    fn diffusion(&self, _t: Time, _x: Real) -> Real {
        self.volatility
    }

    fn expectation(&self, _t: Time, x: Real, dt: Time) -> Real {
        self.level + (x - self.level) * (-self.speed * dt).exp()
    }

    fn variance(&self, _t: Time, _x: Real, dt: Time) -> Real {
        if self.speed < Real::EPSILON.sqrt() {
            self.volatility * self.volatility * dt
        } else {
            0.5 * self.volatility * self.volatility / self.speed
                * (1.0 - (-2.0 * self.speed * dt).exp())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exact_moments() {
        let p = OrnsteinUhlenbeckProcess::new(1.5, 0.3, 0.1, 0.05).unwrap();
        assert_abs_diff_eq!(p.drift(0.0, 0.1), 1.5 * (0.05 - 0.1), epsilon = 1e-15);
        assert_abs_diff_eq!(
            p.expectation(0.0, 0.1, 1.0),
            0.05 + 0.05 * (-1.5_f64).exp(),
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            p.variance(0.0, 0.1, 1.0),
            0.09 / 3.0 * (1.0 - (-3.0_f64).exp()),
            epsilon = 1e-15
        );
        // vanishing speed reduces to Brownian motion
        let bm = OrnsteinUhlenbeckProcess::new(0.0, 0.3, 0.0, 0.0).unwrap();
        assert_abs_diff_eq!(bm.std_deviation(0.0, 0.0, 4.0), 0.6, epsilon = 1e-15);
    }
}
