//! `StochasticProcess1D`: one-factor diffusion `dX = μ(t,X) dt + σ(t,X) dW`.
//!
//! Finite-difference operators only need the local coefficients, so the
//! trait exposes drift and diffusion plus the Euler moments derived from
//! them.

use ql_core::{Real, Time};

/// A one-dimensional diffusion process.
pub trait StochasticProcess1D: std::fmt::Debug + Send + Sync {
    /// Initial value of the state variable.
    fn x0(&self) -> Real;

    /// Drift `μ(t, x)`.
    fn drift(&self, t: Time, x: Real) -> Real;

    /// Diffusion `σ(t, x)`.
    fn diffusion(&self, t: Time, x: Real) -> Real;

    /// `E[x(t+Δt) | x(t) = x]`, first-order Euler by default.
    fn expectation(&self, t: Time, x: Real, dt: Time) -> Real {
        x + self.drift(t, x) * dt
    }

    /// Standard deviation of the increment over `Δt`.
    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.variance(t, x, dt).sqrt()
    }

    /// Variance of the increment over `Δt`.
    fn variance(&self, t: Time, x: Real, dt: Time) -> Real {
        let s = self.diffusion(t, x);
        s * s * dt
    }
}
