//! Hundsdorfer-Verwer ADI scheme.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::explicit_euler::step_length;
use super::{FdmScheme, SchemeContext};

/// Douglas predictor followed by a corrector on the full operator whose
/// directional solves are centred on the predictor:
///
/// ```text
/// Ỹ₀ = Y₀ + μ·dt·L (Yₙ − V)
/// Ỹᵢ = Ỹᵢ₋₁ + θ·dt·Lᵢ (Ỹᵢ − Yₙ)
/// ```
#[derive(Debug, Clone)]
pub struct HundsdorferScheme {
    theta: Real,
    mu: Real,
    dt: Option<Time>,
}

impl HundsdorferScheme {
    /// Scheme with implicitness `theta` and corrector weight `mu`.
    pub fn new(theta: Real, mu: Real) -> Self {
        Self { theta, mu, dt: None }
    }
}

impl FdmScheme for HundsdorferScheme {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, ctx: &mut SchemeContext<'_>, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_length(self.dt)?;
        ctx.prepare(t, dt)?;
        let w = self.theta * dt;

        let y0 = ctx.explicit_action(a, dt)?;
        let y = ctx.directional_sweep(y0.clone(), a, w)?;

        let yt = &y0 + &(&ctx.action(&(&y - &*a))? * (self.mu * dt));
        *a = ctx.directional_sweep(yt, &y, w)?;
        Ok(())
    }
}
