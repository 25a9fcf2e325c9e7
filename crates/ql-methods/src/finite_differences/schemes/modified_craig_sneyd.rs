//! Modified Craig-Sneyd ADI scheme.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::explicit_euler::step_length;
use super::{FdmScheme, SchemeContext};

/// Craig-Sneyd with an additional full-operator term in the corrector,
/// `Ỹ₀ = Y₀ + μ·dt·L₀ (Yₙ − V) + (½ − θ)·dt·L (Yₙ − V)`; second order for
/// any `θ`.
#[derive(Debug, Clone)]
pub struct ModifiedCraigSneydScheme {
    theta: Real,
    mu: Real,
    dt: Option<Time>,
}

impl ModifiedCraigSneydScheme {
    /// Scheme with implicitness `theta` and corrector weight `mu`.
    pub fn new(theta: Real, mu: Real) -> Self {
        Self { theta, mu, dt: None }
    }
}

impl FdmScheme for ModifiedCraigSneydScheme {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, ctx: &mut SchemeContext<'_>, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_length(self.dt)?;
        ctx.prepare(t, dt)?;
        let w = self.theta * dt;

        let y0 = ctx.explicit_action(a, dt)?;
        let y = ctx.directional_sweep(y0.clone(), a, w)?;

        let diff = &y - &*a;
        let full = &ctx.action(&diff)? * ((0.5 - self.theta) * dt);
        let mixed = &ctx.op.apply_mixed(&diff)? * (self.mu * dt);
        let yt = &(&y0 + &mixed) + &full;
        *a = ctx.directional_sweep(yt, a, w)?;
        Ok(())
    }
}
