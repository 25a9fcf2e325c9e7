//! Craig-Sneyd ADI scheme.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::explicit_euler::step_length;
use super::{FdmScheme, SchemeContext};

/// Douglas predictor followed by a corrector that treats the
/// mixed-derivative term with weight `μ`:
///
/// ```text
/// Ỹ₀ = Y₀ + μ·dt·L₀ (Yₙ − V)
/// Ỹᵢ = Ỹᵢ₋₁ + θ·dt·Lᵢ (Ỹᵢ − V)
/// ```
///
/// where `L₀` is the mixed part of the operator.
#[derive(Debug, Clone)]
pub struct CraigSneydScheme {
    theta: Real,
    mu: Real,
    dt: Option<Time>,
}

impl CraigSneydScheme {
    /// Scheme with implicitness `theta` and corrector weight `mu`.
    pub fn new(theta: Real, mu: Real) -> Self {
        Self { theta, mu, dt: None }
    }
}

impl FdmScheme for CraigSneydScheme {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, ctx: &mut SchemeContext<'_>, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_length(self.dt)?;
        ctx.prepare(t, dt)?;
        let w = self.theta * dt;

        let y0 = ctx.explicit_action(a, dt)?;
        let y = ctx.directional_sweep(y0.clone(), a, w)?;

        ctx.bc_set.apply_before_applying(&mut *ctx.op);
        let correction = &ctx.op.apply_mixed(&(&y - &*a))? * (self.mu * dt);
        let yt = &y0 + &correction;
        *a = ctx.directional_sweep(yt, a, w)?;
        Ok(())
    }
}
