//! Douglas ADI scheme.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::explicit_euler::step_length;
use super::{FdmScheme, SchemeContext};

/// Explicit predictor with the full operator followed by one implicit
/// correction per direction:
///
/// ```text
/// Y₀ = V + dt·L V
/// Yᵢ = Yᵢ₋₁ + θ·dt·Lᵢ (Yᵢ − V)      i = 1..n
/// ```
///
/// The mixed-derivative part stays explicit.
#[derive(Debug, Clone)]
pub struct DouglasScheme {
    theta: Real,
    dt: Option<Time>,
}

impl DouglasScheme {
    /// Scheme with implicitness `theta`.
    pub fn new(theta: Real) -> Self {
        Self { theta, dt: None }
    }
}

impl FdmScheme for DouglasScheme {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, ctx: &mut SchemeContext<'_>, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_length(self.dt)?;
        ctx.prepare(t, dt)?;
        let y = ctx.explicit_action(a, dt)?;
        *a = if self.theta != 0.0 {
            ctx.directional_sweep(y, a, self.theta * dt)?
        } else {
            y
        };
        Ok(())
    }
}
