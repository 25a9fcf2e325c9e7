//! Forward Euler.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::{FdmScheme, SchemeContext};

/// `V(t − dt) = V(t) + dt·L V(t)`; stable only for `dt ≲ h²/σ²`.
#[derive(Debug, Clone, Default)]
pub struct ExplicitEulerScheme {
    dt: Option<Time>,
}

impl ExplicitEulerScheme {
    /// Scheme without a step length.
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit part of a step weighted by `theta`; operator time must
    /// already be set.
    pub(crate) fn step_weighted(
        ctx: &mut SchemeContext<'_>,
        a: &mut Array,
        dt: Time,
        theta: Real,
    ) -> Result<()> {
        *a = ctx.explicit_action(a, theta * dt)?;
        Ok(())
    }
}

impl FdmScheme for ExplicitEulerScheme {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, ctx: &mut SchemeContext<'_>, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_length(self.dt)?;
        ctx.prepare(t, dt)?;
        Self::step_weighted(ctx, a, dt, 1.0)
    }
}

/// Step length of a scheme, or a runtime error when `set_step` was never called.
pub(crate) fn step_length(dt: Option<Time>) -> Result<Time> {
    dt.ok_or_else(|| ql_core::Error::Runtime("time step has not been set".into()))
}
