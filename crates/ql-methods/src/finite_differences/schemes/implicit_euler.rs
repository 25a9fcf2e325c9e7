//! Backward Euler.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::explicit_euler::step_length;
use super::{FdmScheme, SchemeContext, DEFAULT_SOLVER_TOLERANCE};

/// `(I − dt·L) V(t − dt) = V(t)`; unconditionally stable, first order.
///
/// One-dimensional operators are inverted directly; on larger grids the
/// system is solved with BiCGStab preconditioned by the operator's
/// directional inverse.
#[derive(Debug, Clone, Default)]
pub struct ImplicitEulerScheme {
    dt: Option<Time>,
}

impl ImplicitEulerScheme {
    /// Scheme without a step length.
    pub fn new() -> Self {
        Self::default()
    }

    /// Implicit part of a step weighted by `theta`; operator time must
    /// already be set.
    pub(crate) fn step_weighted(
        ctx: &mut SchemeContext<'_>,
        a: &mut Array,
        dt: Time,
        theta: Real,
    ) -> Result<()> {
        *a = ctx.implicit_solve(a, theta * dt, DEFAULT_SOLVER_TOLERANCE)?;
        Ok(())
    }
}

impl FdmScheme for ImplicitEulerScheme {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, ctx: &mut SchemeContext<'_>, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_length(self.dt)?;
        ctx.prepare(t, dt)?;
        Self::step_weighted(ctx, a, dt, 1.0)
    }
}
