//! TR-BDF2 scheme.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::explicit_euler::step_length;
use super::{CrankNicolsonScheme, FdmScheme, SchemeContext, DEFAULT_SOLVER_TOLERANCE};

/// A trapezoidal step over `α·dt` followed by a second-order backward
/// differentiation step over the rest of the interval. L-stable, so
/// payoff kinks are damped without a separate implicit Euler phase.
#[derive(Debug, Clone)]
pub struct TrBdf2Scheme {
    alpha: Real,
    tolerance: Real,
    trapezoidal: CrankNicolsonScheme,
    dt: Option<Time>,
}

impl TrBdf2Scheme {
    /// Scheme with trapezoidal fraction `alpha`, usually `2 − √2`.
    pub fn new(alpha: Real) -> Self {
        Self {
            alpha,
            tolerance: DEFAULT_SOLVER_TOLERANCE,
            trapezoidal: CrankNicolsonScheme::new(0.5),
            dt: None,
        }
    }

    /// Relative residual of the BiCGStab solve in the BDF2 step.
    pub fn with_tolerance(mut self, tolerance: Real) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl FdmScheme for TrBdf2Scheme {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, ctx: &mut SchemeContext<'_>, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_length(self.dt)?;
        let alpha = self.alpha;

        let mut f_star = a.clone();
        self.trapezoidal.set_step(alpha * dt);
        self.trapezoidal.step(ctx, &mut f_star, t)?;

        let t1 = (t - dt).max(0.0);
        ctx.op.set_time(t1, (t - alpha * dt).max(t1))?;
        ctx.bc_set.set_time(t1);

        let beta = (1.0 - alpha) / (2.0 - alpha) * dt;
        let one_minus = (1.0 - alpha) * (1.0 - alpha) / alpha;
        let rhs = &(&(&f_star * (1.0 / alpha)) - &(&*a * one_minus)) * (1.0 / (2.0 - alpha));
        *a = ctx.implicit_solve(&rhs, beta, self.tolerance)?;
        Ok(())
    }
}
