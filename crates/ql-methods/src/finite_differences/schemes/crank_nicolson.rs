//! θ-weighted Euler scheme.

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::explicit_euler::step_length;
use super::{ExplicitEulerScheme, FdmScheme, ImplicitEulerScheme, SchemeContext};

/// Explicit step with weight `1 − θ` followed by an implicit step with
/// weight `θ`; second order in time for `θ = ½`.
#[derive(Debug, Clone)]
pub struct CrankNicolsonScheme {
    theta: Real,
    dt: Option<Time>,
}

impl CrankNicolsonScheme {
    /// Scheme with implicitness `theta`.
    pub fn new(theta: Real) -> Self {
        Self { theta, dt: None }
    }

    /// Implicitness weight.
    pub fn theta(&self) -> Real {
        self.theta
    }
}

impl FdmScheme for CrankNicolsonScheme {
    fn set_step(&mut self, dt: Time) {
        self.dt = Some(dt);
    }

    fn step(&mut self, ctx: &mut SchemeContext<'_>, a: &mut Array, t: Time) -> Result<()> {
        let dt = step_length(self.dt)?;
        ctx.prepare(t, dt)?;
        if self.theta < 1.0 {
            ExplicitEulerScheme::step_weighted(ctx, a, dt, 1.0 - self.theta)?;
        }
        if self.theta > 0.0 {
            ImplicitEulerScheme::step_weighted(ctx, a, dt, self.theta)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::HeatProblem;
    use super::*;

    #[test]
    fn second_order_in_time() {
        let mut problem = HeatProblem::new(401);
        let coarse = problem.run(&mut CrankNicolsonScheme::new(0.5), 0.1, 5).unwrap();
        let fine = problem.run(&mut CrankNicolsonScheme::new(0.5), 0.1, 10).unwrap();
        assert!(fine / coarse < 0.3, "ratio {}", fine / coarse);
    }

    #[test]
    fn full_implicitness_is_backward_euler() {
        let mut p1 = HeatProblem::new(31);
        let mut p2 = HeatProblem::new(31);
        let a = p1.run(&mut CrankNicolsonScheme::new(1.0), 0.2, 7).unwrap();
        let b = p2.run(&mut ImplicitEulerScheme::new(), 0.2, 7).unwrap();
        assert!((a - b).abs() < 1e-14);
    }
}
