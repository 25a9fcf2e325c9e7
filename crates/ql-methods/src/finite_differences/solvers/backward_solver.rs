//! Rollback with an optional implicit damping phase.

use std::sync::Arc;

use ql_core::{errors::Result, Real, Size, Time};
use ql_math::Array;
use tracing::debug;

use super::model::FiniteDifferenceModel;
use crate::finite_differences::boundary::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::{
    FdmSchemeDesc, FdmSchemeType, ImplicitEulerScheme, SchemeContext,
};
use crate::finite_differences::step_conditions::StepCondition;

/// Owns the operator and boundary conditions of a problem and rolls
/// solutions back with the configured scheme.
#[derive(Debug)]
pub struct FdmBackwardSolver {
    op: Box<dyn FdmLinearOpComposite>,
    bc_set: FdmBoundaryConditionSet,
    condition: Option<Arc<dyn StepCondition>>,
    scheme: FdmSchemeDesc,
}

impl FdmBackwardSolver {
    /// Solver for `op` with boundary conditions `bc_set`.
    pub fn new(
        op: Box<dyn FdmLinearOpComposite>,
        bc_set: FdmBoundaryConditionSet,
        condition: Option<Arc<dyn StepCondition>>,
        scheme: FdmSchemeDesc,
    ) -> Self {
        Self {
            op,
            bc_set,
            condition,
            scheme,
        }
    }

    /// Scheme used after the damping phase.
    pub fn scheme(&self) -> &FdmSchemeDesc {
        &self.scheme
    }

    /// Roll `a` back from `from` to `to`.
    ///
    /// With `damping_steps > 0` the first
    /// `damping_steps / (steps + damping_steps)` of the interval is covered
    /// by that many implicit Euler steps, which smooths payoff kinks before
    /// the configured scheme takes `steps` steps over the remainder.
    pub fn rollback(
        &mut self,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: Size,
        damping_steps: Size,
    ) -> Result<()> {
        let scheme = self.scheme.build()?;
        debug!(
            from,
            to,
            steps,
            damping_steps,
            scheme = ?self.scheme.scheme_type,
            "backward rollback"
        );
        let condition = self.condition.as_deref();
        let mut ctx = SchemeContext {
            op: self.op.as_mut(),
            bc_set: &mut self.bc_set,
        };

        if self.scheme.scheme_type == FdmSchemeType::ImplicitEuler || damping_steps == 0 {
            let mut model = FiniteDifferenceModel::new(scheme);
            return model.rollback(&mut ctx, a, from, to, steps + damping_steps, condition);
        }

        let all_steps = (steps + damping_steps) as Real;
        let damping_to = from - (from - to) * damping_steps as Real / all_steps;
        let mut damping = FiniteDifferenceModel::new(Box::new(ImplicitEulerScheme::new()));
        damping.rollback(&mut ctx, a, from, damping_to, damping_steps, condition)?;

        let mut model = FiniteDifferenceModel::new(scheme);
        model.continue_rollback(&mut ctx, a, damping_to, to, steps, condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::boundary::{FdmBoundaryCondition, Side};
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite};
    use crate::finite_differences::operators::FdmWienerOp;
    use ql_termstructures::FlatForward;

    fn heat_solver(scheme: FdmSchemeDesc) -> (FdmBackwardSolver, Array) {
        let mesher = Arc::new(
            FdmMesherComposite::from_1d(Fdm1dMesher::uniform(0.0, 1.0, 41).unwrap()).unwrap(),
        );
        let op = FdmWienerOp::new(
            Arc::clone(&mesher),
            2.0_f64.sqrt(),
            Arc::new(FlatForward::new(0.0)),
            0,
        )
        .unwrap();
        let bc_set = FdmBoundaryConditionSet::new(vec![
            FdmBoundaryCondition::dirichlet(&mesher, 0.0, 0, Side::Lower).unwrap(),
            FdmBoundaryCondition::dirichlet(&mesher, 0.0, 0, Side::Upper).unwrap(),
        ])
        .unwrap();
        // step function: a kink source for Crank-Nicolson oscillations
        let initial = mesher.locations(0).map(|x| if (0.3..=0.7).contains(&x) { 1.0 } else { 0.0 });
        (FdmBackwardSolver::new(Box::new(op), bc_set, None, scheme), initial)
    }

    fn total_variation(a: &Array) -> Real {
        a.as_slice().windows(2).map(|w| (w[1] - w[0]).abs()).sum()
    }

    #[test]
    fn damping_removes_oscillations() {
        let (mut plain, mut a) = heat_solver(FdmSchemeDesc::crank_nicolson());
        let mut b = a.clone();
        plain.rollback(&mut a, 0.1, 0.0, 5, 0).unwrap();
        let (mut damped, _) = heat_solver(FdmSchemeDesc::crank_nicolson());
        damped.rollback(&mut b, 0.1, 0.0, 5, 5).unwrap();
        // a smooth non-negative bump has total variation 2·max
        assert!(total_variation(&b) <= 2.0 * b.max() + 1e-6);
        assert!(total_variation(&a) > total_variation(&b));
        assert!(b.min() > -1e-6);
    }

    #[test]
    fn implicit_euler_uses_all_steps() {
        let (mut s1, mut a) = heat_solver(FdmSchemeDesc::implicit_euler());
        let (mut s2, _) = heat_solver(FdmSchemeDesc::implicit_euler());
        let mut b = a.clone();
        s1.rollback(&mut a, 0.1, 0.0, 6, 4).unwrap();
        s2.rollback(&mut b, 0.1, 0.0, 10, 0).unwrap();
        assert_eq!(a, b);
    }
}
