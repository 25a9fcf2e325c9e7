//! Lazy solver on a one-dimensional mesh.

use std::cell::RefCell;
use std::sync::Arc;

use ql_core::{
    ensure, ensure_config,
    errors::Result,
    patterns::lazy_object::{LazyObject, LazyState},
    Error, Real, Time,
};
use ql_math::{Array, CubicNaturalSpline, Interpolation1D};

use super::backward_solver::FdmBackwardSolver;
use super::solver_desc::FdmSolverDesc;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use crate::finite_differences::step_conditions::{
    FdmSnapshotCondition, FdmStepConditionComposite, StepCondition,
};

/// Time of the theta snapshot: a fraction of a day, or less if an event
/// falls earlier.
pub(crate) fn theta_snapshot_time(desc: &FdmSolverDesc) -> Time {
    let first = desc
        .condition
        .stopping_times()
        .iter()
        .copied()
        .find(|&t| t > 0.0)
        .unwrap_or(desc.maturity);
    0.99 * first.min(1.0 / 365.0)
}

#[derive(Debug)]
struct Solution {
    values: Array,
    interpolation: CubicNaturalSpline,
    theta_interpolation: CubicNaturalSpline,
}

/// Rolls the terminal payoff back to time zero on the first query and
/// interpolates the result with a monotonic cubic spline.
#[derive(Debug)]
pub struct Fdm1DimSolver {
    desc: FdmSolverDesc,
    x: Vec<Real>,
    initial_values: Array,
    snapshot: Arc<FdmSnapshotCondition>,
    backward: RefCell<FdmBackwardSolver>,
    solution: RefCell<Option<Solution>>,
    state: LazyState,
}

impl Fdm1DimSolver {
    /// Solver for `op` on the one-dimensional problem `desc`.
    pub fn new(
        desc: FdmSolverDesc,
        scheme: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        desc.validate()?;
        ensure_config!(
            desc.mesher.directions() == 1,
            "one-dimensional solver on a {}-dimensional mesh",
            desc.mesher.directions()
        );
        let x = desc.mesher.mesher(0).locations().to_vec();
        let initial_values = Array::from_fn(desc.mesher.size(), |i| {
            desc.calculator.avg_inner_value(i, desc.maturity)
        });

        let snapshot = Arc::new(FdmSnapshotCondition::new(theta_snapshot_time(&desc)));
        let condition: Arc<dyn StepCondition> = Arc::new(FdmStepConditionComposite::join(
            Arc::clone(&snapshot) as Arc<dyn StepCondition>,
            &desc.condition,
        ));
        let backward = FdmBackwardSolver::new(op, desc.bc_set.clone(), Some(condition), scheme);

        Ok(Self {
            desc,
            x,
            initial_values,
            snapshot,
            backward: RefCell::new(backward),
            solution: RefCell::new(None),
            state: LazyState::new(),
        })
    }

    /// Problem description.
    pub fn desc(&self) -> &FdmSolverDesc {
        &self.desc
    }

    /// Solution at time zero on the mesh nodes.
    pub fn values(&self) -> Result<Array> {
        self.with_solution(|s| Ok(s.values.clone()))
    }

    /// Interpolated value at `x`.
    pub fn interpolate_at(&self, x: Real) -> Result<Real> {
        self.check_range(x)?;
        self.with_solution(|s| Ok(s.interpolation.operator(x)))
    }

    /// First derivative of the interpolated solution at `x`.
    pub fn derivative_x(&self, x: Real) -> Result<Real> {
        self.check_range(x)?;
        self.with_solution(|s| Ok(s.interpolation.derivative(x)))
    }

    /// Second derivative of the interpolated solution at `x`.
    pub fn derivative_xx(&self, x: Real) -> Result<Real> {
        self.check_range(x)?;
        self.with_solution(|s| Ok(s.interpolation.second_derivative(x)))
    }

    /// Time derivative at `x`, from the snapshot taken shortly after time zero.
    pub fn theta_at(&self, x: Real) -> Result<Real> {
        self.check_range(x)?;
        let dt = self.snapshot.time();
        self.with_solution(|s| {
            Ok((s.theta_interpolation.operator(x) - s.interpolation.operator(x)) / dt)
        })
    }

    fn check_range(&self, x: Real) -> Result<()> {
        let (lo, hi) = (self.x[0], self.x[self.x.len() - 1]);
        ensure!(
            x >= lo && x <= hi,
            "point {x} is outside the mesh range [{lo}, {hi}]"
        );
        Ok(())
    }

    fn with_solution<T>(&self, f: impl FnOnce(&Solution) -> Result<T>) -> Result<T> {
        self.calculate()?;
        let solution = self.solution.borrow();
        let solution = solution
            .as_ref()
            .ok_or_else(|| Error::Runtime("solution not available".into()))?;
        f(solution)
    }
}

impl LazyObject for Fdm1DimSolver {
    fn perform_calculations(&self) -> Result<()> {
        let mut values = self.initial_values.clone();
        self.backward.borrow_mut().rollback(
            &mut values,
            self.desc.maturity,
            0.0,
            self.desc.time_steps,
            self.desc.damping_steps,
        )?;
        let snapshot = self.snapshot.values().ok_or_else(|| {
            Error::Runtime(format!(
                "rollback did not pass the theta snapshot time {}",
                self.snapshot.time()
            ))
        })?;
        let solution = Solution {
            interpolation: CubicNaturalSpline::monotonic(&self.x, values.as_slice())?,
            theta_interpolation: CubicNaturalSpline::monotonic(&self.x, snapshot.as_slice())?,
            values,
        };
        *self.solution.borrow_mut() = Some(solution);
        Ok(())
    }

    fn lazy_state(&self) -> &LazyState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::boundary::FdmBoundaryConditionSet;
    use crate::finite_differences::inner_value::FdmInnerValueCalculator;
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite};
    use crate::finite_differences::operators::FdmWienerOp;
    use approx::assert_abs_diff_eq;
    use ql_core::Size;
    use ql_termstructures::FlatForward;

    /// Payoff `x²` on the mesh.
    #[derive(Debug)]
    struct Square(Arc<FdmMesherComposite>);

    impl FdmInnerValueCalculator for Square {
        fn inner_value(&self, index: Size, _t: Time) -> Real {
            self.0.location(index, 0).powi(2)
        }

        fn avg_inner_value(&self, index: Size, t: Time) -> Real {
            self.inner_value(index, t)
        }
    }

    fn solver(rate: Real) -> Fdm1DimSolver {
        let mesher = Arc::new(
            FdmMesherComposite::from_1d(Fdm1dMesher::uniform(-3.0, 3.0, 121).unwrap()).unwrap(),
        );
        let desc = FdmSolverDesc {
            mesher: Arc::clone(&mesher),
            bc_set: FdmBoundaryConditionSet::empty(),
            condition: FdmStepConditionComposite::default(),
            calculator: Arc::new(Square(Arc::clone(&mesher))),
            maturity: 1.0,
            time_steps: 50,
            damping_steps: 0,
        };
        let op = FdmWienerOp::new(mesher, 0.5, Arc::new(FlatForward::new(rate)), 0).unwrap();
        Fdm1DimSolver::new(desc, FdmSchemeDesc::douglas(), Box::new(op)).unwrap()
    }

    #[test]
    fn expectation_of_a_quadratic() {
        // E[(x + σW_T)²] = x² + σ²T, discounted
        let s = solver(0.05);
        let df = (-0.05_f64).exp();
        assert!(!s.is_calculated());
        assert_abs_diff_eq!(s.interpolate_at(0.5).unwrap(), df * (0.25 + 0.25), epsilon = 2e-3);
        assert!(s.is_calculated());
        assert_abs_diff_eq!(s.derivative_x(0.5).unwrap(), df * 1.0, epsilon = 2e-3);
        assert_abs_diff_eq!(s.derivative_xx(0.5).unwrap(), df * 2.0, epsilon = 2e-2);
    }

    #[test]
    fn theta_matches_the_backward_equation() {
        // ∂V/∂t = −(½σ² V_xx − r V)
        let s = solver(0.05);
        let x = 0.3;
        let expected =
            -(0.125 * s.derivative_xx(x).unwrap() - 0.05 * s.interpolate_at(x).unwrap());
        assert_abs_diff_eq!(s.theta_at(x).unwrap(), expected, epsilon = 2e-3);
    }

    #[test]
    fn queries_outside_the_mesh_fail() {
        let s = solver(0.0);
        assert!(s.interpolate_at(3.5).is_err());
        assert!(s.theta_at(-3.01).is_err());
        assert!(!s.is_calculated());
    }

    #[test]
    fn events_beyond_maturity_are_rejected() {
        let mesher = Arc::new(
            FdmMesherComposite::from_1d(Fdm1dMesher::uniform(0.0, 1.0, 11).unwrap()).unwrap(),
        );
        let condition = FdmStepConditionComposite::new(vec![
            Arc::new(FdmSnapshotCondition::new(2.0)) as Arc<dyn StepCondition>,
        ]);
        let desc = FdmSolverDesc {
            mesher: Arc::clone(&mesher),
            bc_set: FdmBoundaryConditionSet::empty(),
            condition,
            calculator: Arc::new(Square(Arc::clone(&mesher))),
            maturity: 1.0,
            time_steps: 10,
            damping_steps: 0,
        };
        let op = FdmWienerOp::new(mesher, 0.5, Arc::new(FlatForward::new(0.0)), 0).unwrap();
        let err = Fdm1DimSolver::new(desc, FdmSchemeDesc::douglas(), Box::new(op)).unwrap_err();
        assert!(err.is_configuration());
    }
}
