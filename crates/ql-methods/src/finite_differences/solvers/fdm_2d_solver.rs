//! Lazy solver on a two-dimensional mesh.

use std::cell::RefCell;
use std::sync::Arc;

use ql_core::{
    ensure, ensure_config,
    errors::Result,
    patterns::lazy_object::{LazyObject, LazyState},
    Error, Real,
};
use ql_math::{Array, BicubicSpline};

use super::backward_solver::FdmBackwardSolver;
use super::fdm_1d_solver::theta_snapshot_time;
use super::solver_desc::FdmSolverDesc;
use crate::finite_differences::operators::FdmLinearOpComposite;
use crate::finite_differences::schemes::FdmSchemeDesc;
use crate::finite_differences::step_conditions::{
    FdmSnapshotCondition, FdmStepConditionComposite, StepCondition,
};

#[derive(Debug)]
struct Solution {
    values: Array,
    interpolation: BicubicSpline,
    theta_interpolation: BicubicSpline,
}

/// Two-dimensional counterpart of
/// [`Fdm1DimSolver`](super::Fdm1DimSolver), interpolating with a bicubic
/// spline.
#[derive(Debug)]
pub struct Fdm2DimSolver {
    desc: FdmSolverDesc,
    x: Vec<Real>,
    y: Vec<Real>,
    initial_values: Array,
    snapshot: Arc<FdmSnapshotCondition>,
    backward: RefCell<FdmBackwardSolver>,
    solution: RefCell<Option<Solution>>,
    state: LazyState,
}

impl Fdm2DimSolver {
    /// Solver for `op` on the two-dimensional problem `desc`.
    pub fn new(
        desc: FdmSolverDesc,
        scheme: FdmSchemeDesc,
        op: Box<dyn FdmLinearOpComposite>,
    ) -> Result<Self> {
        desc.validate()?;
        ensure_config!(
            desc.mesher.directions() == 2,
            "two-dimensional solver on a {}-dimensional mesh",
            desc.mesher.directions()
        );
        let x = desc.mesher.mesher(0).locations().to_vec();
        let y = desc.mesher.mesher(1).locations().to_vec();
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
            y,
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

    /// Interpolated value at `(x, y)`.
    pub fn interpolate_at(&self, x: Real, y: Real) -> Result<Real> {
        self.check_range(x, y)?;
        self.with_solution(|s| s.interpolation.value(x, y))
    }

    /// `∂V/∂x` at `(x, y)`.
    pub fn derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        self.check_range(x, y)?;
        self.with_solution(|s| s.interpolation.derivative_x(x, y))
    }

    /// `∂V/∂y` at `(x, y)`.
    pub fn derivative_y(&self, x: Real, y: Real) -> Result<Real> {
        self.check_range(x, y)?;
        self.with_solution(|s| s.interpolation.derivative_y(x, y))
    }

    /// `∂²V/∂x²` at `(x, y)`.
    pub fn derivative_xx(&self, x: Real, y: Real) -> Result<Real> {
        self.check_range(x, y)?;
        self.with_solution(|s| s.interpolation.second_derivative_x(x, y))
    }

    /// `∂²V/∂y²` at `(x, y)`.
    pub fn derivative_yy(&self, x: Real, y: Real) -> Result<Real> {
        self.check_range(x, y)?;
        self.with_solution(|s| s.interpolation.second_derivative_y(x, y))
    }

    /// `∂²V/∂x∂y` at `(x, y)`.
    pub fn derivative_xy(&self, x: Real, y: Real) -> Result<Real> {
        self.check_range(x, y)?;
        self.with_solution(|s| s.interpolation.derivative_xy(x, y))
    }

    /// Time derivative at `(x, y)`.
    pub fn theta_at(&self, x: Real, y: Real) -> Result<Real> {
        self.check_range(x, y)?;
        let dt = self.snapshot.time();
        self.with_solution(|s| {
            Ok((s.theta_interpolation.value(x, y)? - s.interpolation.value(x, y)?) / dt)
        })
    }

    fn check_range(&self, x: Real, y: Real) -> Result<()> {
        let (x_lo, x_hi) = (self.x[0], self.x[self.x.len() - 1]);
        let (y_lo, y_hi) = (self.y[0], self.y[self.y.len() - 1]);
        ensure!(
            x >= x_lo && x <= x_hi && y >= y_lo && y <= y_hi,
            "point ({x}, {y}) is outside the mesh range [{x_lo}, {x_hi}] × [{y_lo}, {y_hi}]"
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

impl LazyObject for Fdm2DimSolver {
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
            interpolation: BicubicSpline::new(&self.x, &self.y, values.as_slice())?,
            theta_interpolation: BicubicSpline::new(&self.x, &self.y, snapshot.as_slice())?,
            values,
        };
        *self.solution.borrow_mut() = Some(solution);
        Ok(())
    }

    fn lazy_state(&self) -> &LazyState {
        &self.state
    }
}
