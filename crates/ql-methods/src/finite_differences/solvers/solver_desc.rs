//! Everything a lazy solver needs besides the operator.

use std::sync::Arc;

use ql_core::{ensure_config, errors::Result, Size, Time};

use crate::finite_differences::boundary::FdmBoundaryConditionSet;
use crate::finite_differences::inner_value::FdmInnerValueCalculator;
use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::step_conditions::{same_time, FdmStepConditionComposite};

/// Problem description shared by the dimension-specific solvers.
#[derive(Debug, Clone)]
pub struct FdmSolverDesc {
    /// Spatial mesh.
    pub mesher: Arc<FdmMesherComposite>,
    /// Boundary conditions.
    pub bc_set: FdmBoundaryConditionSet,
    /// Events applied during the rollback.
    pub condition: FdmStepConditionComposite,
    /// Terminal payoff on the mesh.
    pub calculator: Arc<dyn FdmInnerValueCalculator>,
    /// Time to maturity; the rollback starts here.
    pub maturity: Time,
    /// Number of regular time steps.
    pub time_steps: Size,
    /// Number of implicit Euler steps taken first.
    pub damping_steps: Size,
}

impl FdmSolverDesc {
    /// Checks performed before any rollback starts.
    pub fn validate(&self) -> Result<()> {
        ensure_config!(
            self.maturity > 0.0,
            "maturity ({}) must be positive",
            self.maturity
        );
        ensure_config!(self.time_steps > 0, "at least one time step is required");
        for &t in self.condition.stopping_times() {
            ensure_config!(
                t >= 0.0 && (t <= self.maturity || same_time(t, self.maturity)),
                "event time {t} lies beyond maturity {}",
                self.maturity
            );
        }
        Ok(())
    }
}
