//! Heston problems in (spot, variance) coordinates.

use ql_core::{ensure, errors::Result, Real};
use ql_processes::HestonProcess;

use super::fdm_2d_solver::Fdm2DimSolver;
use super::solver_desc::FdmSolverDesc;
use crate::finite_differences::operators::FdmHestonOp;
use crate::finite_differences::schemes::FdmSchemeDesc;

/// Solves on a (log-spot, variance) mesh and reports results in spot terms.
#[derive(Debug)]
pub struct FdmHestonSolver {
    solver: Fdm2DimSolver,
}

impl FdmHestonSolver {
    /// Solver with the Heston operator of `process`.
    pub fn new(desc: FdmSolverDesc, process: &HestonProcess, scheme: FdmSchemeDesc) -> Result<Self> {
        let op = FdmHestonOp::new(desc.mesher.clone(), process)?;
        Ok(Self {
            solver: Fdm2DimSolver::new(desc, scheme, Box::new(op))?,
        })
    }

    /// Value at spot `s` and variance `v`.
    pub fn value_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.interpolate_at(log_spot(s)?, v)
    }

    /// `∂V/∂S`.
    pub fn delta_at(&self, s: Real, v: Real) -> Result<Real> {
        Ok(self.solver.derivative_x(log_spot(s)?, v)? / s)
    }

    /// `∂²V/∂S²`.
    pub fn gamma_at(&self, s: Real, v: Real) -> Result<Real> {
        let x = log_spot(s)?;
        let dx = self.solver.derivative_x(x, v)?;
        let dxx = self.solver.derivative_xx(x, v)?;
        Ok((dxx - dx) / (s * s))
    }

    /// `∂V/∂v`.
    pub fn mean_variance_delta_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.derivative_y(log_spot(s)?, v)
    }

    /// `∂V/∂t`.
    pub fn theta_at(&self, s: Real, v: Real) -> Result<Real> {
        self.solver.theta_at(log_spot(s)?, v)
    }

    /// Underlying (log-spot, variance) solver.
    pub fn solver(&self) -> &Fdm2DimSolver {
        &self.solver
    }
}

fn log_spot(s: Real) -> Result<Real> {
    ensure!(s > 0.0, "spot ({s}) must be positive");
    Ok(s.ln())
}
