//! Rollback drivers and the lazy solvers built on them.
//!
//! [`FiniteDifferenceModel`] steps a scheme across a [`FdmTimeGrid`];
//! [`FdmBackwardSolver`] adds the damping phase; the dimension-specific
//! solvers own a complete problem ([`FdmSolverDesc`]) and interpolate the
//! solution at time zero.

mod backward_solver;
mod black_scholes_solver;
mod fdm_1d_solver;
mod fdm_2d_solver;
mod heston_solver;
mod model;
mod solver_desc;
mod time_grid;

pub use backward_solver::FdmBackwardSolver;
pub use black_scholes_solver::FdmBlackScholesSolver;
pub use fdm_1d_solver::Fdm1DimSolver;
pub use fdm_2d_solver::Fdm2DimSolver;
pub use heston_solver::FdmHestonSolver;
pub use model::FiniteDifferenceModel;
pub use solver_desc::FdmSolverDesc;
pub use time_grid::FdmTimeGrid;
