//! # ql-methods
//!
//! Numerical methods for derivatives pricing: the finite-difference
//! operator and scheme engine.
//!
//! # Modules
//!
//! * [`finite_differences`]: meshers, linear operators, boundary
//!   conditions, step conditions, time-stepping schemes and solvers
//!
//! Library code reports through the `tracing` facade and never installs a
//! subscriber.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Finite-difference PDE framework.
pub mod finite_differences;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use finite_differences::{
    Fdm1DimSolver, Fdm1dMesher, Fdm2DimSolver, FdmBackwardSolver, FdmBlackScholesSolver,
    FdmBoundaryCondition, FdmBoundaryConditionSet, FdmHestonSolver, FdmInnerValueCalculator,
    FdmLinearOpComposite, FdmMesherComposite, FdmScheme, FdmSchemeDesc, FdmSchemeType,
    FdmSolverDesc, FdmStepConditionComposite, FdmTimeGrid, FiniteDifferenceModel, StepCondition,
};
