//! Finite-difference framework for pricing PDEs.
//!
//! A problem is assembled from independent parts:
//!
//! * [`meshers`]: the spatial grid, one [`Fdm1dMesher`] per direction
//!   combined into an [`FdmMesherComposite`]
//! * [`operators`]: banded discretisations of the spatial generator `L` of
//!   `∂V/∂t + L V = 0`, behind the [`FdmLinearOpComposite`] trait
//! * [`boundary`]: Dirichlet and Neumann conditions enforced around every
//!   explicit application and implicit solve
//! * [`step_conditions`]: events during the rollback (early exercise,
//!   dividends, storage decisions, snapshots)
//! * [`schemes`]: explicit, implicit, θ and ADI time stepping
//! * [`solvers`]: the backward induction and the lazily evaluated solvers
//!
//! The rollback runs from maturity to time zero; all times are year
//! fractions.

pub mod boundary;
pub mod inner_value;
pub mod meshers;
pub mod operators;
pub mod schemes;
pub mod solvers;
pub mod step_conditions;

pub use boundary::{BoundaryKind, BoundaryValue, FdmBoundaryCondition, FdmBoundaryConditionSet, Side};
pub use inner_value::{FdmInnerValueCalculator, FdmLogInnerValue, FdmZeroInnerValue};
pub use meshers::{Fdm1dMesher, FdmMesherComposite};
pub use operators::{FdmLinearOpComposite, FdmLinearOpLayout};
pub use schemes::{FdmScheme, FdmSchemeDesc, FdmSchemeType, SchemeContext};
pub use solvers::{
    Fdm1DimSolver, Fdm2DimSolver, FdmBackwardSolver, FdmBlackScholesSolver, FdmHestonSolver,
    FdmSolverDesc, FdmTimeGrid, FiniteDifferenceModel,
};
pub use step_conditions::{FdmStepConditionComposite, StepCondition};
