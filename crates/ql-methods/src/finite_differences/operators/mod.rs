//! Spatial operators.
//!
//! Directional building blocks ([`TripleBandLinearOp`], [`NinePointLinearOp`]
//! and the derivative stencils built on them) are combined into the model
//! operators implementing [`FdmLinearOpComposite`], the capability set the
//! time-stepping schemes work against.
//!
//! `L` always denotes the generator of the backward equation
//! `∂V/∂t + L V = 0`.

mod black_scholes_op;
mod derivatives;
mod diffusion_op;
mod heston_op;
mod layout;
mod nine_point;
mod triple_band;

pub use black_scholes_op::FdmBlackScholesOp;
pub use derivatives::{FirstDerivativeOp, SecondDerivativeOp};
pub use diffusion_op::{FdmDiffusionOp, FdmWienerOp};
pub use heston_op::FdmHestonOp;
pub use layout::{FdmLinearOpLayout, GridPoint};
pub use nine_point::{NinePointLinearOp, SecondOrderMixedDerivativeOp};
pub use triple_band::TripleBandLinearOp;

use ql_core::{errors::Result, Real, Size, Time};
use ql_math::Array;

/// A time-dependent linear operator split by direction.
pub trait FdmLinearOpComposite: std::fmt::Debug + Send + Sync {
    /// Number of directions of the underlying mesh.
    fn size(&self) -> Size;

    /// Refresh the coefficients for the step `[t1, t2]`.
    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()>;

    /// Full action `L r`.
    fn apply(&self, r: &Array) -> Result<Array>;

    /// Cross-derivative part of `L r`.
    fn apply_mixed(&self, r: &Array) -> Result<Array>;

    /// Part of `L r` along `direction`, without cross terms.
    fn apply_direction(&self, direction: Size, r: &Array) -> Result<Array>;

    /// Solve `(I − a·L_direction) x = r`.
    fn solve_splitting(&self, direction: Size, r: &Array, a: Real) -> Result<Array>;

    /// Approximate inverse of `I − a·L`, used to precondition iterative solves.
    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array>;

    /// Turn the listed rows into zero rows in every part of the operator.
    fn clear_rows(&mut self, rows: &[Size]);

    /// Turn the listed edge rows of `direction` into `coefficient·v[inner]`
    /// in the part along `direction`, with `inner` the neighbour inside the
    /// grid line, and into zero rows everywhere else.
    ///
    /// With `coefficient = 1/a` the rows of `I − a·L` read
    /// `x[edge] − x[inner]`, which is how Neumann conditions enter implicit
    /// solves.
    fn couple_edge_rows(&mut self, direction: Size, rows: &[Size], coefficient: Real);
}

/// Zero action, returned for directions an operator does not act along.
pub(crate) fn zero_like(r: &Array) -> Array {
    Array::zeros(r.size())
}
