//! First and second derivative stencils on non-uniform grids.
//!
//! With `h⁻ = x_i − x_{i−1}` and `h⁺ = x_{i+1} − x_i` the interior rows are
//! the standard three-point weights, exact for quadratics. On the edges the
//! first derivative falls back to one-sided differences and the second
//! derivative is zero (linear extrapolation).

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use ql_core::{errors::Result, Real, Size};

use super::TripleBandLinearOp;
use crate::finite_differences::meshers::FdmMesherComposite;

/// First-derivative weights `(lower, diag, upper)` of a point with the given
/// backward and forward spacings.
pub(crate) fn first_derivative_weights(hm: Option<Real>, hp: Option<Real>) -> (Real, Real, Real) {
    match (hm, hp) {
        (Some(hm), Some(hp)) => (
            -hp / (hm * (hm + hp)),
            (hp - hm) / (hm * hp),
            hm / (hp * (hm + hp)),
        ),
        (None, Some(hp)) => (0.0, -1.0 / hp, 1.0 / hp),
        (Some(hm), None) => (-1.0 / hm, 1.0 / hm, 0.0),
        (None, None) => (0.0, 0.0, 0.0),
    }
}

fn second_derivative_weights(hm: Option<Real>, hp: Option<Real>) -> (Real, Real, Real) {
    match (hm, hp) {
        (Some(hm), Some(hp)) => (
            2.0 / (hm * (hm + hp)),
            -2.0 / (hm * hp),
            2.0 / (hp * (hm + hp)),
        ),
        _ => (0.0, 0.0, 0.0),
    }
}

fn stencil(
    direction: Size,
    mesher: Arc<FdmMesherComposite>,
    weights: fn(Option<Real>, Option<Real>) -> (Real, Real, Real),
) -> Result<TripleBandLinearOp> {
    let mut op = TripleBandLinearOp::new(direction, Arc::clone(&mesher))?;
    for i in 0..op.size() {
        let (l, d, u) = weights(mesher.dminus(i, direction), mesher.dplus(i, direction));
        op.lower[i] = l;
        op.diag[i] = d;
        op.upper[i] = u;
    }
    Ok(op)
}

/// `∂/∂x` along one direction.
#[derive(Debug, Clone)]
pub struct FirstDerivativeOp(TripleBandLinearOp);

impl FirstDerivativeOp {
    /// Build the stencil along `direction` of `mesher`.
    pub fn new(direction: Size, mesher: Arc<FdmMesherComposite>) -> Result<Self> {
        stencil(direction, mesher, first_derivative_weights).map(Self)
    }

    /// The underlying banded operator.
    pub fn into_inner(self) -> TripleBandLinearOp {
        self.0
    }
}

/// `∂²/∂x²` along one direction.
#[derive(Debug, Clone)]
pub struct SecondDerivativeOp(TripleBandLinearOp);

impl SecondDerivativeOp {
    /// Build the stencil along `direction` of `mesher`.
    pub fn new(direction: Size, mesher: Arc<FdmMesherComposite>) -> Result<Self> {
        stencil(direction, mesher, second_derivative_weights).map(Self)
    }

    /// The underlying banded operator.
    pub fn into_inner(self) -> TripleBandLinearOp {
        self.0
    }
}

macro_rules! deref_to_triple_band {
    ($($t:ty),*) => {$(
        impl Deref for $t {
            type Target = TripleBandLinearOp;
            fn deref(&self) -> &TripleBandLinearOp {
                &self.0
            }
        }

        impl DerefMut for $t {
            fn deref_mut(&mut self) -> &mut TripleBandLinearOp {
                &mut self.0
            }
        }

        impl From<$t> for TripleBandLinearOp {
            fn from(op: $t) -> Self {
                op.0
            }
        }
    )*};
}

deref_to_triple_band!(FirstDerivativeOp, SecondDerivativeOp);
