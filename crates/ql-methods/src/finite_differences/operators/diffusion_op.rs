//! Generators of generic one-factor diffusions.

use std::sync::Arc;

use ql_core::{errors::Result, Real, Size, Time};
use ql_math::Array;
use ql_processes::StochasticProcess1D;
use ql_termstructures::YieldTermStructure;

use super::{zero_like, FdmLinearOpComposite, FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp};
use crate::finite_differences::meshers::FdmMesherComposite;

/// `L = μ(t_m, x)∂x + ½σ²(t_m, x)∂xx − r` for any one-factor process, with
/// the coefficients frozen at the step midpoint `t_m = ½(t1 + t2)` and `r`
/// the forward rate over the step.
#[derive(Debug, Clone)]
pub struct FdmDiffusionOp<P: StochasticProcess1D> {
    process: Arc<P>,
    risk_free: Arc<dyn YieldTermStructure>,
    direction: Size,
    directions: Size,
    x: Array,
    dx: TripleBandLinearOp,
    dxx: TripleBandLinearOp,
    map: TripleBandLinearOp,
}

impl<P: StochasticProcess1D> FdmDiffusionOp<P> {
    /// Operator along `direction` whose locations are the process state.
    pub fn new(
        mesher: Arc<FdmMesherComposite>,
        process: Arc<P>,
        risk_free: Arc<dyn YieldTermStructure>,
        direction: Size,
    ) -> Result<Self> {
        Ok(Self {
            process,
            risk_free,
            direction,
            directions: mesher.directions(),
            x: mesher.locations(direction),
            dx: FirstDerivativeOp::new(direction, Arc::clone(&mesher))?.into_inner(),
            dxx: SecondDerivativeOp::new(direction, Arc::clone(&mesher))?.into_inner(),
            map: TripleBandLinearOp::new(direction, mesher)?,
        })
    }
}

impl<P: StochasticProcess1D> FdmLinearOpComposite for FdmDiffusionOp<P> {
    fn size(&self) -> Size {
        self.directions
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let tm = 0.5 * (t1 + t2);
        let r = self.risk_free.forward_rate(t1, t2);
        let drift = self.x.map(|x| self.process.drift(tm, x));
        let half_variance = self.x.map(|x| {
            let s = self.process.diffusion(tm, x);
            0.5 * s * s
        });
        let diffusion = self.dxx.mult(&half_variance)?;
        self.map
            .axpyb(Some(&drift), &self.dx, &diffusion, Some(&Array::from_element(1, -r)))
    }

    fn apply(&self, r: &Array) -> Result<Array> {
        self.map.apply(r)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array> {
        Ok(zero_like(r))
    }

    fn apply_direction(&self, direction: Size, r: &Array) -> Result<Array> {
        if direction == self.direction {
            self.map.apply(r)
        } else {
            Ok(zero_like(r))
        }
    }

    fn solve_splitting(&self, direction: Size, r: &Array, a: Real) -> Result<Array> {
        if direction == self.direction {
            self.map.solve_splitting(r, -a, 1.0)
        } else {
            Ok(r.clone())
        }
    }

    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
        self.solve_splitting(self.direction, r, a)
    }

    fn clear_rows(&mut self, rows: &[Size]) {
        self.map.clear_rows(rows);
    }

    fn couple_edge_rows(&mut self, direction: Size, rows: &[Size], coefficient: Real) {
        if direction == self.direction {
            self.map.couple_edge_rows(rows, coefficient);
        } else {
            self.map.clear_rows(rows);
        }
    }
}

/// Brownian motion with constant volatility: `L = ½σ²∂xx − r`.
#[derive(Debug, Clone)]
pub struct FdmWienerOp {
    sigma: Real,
    risk_free: Arc<dyn YieldTermStructure>,
    direction: Size,
    directions: Size,
    dxx: TripleBandLinearOp,
    map: TripleBandLinearOp,
}

impl FdmWienerOp {
    /// Operator along `direction` of `mesher`.
    pub fn new(
        mesher: Arc<FdmMesherComposite>,
        sigma: Real,
        risk_free: Arc<dyn YieldTermStructure>,
        direction: Size,
    ) -> Result<Self> {
        Ok(Self {
            sigma,
            risk_free,
            direction,
            directions: mesher.directions(),
            dxx: SecondDerivativeOp::new(direction, Arc::clone(&mesher))?.into_inner(),
            map: TripleBandLinearOp::new(direction, mesher)?,
        })
    }
}

impl FdmLinearOpComposite for FdmWienerOp {
    fn size(&self) -> Size {
        self.directions
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let r = self.risk_free.forward_rate(t1, t2);
        let n = self.dxx.size();
        self.map = self
            .dxx
            .scale(0.5 * self.sigma * self.sigma)
            .add_array(&Array::from_element(n, -r))?;
        Ok(())
    }

    fn apply(&self, r: &Array) -> Result<Array> {
        self.map.apply(r)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array> {
        Ok(zero_like(r))
    }

    fn apply_direction(&self, direction: Size, r: &Array) -> Result<Array> {
        if direction == self.direction {
            self.map.apply(r)
        } else {
            Ok(zero_like(r))
        }
    }

    fn solve_splitting(&self, direction: Size, r: &Array, a: Real) -> Result<Array> {
        if direction == self.direction {
            self.map.solve_splitting(r, -a, 1.0)
        } else {
            Ok(r.clone())
        }
    }

    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
        self.solve_splitting(self.direction, r, a)
    }

    fn clear_rows(&mut self, rows: &[Size]) {
        self.map.clear_rows(rows);
    }

    fn couple_edge_rows(&mut self, direction: Size, rows: &[Size], coefficient: Real) {
        if direction == self.direction {
            self.map.couple_edge_rows(rows, coefficient);
        } else {
            self.map.clear_rows(rows);
        }
    }
}
