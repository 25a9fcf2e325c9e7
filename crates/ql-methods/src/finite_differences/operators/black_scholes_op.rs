//! Black-Scholes generator in log-spot.

use std::sync::Arc;

use ql_core::{errors::Result, Real, Size, Time};
use ql_math::Array;
use ql_processes::GeneralizedBlackScholesProcess;
use ql_termstructures::{BlackVolTermStructure, YieldTermStructure};

use super::{zero_like, FdmLinearOpComposite, FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp};
use crate::finite_differences::meshers::FdmMesherComposite;

/// `L = (r − q − v/2)∂x + (v/2)∂xx − r` along one direction of the mesh.
///
/// `r` and `q` are the forward rates over the current step and `v` is the
/// Black forward variance per unit time at the given strike.
#[derive(Debug, Clone)]
pub struct FdmBlackScholesOp {
    risk_free: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    volatility: Arc<dyn BlackVolTermStructure>,
    strike: Real,
    direction: Size,
    directions: Size,
    dx: TripleBandLinearOp,
    dxx: TripleBandLinearOp,
    map: TripleBandLinearOp,
}

impl FdmBlackScholesOp {
    /// Operator along `direction` of `mesher`, whose locations are log-spots.
    pub fn new(
        mesher: Arc<FdmMesherComposite>,
        process: &GeneralizedBlackScholesProcess,
        strike: Real,
        direction: Size,
    ) -> Result<Self> {
        let dx = FirstDerivativeOp::new(direction, Arc::clone(&mesher))?.into_inner();
        let dxx = SecondDerivativeOp::new(direction, Arc::clone(&mesher))?.into_inner();
        let map = TripleBandLinearOp::new(direction, Arc::clone(&mesher))?;
        Ok(Self {
            risk_free: process.risk_free_rate_arc(),
            dividend_yield: process.dividend_yield_arc(),
            volatility: process.black_volatility_arc(),
            strike,
            direction,
            directions: mesher.directions(),
            dx,
            dxx,
            map,
        })
    }

    /// Direction the operator acts along.
    pub fn direction(&self) -> Size {
        self.direction
    }
}

impl FdmLinearOpComposite for FdmBlackScholesOp {
    fn size(&self) -> Size {
        self.directions
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let r = self.risk_free.forward_rate(t1, t2);
        let q = self.dividend_yield.forward_rate(t1, t2);
        let v = if t2 > t1 {
            self.volatility.black_forward_variance(t1, t2, self.strike)? / (t2 - t1)
        } else {
            let vol = self.volatility.black_vol(t1, self.strike);
            vol * vol
        };
        self.map.axpyb(
            Some(&Array::from_element(1, r - q - 0.5 * v)),
            &self.dx,
            &self.dxx.scale(0.5 * v),
            Some(&Array::from_element(1, -r)),
        )
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Fdm1dMesher;
    use approx::assert_abs_diff_eq;
    use ql_termstructures::{BlackConstantVol, FlatForward};

    fn setup() -> (Arc<FdmMesherComposite>, FdmBlackScholesOp) {
        let process = GeneralizedBlackScholesProcess::new(
            100.0,
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.01)),
            Arc::new(BlackConstantVol::new(0.3)),
        )
        .unwrap();
        let m = Arc::new(
            FdmMesherComposite::from_1d(Fdm1dMesher::uniform(3.0, 6.0, 31).unwrap()).unwrap(),
        );
        let op = FdmBlackScholesOp::new(Arc::clone(&m), &process, 100.0, 0).unwrap();
        (m, op)
    }

    #[test]
    fn forward_is_in_the_kernel() {
        let (m, mut op) = setup();
        op.set_time(0.0, 0.5).unwrap();
        let s = m.locations(0).map(Real::exp);
        let ls = op.apply(&s).unwrap();
        for i in 1..30 {
            // L S = (r − q)S − r S = −q S, up to discretisation error
            assert_abs_diff_eq!(ls[i] / s[i], -0.01, epsilon = 2e-3);
        }
    }

    #[test]
    fn constants_decay_at_the_short_rate() {
        let (m, mut op) = setup();
        op.set_time(0.25, 0.5).unwrap();
        let one = Array::from_element(m.size(), 1.0);
        let l1 = op.apply(&one).unwrap();
        for i in 0..m.size() {
            assert_abs_diff_eq!(l1[i], -0.05, epsilon = 1e-9);
        }
        let back = op.solve_splitting(0, &(&one - &(&l1 * 0.1)), 0.1).unwrap();
        for i in 0..m.size() {
            assert_abs_diff_eq!(back[i], 1.0, epsilon = 1e-10);
        }
    }
}
