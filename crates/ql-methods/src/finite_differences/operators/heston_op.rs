//! Heston generator on a (log-spot, variance) mesh.

use std::sync::Arc;

use ql_core::{ensure, ensure_config, errors::Result, Real, Size, Time};
use ql_math::Array;
use ql_processes::HestonProcess;
use ql_termstructures::YieldTermStructure;

use super::{
    FdmLinearOpComposite, FirstDerivativeOp, NinePointLinearOp, SecondDerivativeOp,
    SecondOrderMixedDerivativeOp, TripleBandLinearOp,
};
use crate::finite_differences::meshers::FdmMesherComposite;

/// Heston operator split into an equity part along direction 0, a variance
/// part along direction 1 and the correlation term:
///
/// ```text
/// L_x  = (r − q − v/2)∂x + (v/2)∂xx − r/2
/// L_v  = κ(θ − v)∂v + (σ²v/2)∂vv − r/2
/// L_xv = ρσv ∂x∂v
/// ```
#[derive(Debug, Clone)]
pub struct FdmHestonOp {
    risk_free: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    dx: TripleBandLinearOp,
    dxx: TripleBandLinearOp,
    equity: TripleBandLinearOp,
    dv: TripleBandLinearOp,
    variance: TripleBandLinearOp,
    dxv: NinePointLinearOp,
    correlation: NinePointLinearOp,
}

impl FdmHestonOp {
    /// Operator on a two-dimensional mesh of log-spot and variance.
    pub fn new(mesher: Arc<FdmMesherComposite>, process: &HestonProcess) -> Result<Self> {
        ensure_config!(
            mesher.directions() == 2,
            "the Heston operator needs a two-dimensional mesh, got {}",
            mesher.directions()
        );
        let v = mesher.locations(1);
        ensure!(v.min() >= 0.0, "variance mesh has negative locations");

        let (kappa, theta, sigma, rho) =
            (process.kappa(), process.theta(), process.sigma(), process.rho());

        let dx = FirstDerivativeOp::new(0, Arc::clone(&mesher))?.into_inner();
        let dxx = dx
            .mult(&(&v * -0.5))?
            .add(&SecondDerivativeOp::new(0, Arc::clone(&mesher))?.mult(&(&v * 0.5))?)?;

        let drift = v.map(|v| kappa * (theta - v));
        let dv = FirstDerivativeOp::new(1, Arc::clone(&mesher))?
            .mult(&drift)?
            .add(&SecondDerivativeOp::new(1, Arc::clone(&mesher))?.mult(&(&v * (0.5 * sigma * sigma)))?)?;

        let dxv = SecondOrderMixedDerivativeOp::new(0, 1, Arc::clone(&mesher))?
            .mult(&(&v * (rho * sigma)))?;

        Ok(Self {
            risk_free: process.risk_free_rate_arc(),
            dividend_yield: process.dividend_yield_arc(),
            equity: TripleBandLinearOp::new(0, Arc::clone(&mesher))?,
            variance: TripleBandLinearOp::new(1, mesher)?,
            dx,
            dxx,
            dv,
            correlation: dxv.clone(),
            dxv,
        })
    }
}

impl FdmLinearOpComposite for FdmHestonOp {
    fn size(&self) -> Size {
        2
    }

    fn set_time(&mut self, t1: Time, t2: Time) -> Result<()> {
        let r = self.risk_free.forward_rate(t1, t2);
        let q = self.dividend_yield.forward_rate(t1, t2);
        let half_rate = Array::from_element(1, -0.5 * r);
        self.equity.axpyb(
            Some(&Array::from_element(1, r - q)),
            &self.dx,
            &self.dxx,
            Some(&half_rate),
        )?;
        let n = self.dv.size();
        self.variance = self.dv.add_array(&Array::from_element(n, -0.5 * r))?;
        self.correlation = self.dxv.clone();
        Ok(())
    }

    fn apply(&self, r: &Array) -> Result<Array> {
        let mut ret = self.equity.apply(r)?;
        ret += &self.variance.apply(r)?;
        ret += &self.correlation.apply(r)?;
        Ok(ret)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array> {
        self.correlation.apply(r)
    }

    fn apply_direction(&self, direction: Size, r: &Array) -> Result<Array> {
        match direction {
            0 => self.equity.apply(r),
            1 => self.variance.apply(r),
            _ => Ok(Array::zeros(r.size())),
        }
    }

    fn solve_splitting(&self, direction: Size, r: &Array, a: Real) -> Result<Array> {
        match direction {
            0 => self.equity.solve_splitting(r, -a, 1.0),
            1 => self.variance.solve_splitting(r, -a, 1.0),
            _ => Ok(r.clone()),
        }
    }

    fn preconditioner(&self, r: &Array, a: Real) -> Result<Array> {
        let x = self.solve_splitting(0, r, a)?;
        self.solve_splitting(1, &x, a)
    }

    fn clear_rows(&mut self, rows: &[Size]) {
        self.equity.clear_rows(rows);
        self.variance.clear_rows(rows);
        self.correlation.clear_rows(rows);
    }

    fn couple_edge_rows(&mut self, direction: Size, rows: &[Size], coefficient: Real) {
        self.clear_rows(rows);
        match direction {
            0 => self.equity.couple_edge_rows(rows, coefficient),
            1 => self.variance.couple_edge_rows(rows, coefficient),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Fdm1dMesher;
    use approx::assert_abs_diff_eq;
    use ql_termstructures::FlatForward;

    fn setup() -> (Arc<FdmMesherComposite>, FdmHestonOp) {
        let process = HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.02)),
            100.0,
            0.04,
            1.5,
            0.04,
            0.3,
            -0.5,
        )
        .unwrap();
        let x = Fdm1dMesher::uniform(3.5, 5.5, 21).unwrap();
        let v = Fdm1dMesher::uniform(0.0, 0.5, 11).unwrap();
        let m = Arc::new(FdmMesherComposite::new(vec![Arc::new(x), Arc::new(v)]).unwrap());
        let op = FdmHestonOp::new(Arc::clone(&m), &process).unwrap();
        (m, op)
    }

    #[test]
    fn parts_add_up() {
        let (m, mut op) = setup();
        op.set_time(0.0, 0.1).unwrap();
        let f = Array::from_fn(m.size(), |i| {
            let (x, v) = (m.location(i, 0), m.location(i, 1));
            x * x + x * v + v * v
        });
        let sum = &(&op.apply_direction(0, &f).unwrap() + &op.apply_direction(1, &f).unwrap())
            + &op.apply_mixed(&f).unwrap();
        assert_eq!(op.apply(&f).unwrap(), sum);

        // interior points are exact on quadratics
        for i in 0..m.size() {
            let c = m.layout().coordinates(i);
            if c[0] == 0 || c[0] == 20 || c[1] == 0 || c[1] == 10 {
                continue;
            }
            let (x, v) = (m.location(i, 0), m.location(i, 1));
            let fx = 2.0 * x + v;
            let fv = x + 2.0 * v;
            let expected = (0.03 - 0.5 * v) * fx + 0.5 * v * 2.0
                + 1.5 * (0.04 - v) * fv
                + 0.5 * 0.09 * v * 2.0
                + (-0.5 * 0.3 * v)
                - 0.05 * f[i];
            assert_abs_diff_eq!(op.apply(&f).unwrap()[i], expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn preconditioner_inverts_each_direction() {
        let (m, mut op) = setup();
        op.set_time(0.0, 0.1).unwrap();
        let ones = Array::from_element(m.size(), 1.0);
        // L_x 1 = L_v 1 = −r/2, so (I − a L_x)(I − a L_v) 1 = (1 + a r/2)² 1
        let a: Real = 0.2;
        let rhs = &ones * (1.0 + a * 0.025).powi(2);
        let x = op.preconditioner(&rhs, a).unwrap();
        for i in 0..m.size() {
            assert_abs_diff_eq!(x[i], 1.0, epsilon = 1e-12);
        }
        assert!(FdmHestonOp::new(
            Arc::new(FdmMesherComposite::from_1d(Fdm1dMesher::uniform(0.0, 1.0, 3).unwrap()).unwrap()),
            &HestonProcess::new(
                Arc::new(FlatForward::new(0.0)),
                Arc::new(FlatForward::new(0.0)),
                1.0, 0.04, 1.0, 0.04, 0.1, 0.0,
            )
            .unwrap(),
        )
        .unwrap_err()
        .is_configuration());
    }
}
