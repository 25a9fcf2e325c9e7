//! Black-Scholes problems in spot coordinates.

use ql_core::{ensure, errors::Result, Real};
use ql_processes::GeneralizedBlackScholesProcess;

use super::fdm_1d_solver::Fdm1DimSolver;
use super::solver_desc::FdmSolverDesc;
use crate::finite_differences::operators::FdmBlackScholesOp;
use crate::finite_differences::schemes::FdmSchemeDesc;

/// Solves a one-dimensional log-spot problem and reports value and
/// sensitivities in spot terms.
#[derive(Debug)]
pub struct FdmBlackScholesSolver {
    solver: Fdm1DimSolver,
}

impl FdmBlackScholesSolver {
    /// Solver with the Black-Scholes operator of `process`; local variance
    /// is taken at `strike`.
    pub fn new(
        desc: FdmSolverDesc,
        process: &GeneralizedBlackScholesProcess,
        strike: Real,
        scheme: FdmSchemeDesc,
    ) -> Result<Self> {
        let op = FdmBlackScholesOp::new(desc.mesher.clone(), process, strike, 0)?;
        Ok(Self {
            solver: Fdm1DimSolver::new(desc, scheme, Box::new(op))?,
        })
    }

    /// Value at spot `s`.
    pub fn value_at(&self, s: Real) -> Result<Real> {
        self.solver.interpolate_at(log_spot(s)?)
    }

    /// `∂V/∂S` at spot `s`.
    pub fn delta_at(&self, s: Real) -> Result<Real> {
        Ok(self.solver.derivative_x(log_spot(s)?)? / s)
    }

    /// `∂²V/∂S²` at spot `s`.
    pub fn gamma_at(&self, s: Real) -> Result<Real> {
        let x = log_spot(s)?;
        let dx = self.solver.derivative_x(x)?;
        let dxx = self.solver.derivative_xx(x)?;
        Ok((dxx - dx) / (s * s))
    }

    /// `∂V/∂t` at spot `s`.
    pub fn theta_at(&self, s: Real) -> Result<Real> {
        self.solver.theta_at(log_spot(s)?)
    }

    /// Underlying log-spot solver.
    pub fn solver(&self) -> &Fdm1DimSolver {
        &self.solver
    }
}

fn log_spot(s: Real) -> Result<Real> {
    ensure!(s > 0.0, "spot ({s}) must be positive");
    Ok(s.ln())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::boundary::FdmBoundaryConditionSet;
    use crate::finite_differences::inner_value::FdmLogInnerValue;
    use crate::finite_differences::meshers::{
        black_scholes_mesher, FdmBlackScholesMesherParams, FdmMesherComposite,
    };
    use crate::finite_differences::step_conditions::FdmStepConditionComposite;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{Exercise, OptionType, PlainVanillaPayoff};
    use ql_math::{normal_cdf, normal_pdf};
    use ql_termstructures::{BlackConstantVol, FlatForward};
    use std::sync::Arc;

    fn process() -> GeneralizedBlackScholesProcess {
        GeneralizedBlackScholesProcess::new(
            36.0,
            Arc::new(FlatForward::new(0.06)),
            Arc::new(FlatForward::new(0.0)),
            Arc::new(BlackConstantVol::new(0.2)),
        )
        .unwrap()
    }

    fn put_solver(exercise: Exercise) -> FdmBlackScholesSolver {
        let process = process();
        let mesher = black_scholes_mesher(
            200,
            &process,
            1.0,
            40.0,
            &[],
            &FdmBlackScholesMesherParams {
                concentration: Some((40.0, 0.1)),
                ..Default::default()
            },
        )
        .unwrap();
        let mesher = Arc::new(FdmMesherComposite::from_1d(mesher).unwrap());
        let calculator = Arc::new(FdmLogInnerValue::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Put, 40.0)),
            Arc::clone(&mesher),
            0,
        ));
        let condition = FdmStepConditionComposite::vanilla(
            &[],
            &exercise,
            Arc::clone(&mesher),
            calculator.clone(),
            0,
        )
        .unwrap();
        let desc = FdmSolverDesc {
            mesher,
            bc_set: FdmBoundaryConditionSet::empty(),
            condition,
            calculator,
            maturity: 1.0,
            time_steps: 200,
            damping_steps: 0,
        };
        FdmBlackScholesSolver::new(desc, &process, 40.0, FdmSchemeDesc::douglas()).unwrap()
    }

    #[test]
    fn european_put_and_greeks() {
        let (s, k, r, vol, t) = (36.0_f64, 40.0, 0.06, 0.2, 1.0);
        let d1 = ((s / k).ln() + (r + 0.5 * vol * vol) * t) / (vol * t.sqrt());
        let d2 = d1 - vol * t.sqrt();
        let df = (-r * t).exp();
        let npv = k * df * normal_cdf(-d2) - s * normal_cdf(-d1);
        let delta = normal_cdf(d1) - 1.0;
        let gamma = normal_pdf(d1) / (s * vol * t.sqrt());
        let theta = -s * normal_pdf(d1) * vol / (2.0 * t.sqrt()) + r * k * df * normal_cdf(-d2);

        let solver = put_solver(Exercise::european(1.0).unwrap());
        assert_abs_diff_eq!(solver.value_at(s).unwrap(), npv, epsilon = 1e-2);
        assert_abs_diff_eq!(solver.delta_at(s).unwrap(), delta, epsilon = 5e-3);
        assert_abs_diff_eq!(solver.gamma_at(s).unwrap(), gamma, epsilon = 5e-3);
        assert_abs_diff_eq!(solver.theta_at(s).unwrap(), theta, epsilon = 2e-2);
    }

    #[test]
    fn american_put_exceeds_european() {
        let european = put_solver(Exercise::european(1.0).unwrap()).value_at(36.0).unwrap();
        let american = put_solver(Exercise::american(0.0, 1.0).unwrap())
            .value_at(36.0)
            .unwrap();
        assert!(american > european);
        assert_abs_diff_eq!(american, 4.478, epsilon = 0.05);
        assert!(put_solver(Exercise::european(1.0).unwrap()).value_at(-1.0).is_err());
    }
}
