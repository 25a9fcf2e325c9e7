//! Finite-difference Heston engine for vanilla options.
//!
//! Solves on a (log-spot, variance) mesh with an ADI scheme. The log-spot
//! range is sized with the volatility estimate of the variance mesher, so
//! both directions cover the same probability mass.

use std::sync::Arc;

use ql_core::errors::Result;
use ql_instruments::{PricingEngine, PricingResults, VanillaOptionArguments};
use ql_methods::finite_differences::{
    meshers::{black_scholes_mesher, FdmBlackScholesMesherParams, FdmHestonVarianceMesher},
    FdmBoundaryConditionSet, FdmHestonSolver, FdmInnerValueCalculator, FdmLogInnerValue,
    FdmMesherComposite, FdmSchemeDesc, FdmSolverDesc, FdmStepConditionComposite,
};
use ql_processes::{GeneralizedBlackScholesProcess, HestonProcess};
use ql_termstructures::BlackConstantVol;
use tracing::debug;

use crate::fd_black_scholes_vanilla_engine::{OptionPayoff, STRIKE_DENSITY};
use crate::fd_grid_settings::FdGridSettings;

/// Finite-difference engine for vanilla options under Heston dynamics.
#[derive(Debug, Clone)]
pub struct FdHestonVanillaEngine {
    process: Arc<HestonProcess>,
    grid: FdGridSettings,
    scheme: FdmSchemeDesc,
}

impl FdHestonVanillaEngine {
    /// Engine with 100 time steps on a 100 × 50 mesh and the Hundsdorfer
    /// scheme.
    pub fn new(process: Arc<HestonProcess>) -> Self {
        Self {
            process,
            grid: FdGridSettings::heston(),
            scheme: FdmSchemeDesc::hundsdorfer(),
        }
    }

    /// Set the number of time steps, log-spot points and variance points.
    pub fn with_grid(mut self, t_grid: usize, x_grid: usize, v_grid: usize) -> Self {
        self.grid.t_grid = t_grid;
        self.grid.x_grid = x_grid;
        self.grid.v_grid = v_grid;
        self
    }

    /// Set the number of implicit Euler damping steps.
    pub fn with_damping_steps(mut self, damping_steps: usize) -> Self {
        self.grid.damping_steps = damping_steps;
        self
    }

    /// Replace all grid settings at once.
    pub fn with_grid_settings(mut self, grid: FdGridSettings) -> Self {
        self.grid = grid;
        self
    }

    /// Use a different time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmSchemeDesc) -> Self {
        self.scheme = scheme;
        self
    }

    /// The grid settings.
    pub fn grid(&self) -> &FdGridSettings {
        &self.grid
    }

    /// Build the solver for `args` without running it.
    pub fn solver(&self, args: &VanillaOptionArguments) -> Result<FdmHestonSolver> {
        let maturity = args.exercise.last_time();
        let strike = args.payoff.strike();

        let v_mesher = FdmHestonVarianceMesher::new(self.grid.v_grid, &self.process, maturity, 1e-4)?;
        let vol_estimate = v_mesher.vol_estimate();
        let equity = GeneralizedBlackScholesProcess::new(
            self.process.spot(),
            self.process.risk_free_rate_arc(),
            self.process.dividend_yield_arc(),
            Arc::new(BlackConstantVol::new(vol_estimate)),
        )?;
        let params = FdmBlackScholesMesherParams {
            scale_factor: 2.0,
            concentration: Some((strike, STRIKE_DENSITY)),
            ..FdmBlackScholesMesherParams::default()
        };
        let x_mesher = black_scholes_mesher(
            self.grid.x_grid,
            &equity,
            maturity,
            strike,
            &args.dividends,
            &params,
        )?;
        let mesher = Arc::new(FdmMesherComposite::new(vec![
            Arc::new(x_mesher),
            Arc::new(v_mesher.into_mesher()),
        ])?);
        debug!(
            t_grid = self.grid.t_grid,
            x_grid = self.grid.x_grid,
            v_grid = self.grid.v_grid,
            damping_steps = self.grid.damping_steps,
            vol_estimate,
            "heston vanilla mesh"
        );

        let calculator: Arc<dyn FdmInnerValueCalculator> = Arc::new(FdmLogInnerValue::new(
            Arc::new(OptionPayoff(Arc::clone(&args.payoff))),
            Arc::clone(&mesher),
            0,
        ));
        let condition = FdmStepConditionComposite::vanilla(
            &args.dividends,
            &args.exercise,
            Arc::clone(&mesher),
            Arc::clone(&calculator),
            0,
        )?;

        let desc = FdmSolverDesc {
            mesher,
            bc_set: FdmBoundaryConditionSet::empty(),
            condition,
            calculator,
            maturity,
            time_steps: self.grid.t_grid,
            damping_steps: self.grid.damping_steps,
        };
        FdmHestonSolver::new(desc, &self.process, self.scheme)
    }
}

impl PricingEngine<VanillaOptionArguments> for FdHestonVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let solver = self.solver(args)?;
        let (spot, v0) = (self.process.spot(), self.process.v0());
        Ok(PricingResults::from_npv(solver.value_at(spot, v0)?)
            .with_result("delta", solver.delta_at(spot, v0)?)
            .with_result("gamma", solver.gamma_at(spot, v0)?)
            .with_result("theta", solver.theta_at(spot, v0)?)
            .with_result("mean_variance_delta", solver.mean_variance_delta_at(spot, v0)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_heston_engine::AnalyticHestonEngine;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{Exercise, OptionType, PlainVanillaPayoff, VanillaOption};
    use ql_termstructures::FlatForward;

    fn process() -> Arc<HestonProcess> {
        Arc::new(
            HestonProcess::new(
                Arc::new(FlatForward::new(0.05)),
                Arc::new(FlatForward::new(0.02)),
                100.0,
                0.04,
                1.5,
                0.04,
                0.3,
                -0.5,
            )
            .unwrap(),
        )
    }

    #[test]
    fn european_call_matches_semi_analytic_price() {
        let p = process();
        let option = VanillaOption::european(OptionType::Call, 100.0, 1.0).unwrap();
        let fd = option
            .price(&FdHestonVanillaEngine::new(Arc::clone(&p)).with_grid(50, 100, 40))
            .unwrap();
        let reference = option.price(&AnalyticHestonEngine::new(p)).unwrap().npv;
        assert_abs_diff_eq!(fd.npv, reference, epsilon = 0.1);
        let delta = fd.delta().unwrap();
        assert!(delta > 0.4 && delta < 0.8, "delta = {delta}");
    }

    #[test]
    fn american_put_dominates_european() {
        let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0));
        let engine = FdHestonVanillaEngine::new(process()).with_grid(50, 60, 30);
        let american = VanillaOption::new(payoff.clone(), Exercise::american(0.0, 1.0).unwrap())
            .price(&engine)
            .unwrap()
            .npv;
        let european = VanillaOption::new(payoff, Exercise::european(1.0).unwrap())
            .price(&engine)
            .unwrap()
            .npv;
        assert!(american > european, "american {american}, european {european}");
    }
}
