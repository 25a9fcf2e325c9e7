//! Finite-difference Black-Scholes engine for vanilla options.
//!
//! European, American and Bermudan exercise are supported, with or without
//! discrete cash dividends. The problem is solved in log-spot on a mesh
//! concentrated around the strike; the results are the NPV and the spot
//! Greeks at today's spot.

use std::sync::Arc;

use ql_core::{errors::Result, Real};
use ql_instruments::{Payoff, PricingEngine, PricingResults, StrikedPayoff, VanillaOptionArguments};
use ql_methods::finite_differences::{
    meshers::{black_scholes_mesher, FdmBlackScholesMesherParams},
    FdmBlackScholesSolver, FdmBoundaryConditionSet, FdmInnerValueCalculator, FdmLogInnerValue,
    FdmMesherComposite, FdmSchemeDesc, FdmSolverDesc, FdmStepConditionComposite,
};
use ql_processes::GeneralizedBlackScholesProcess;
use tracing::debug;

use crate::fd_grid_settings::FdGridSettings;

/// Relative node density around the strike.
pub(crate) const STRIKE_DENSITY: Real = 0.1;

/// Exposes a striked payoff to the inner-value calculators.
#[derive(Debug)]
pub(crate) struct OptionPayoff(pub(crate) Arc<dyn StrikedPayoff>);

impl Payoff for OptionPayoff {
    fn value(&self, price: Real) -> Real {
        self.0.value(price)
    }

    fn name(&self) -> &str {
        self.0.name()
    }
}

/// Finite-difference engine for vanilla options under Black-Scholes.
#[derive(Debug, Clone)]
pub struct FdBlackScholesVanillaEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
    grid: FdGridSettings,
    scheme: FdmSchemeDesc,
}

impl FdBlackScholesVanillaEngine {
    /// Engine with 100 time steps, 100 spatial points, no damping and the
    /// Douglas scheme.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self {
            process,
            grid: FdGridSettings::black_scholes(),
            scheme: FdmSchemeDesc::douglas(),
        }
    }

    /// Set the number of time steps and log-spot points.
    pub fn with_grid(mut self, t_grid: usize, x_grid: usize) -> Self {
        self.grid.t_grid = t_grid;
        self.grid.x_grid = x_grid;
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
    pub fn solver(&self, args: &VanillaOptionArguments) -> Result<FdmBlackScholesSolver> {
        let maturity = args.exercise.last_time();
        let strike = args.payoff.strike();

        let params = FdmBlackScholesMesherParams {
            concentration: Some((strike, STRIKE_DENSITY)),
            ..FdmBlackScholesMesherParams::default()
        };
        let x_mesher = black_scholes_mesher(
            self.grid.x_grid,
            &self.process,
            maturity,
            strike,
            &args.dividends,
            &params,
        )?;
        let mesher = Arc::new(FdmMesherComposite::from_1d(x_mesher)?);
        debug!(
            t_grid = self.grid.t_grid,
            x_grid = self.grid.x_grid,
            damping_steps = self.grid.damping_steps,
            maturity,
            "black-scholes vanilla mesh"
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
        FdmBlackScholesSolver::new(desc, &self.process, strike, self.scheme)
    }
}

impl PricingEngine<VanillaOptionArguments> for FdBlackScholesVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let solver = self.solver(args)?;
        let spot = self.process.spot();
        Ok(PricingResults::from_npv(solver.value_at(spot)?)
            .with_result("delta", solver.delta_at(spot)?)
            .with_result("gamma", solver.gamma_at(spot)?)
            .with_result("theta", solver.theta_at(spot)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::AnalyticEuropeanEngine;
    use approx::assert_abs_diff_eq;
    use ql_instruments::{Dividend, Exercise, OptionType, PlainVanillaPayoff, VanillaOption};
    use ql_termstructures::{BlackConstantVol, FlatForward};

    fn process(spot: Real) -> Arc<GeneralizedBlackScholesProcess> {
        Arc::new(
            GeneralizedBlackScholesProcess::new(
                spot,
                Arc::new(FlatForward::new(0.06)),
                Arc::new(FlatForward::new(0.0)),
                Arc::new(BlackConstantVol::new(0.2)),
            )
            .unwrap(),
        )
    }

    #[test]
    fn european_put_matches_closed_form() {
        let p = process(36.0);
        let option = VanillaOption::european(OptionType::Put, 40.0, 1.0).unwrap();
        let fd = option
            .price(&FdBlackScholesVanillaEngine::new(Arc::clone(&p)).with_grid(200, 200))
            .unwrap();
        let exact = option.price(&AnalyticEuropeanEngine::new(p)).unwrap();

        assert_abs_diff_eq!(fd.npv, exact.npv, epsilon = 1e-2);
        assert_abs_diff_eq!(fd.delta().unwrap(), exact.delta().unwrap(), epsilon = 5e-3);
        assert_abs_diff_eq!(fd.gamma().unwrap(), exact.gamma().unwrap(), epsilon = 5e-3);
        assert_abs_diff_eq!(fd.theta().unwrap(), exact.theta().unwrap(), epsilon = 2e-2);
    }

    #[test]
    fn american_put_carries_early_exercise_premium() {
        let p = process(36.0);
        let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Put, 40.0));
        let engine = FdBlackScholesVanillaEngine::new(p).with_grid(200, 200);
        let american = VanillaOption::new(payoff.clone(), Exercise::american(0.0, 1.0).unwrap())
            .price(&engine)
            .unwrap();
        let european = VanillaOption::new(payoff, Exercise::european(1.0).unwrap())
            .price(&engine)
            .unwrap();
        assert!(american.npv > european.npv + 0.3);
        assert!(american.npv >= 4.0 - 1e-8);
    }

    #[test]
    fn dividend_lowers_the_call() {
        let p = process(100.0);
        let engine = FdBlackScholesVanillaEngine::new(p);
        let plain = VanillaOption::european(OptionType::Call, 100.0, 1.0).unwrap();
        let with_dividend = plain
            .clone()
            .with_dividends(vec![Dividend::new(0.5, 3.0).unwrap()]);
        let a = plain.price(&engine).unwrap().npv;
        let b = with_dividend.price(&engine).unwrap().npv;
        assert!(b < a - 1.0, "with dividend {b}, without {a}");
    }

    #[test]
    fn bad_grid_is_a_configuration_error() {
        let engine = FdBlackScholesVanillaEngine::new(process(36.0)).with_grid(0, 100);
        let option = VanillaOption::european(OptionType::Put, 40.0, 1.0).unwrap();
        assert!(option.price(&engine).unwrap_err().is_configuration());
    }
}
