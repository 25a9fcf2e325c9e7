//! Finite-difference engine for a simple storage facility.
//!
//! The facility is valued on a (volume, log-price) mesh. The log-price
//! follows either a Black-Scholes process or a mean-reverting
//! Ornstein-Uhlenbeck process; at every decision time the holder injects,
//! withdraws or holds, which [`FdmSimpleStorageCondition`] applies as a step
//! condition. Nothing is paid at maturity, so the terminal value is zero.
//!
//! Under Black-Scholes dynamics with `q ≥ 0` the discounted price is a
//! supermartingale and the facility is worth exactly its static sell-out
//! schedule; trading value comes from mean reversion.

use std::sync::Arc;

use ql_core::{ensure_config, errors::Result, Real};
use ql_instruments::{PricingEngine, PricingResults, VanillaStorageArguments};
use ql_methods::finite_differences::{
    meshers::{black_scholes_mesher, FdmBlackScholesMesherParams},
    operators::{FdmBlackScholesOp, FdmDiffusionOp, FdmLinearOpComposite},
    step_conditions::FdmSimpleStorageCondition,
    Fdm1dMesher, Fdm2DimSolver, FdmBoundaryConditionSet, FdmMesherComposite, FdmSchemeDesc,
    FdmSolverDesc, FdmStepConditionComposite, FdmZeroInnerValue, StepCondition,
};
use ql_processes::{GeneralizedBlackScholesProcess, OrnsteinUhlenbeckProcess, StochasticProcess1D};
use ql_termstructures::YieldTermStructure;
use tracing::debug;

use crate::fd_grid_settings::FdGridSettings;

/// Standard deviations of the log-price covered by the mean-reverting mesh.
const OU_MESH_WIDTH: Real = 4.0;

#[derive(Debug, Clone)]
enum PriceModel {
    BlackScholes(Arc<GeneralizedBlackScholesProcess>),
    MeanReverting {
        process: Arc<OrnsteinUhlenbeckProcess>,
        risk_free: Arc<dyn YieldTermStructure>,
    },
}

/// Finite-difference engine for [`VanillaStorageArguments`].
#[derive(Debug, Clone)]
pub struct FdSimpleStorageEngine {
    model: PriceModel,
    grid: FdGridSettings,
    scheme: FdmSchemeDesc,
}

impl FdSimpleStorageEngine {
    /// Engine with 50 time steps, 100 price points, 50 volume points and
    /// the Douglas scheme.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self {
            model: PriceModel::BlackScholes(process),
            grid: FdGridSettings::storage(),
            scheme: FdmSchemeDesc::douglas(),
        }
    }

    /// Engine for a log-price `process` reverting to its level, discounted
    /// on `risk_free`.
    pub fn mean_reverting(
        process: Arc<OrnsteinUhlenbeckProcess>,
        risk_free: Arc<dyn YieldTermStructure>,
    ) -> Self {
        Self {
            model: PriceModel::MeanReverting { process, risk_free },
            grid: FdGridSettings::storage(),
            scheme: FdmSchemeDesc::douglas(),
        }
    }

    /// Set the number of time steps, log-price points and volume points.
    pub fn with_grid(mut self, t_grid: usize, x_grid: usize, volume_grid: usize) -> Self {
        self.grid.t_grid = t_grid;
        self.grid.x_grid = x_grid;
        self.grid.v_grid = volume_grid;
        self
    }

    /// Use a different time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmSchemeDesc) -> Self {
        self.scheme = scheme;
        self
    }

    /// Log-price of today.
    fn x0(&self) -> Real {
        match &self.model {
            PriceModel::BlackScholes(process) => process.spot().ln(),
            PriceModel::MeanReverting { process, .. } => process.x0(),
        }
    }

    fn price_mesher(&self, maturity: Real) -> Result<Fdm1dMesher> {
        match &self.model {
            PriceModel::BlackScholes(process) => {
                let spot = process.spot();
                let params = FdmBlackScholesMesherParams {
                    concentration: Some((spot, 0.1)),
                    ..FdmBlackScholesMesherParams::default()
                };
                black_scholes_mesher(self.grid.x_grid, process, maturity, spot, &[], &params)
            }
            PriceModel::MeanReverting { process, .. } => {
                let x0 = process.x0();
                let mean = process.expectation(0.0, x0, maturity);
                let sd = process.variance(0.0, x0, maturity).sqrt();
                ensure_config!(
                    sd > 0.0,
                    "mean-reverting price needs a positive variance up to maturity"
                );
                Fdm1dMesher::uniform(
                    x0.min(mean) - OU_MESH_WIDTH * sd,
                    x0.max(mean) + OU_MESH_WIDTH * sd,
                    self.grid.x_grid,
                )
            }
        }
    }

    fn operator(&self, mesher: &Arc<FdmMesherComposite>) -> Result<Box<dyn FdmLinearOpComposite>> {
        Ok(match &self.model {
            PriceModel::BlackScholes(process) => Box::new(FdmBlackScholesOp::new(
                Arc::clone(mesher),
                process,
                process.spot(),
                1,
            )?),
            PriceModel::MeanReverting { process, risk_free } => Box::new(FdmDiffusionOp::new(
                Arc::clone(mesher),
                Arc::clone(process),
                Arc::clone(risk_free),
                1,
            )?),
        })
    }

    fn solver(&self, args: &VanillaStorageArguments) -> Result<Fdm2DimSolver> {
        let maturity = args.exercise.last_time();

        let volume = Fdm1dMesher::uniform(0.0, args.capacity, self.grid.v_grid)?;
        let price = self.price_mesher(maturity)?;
        let mesher = Arc::new(FdmMesherComposite::new(vec![Arc::new(volume), Arc::new(price)])?);
        debug!(
            t_grid = self.grid.t_grid,
            x_grid = self.grid.x_grid,
            volume_grid = self.grid.v_grid,
            decisions = args.exercise.times().len(),
            "storage mesh"
        );

        let storage: Arc<dyn StepCondition> = Arc::new(FdmSimpleStorageCondition::new(
            args.exercise.times().to_vec(),
            Arc::clone(&mesher),
            args.change_rate,
        )?);
        let op = self.operator(&mesher)?;

        let desc = FdmSolverDesc {
            mesher,
            bc_set: FdmBoundaryConditionSet::empty(),
            condition: FdmStepConditionComposite::new(vec![storage]),
            calculator: Arc::new(FdmZeroInnerValue),
            maturity,
            time_steps: self.grid.t_grid,
            damping_steps: self.grid.damping_steps,
        };
        Fdm2DimSolver::new(desc, self.scheme, op)
    }
}

impl PricingEngine<VanillaStorageArguments> for FdSimpleStorageEngine {
    fn calculate(&self, args: &VanillaStorageArguments) -> Result<PricingResults> {
        let solver = self.solver(args)?;
        let npv = solver.interpolate_at(args.load, self.x0())?;
        Ok(PricingResults::from_npv(npv))
    }
}
