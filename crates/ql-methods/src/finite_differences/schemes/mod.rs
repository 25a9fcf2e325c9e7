//! Time-stepping schemes.
//!
//! Every scheme advances the solution one step backwards, from `t` to
//! `t − dt`, for the equation `∂V/∂t + L V = 0`. The operator and the
//! boundary conditions are borrowed per step through a [`SchemeContext`],
//! so the same operator can serve a damping scheme and the main scheme of
//! one rollback.

mod craig_sneyd;
mod crank_nicolson;
mod douglas;
mod explicit_euler;
mod hundsdorfer;
mod implicit_euler;
mod modified_craig_sneyd;
mod tr_bdf2;

pub use craig_sneyd::CraigSneydScheme;
pub use crank_nicolson::CrankNicolsonScheme;
pub use douglas::DouglasScheme;
pub use explicit_euler::ExplicitEulerScheme;
pub use hundsdorfer::HundsdorferScheme;
pub use implicit_euler::ImplicitEulerScheme;
pub use modified_craig_sneyd::ModifiedCraigSneydScheme;
pub use tr_bdf2::TrBdf2Scheme;

use std::fmt;

use ql_core::{ensure_config, errors::Result, Real, Size, Time};
use ql_math::{Array, BiCGStab};
use tracing::trace;

use crate::finite_differences::boundary::FdmBoundaryConditionSet;
use crate::finite_differences::operators::FdmLinearOpComposite;

/// Operator and boundary conditions a scheme works on during one step.
pub struct SchemeContext<'a> {
    /// Spatial operator.
    pub op: &'a mut dyn FdmLinearOpComposite,
    /// Boundary conditions.
    pub bc_set: &'a mut FdmBoundaryConditionSet,
}

impl fmt::Debug for SchemeContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeContext")
            .field("directions", &self.op.size())
            .field("bc_set", &self.bc_set)
            .finish()
    }
}

impl SchemeContext<'_> {
    /// Evaluate operator and boundary data for the step `[max(0, t − dt), t]`.
    pub(crate) fn prepare(&mut self, t: Time, dt: Time) -> Result<()> {
        let t1 = (t - dt).max(0.0);
        self.op.set_time(t1, t)?;
        self.bc_set.set_time(t1);
        Ok(())
    }

    /// `a + w·L a`, with the boundary hooks around the action.
    pub(crate) fn explicit_action(&mut self, a: &Array, w: Real) -> Result<Array> {
        self.bc_set.apply_before_applying(&mut *self.op);
        let mut y = a + &(&self.op.apply(a)? * w);
        self.bc_set.apply_after_applying(&mut y);
        Ok(y)
    }

    /// `L x` with the boundary rows cleared.
    pub(crate) fn action(&mut self, x: &Array) -> Result<Array> {
        self.bc_set.apply_before_applying(&mut *self.op);
        self.op.apply(x)
    }

    /// Solve `(I − w·L) x = rhs`, with the boundary hooks around the solve.
    /// `tolerance` is the relative residual of the iterative solver.
    pub(crate) fn implicit_solve(&mut self, rhs: &Array, w: Real, tolerance: Real) -> Result<Array> {
        let mut rhs = rhs.clone();
        self.bc_set.apply_before_solving(&mut *self.op, &mut rhs, w, None);
        let mut x = solve_full(&*self.op, &rhs, w, tolerance)?;
        self.bc_set.apply_after_solving(&mut x);
        Ok(x)
    }

    /// Per-direction corrector sweep of the ADI schemes:
    /// `y ← (I − w·L_i)⁻¹ (y − w·L_i r)` for every direction `i`.
    pub(crate) fn directional_sweep(&mut self, mut y: Array, r: &Array, w: Real) -> Result<Array> {
        for i in 0..self.op.size() {
            self.bc_set.apply_before_applying(&mut *self.op);
            let mut rhs = &y - &(&self.op.apply_direction(i, r)? * w);
            self.bc_set.apply_before_solving(&mut *self.op, &mut rhs, w, Some(i));
            y = self.op.solve_splitting(i, &rhs, w)?;
        }
        self.bc_set.apply_after_solving(&mut y);
        Ok(y)
    }
}

const BICGSTAB_MAX_ITERATIONS: Size = 1000;

/// Default relative residual of the BiCGStab solves.
pub const DEFAULT_SOLVER_TOLERANCE: Real = 1e-8;

/// Solve `(I − w·L) x = rhs` on the full operator: a direct tridiagonal solve
/// in one dimension, preconditioned BiCGStab to `tolerance` otherwise.
pub(crate) fn solve_full(
    op: &dyn FdmLinearOpComposite,
    rhs: &Array,
    w: Real,
    tolerance: Real,
) -> Result<Array> {
    if op.size() == 1 {
        return op.solve_splitting(0, rhs, w);
    }
    let result = BiCGStab::new(BICGSTAB_MAX_ITERATIONS, tolerance).solve(
        |x| Ok(x - &(&op.apply(x)? * w)),
        |x| op.preconditioner(x, w),
        rhs,
        rhs,
    )?;
    trace!(iterations = result.iterations, error = result.error, "bicgstab converged");
    Ok(result.x)
}

/// A backward time-stepping scheme.
pub trait FdmScheme: fmt::Debug + Send {
    /// Set the step length used by [`FdmScheme::step`].
    fn set_step(&mut self, dt: Time);

    /// Advance `a` from `t` to `t − dt`.
    fn step(&mut self, ctx: &mut SchemeContext<'_>, a: &mut Array, t: Time) -> Result<()>;
}

// ── Scheme selection ─────────────────────────────────────────────────────────

/// Available schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmSchemeType {
    /// Douglas ADI.
    Douglas,
    /// Craig-Sneyd ADI.
    CraigSneyd,
    /// Modified Craig-Sneyd ADI.
    ModifiedCraigSneyd,
    /// Hundsdorfer-Verwer ADI.
    Hundsdorfer,
    /// Hundsdorfer-Verwer with a more damping `θ`.
    ModifiedHundsdorfer,
    /// Forward Euler.
    ExplicitEuler,
    /// Backward Euler.
    ImplicitEuler,
    /// θ-weighted mix of explicit and implicit Euler.
    CrankNicolson,
    /// Trapezoidal step followed by a BDF2 step.
    TrBdf2,
}

/// Scheme type with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdmSchemeDesc {
    /// Scheme variant.
    pub scheme_type: FdmSchemeType,
    /// Implicitness weight; for TR-BDF2 the trapezoidal fraction `α`.
    pub theta: Real,
    /// Weight of the corrector terms of the ADI schemes; for TR-BDF2 the
    /// relative tolerance of the BiCGStab solve (`0` selects
    /// [`DEFAULT_SOLVER_TOLERANCE`]).
    pub mu: Real,
}

impl FdmSchemeDesc {
    /// Descriptor with explicit parameters.
    pub fn new(scheme_type: FdmSchemeType, theta: Real, mu: Real) -> Self {
        Self {
            scheme_type,
            theta,
            mu,
        }
    }

    /// Douglas, `θ = ½`; equal to Crank-Nicolson in one dimension.
    pub fn douglas() -> Self {
        Self::new(FdmSchemeType::Douglas, 0.5, 0.0)
    }

    /// Backward Euler.
    pub fn implicit_euler() -> Self {
        Self::new(FdmSchemeType::ImplicitEuler, 0.0, 0.0)
    }

    /// Forward Euler.
    pub fn explicit_euler() -> Self {
        Self::new(FdmSchemeType::ExplicitEuler, 0.0, 0.0)
    }

    /// Crank-Nicolson, `θ = ½`.
    pub fn crank_nicolson() -> Self {
        Self::new(FdmSchemeType::CrankNicolson, 0.5, 0.0)
    }

    /// Craig-Sneyd, `θ = μ = ½`.
    pub fn craig_sneyd() -> Self {
        Self::new(FdmSchemeType::CraigSneyd, 0.5, 0.5)
    }

    /// Modified Craig-Sneyd, `θ = μ = ⅓`.
    pub fn modified_craig_sneyd() -> Self {
        Self::new(FdmSchemeType::ModifiedCraigSneyd, 1.0 / 3.0, 1.0 / 3.0)
    }

    /// Hundsdorfer-Verwer, `θ = ½ + √3/6`, `μ = ½`.
    pub fn hundsdorfer() -> Self {
        Self::new(FdmSchemeType::Hundsdorfer, 0.5 + 3.0_f64.sqrt() / 6.0, 0.5)
    }

    /// Hundsdorfer-Verwer, `θ = 1 − √2/2`, `μ = ½`.
    pub fn modified_hundsdorfer() -> Self {
        Self::new(
            FdmSchemeType::ModifiedHundsdorfer,
            1.0 - 2.0_f64.sqrt() / 2.0,
            0.5,
        )
    }

    /// TR-BDF2 with `α = 2 − √2`.
    pub fn tr_bdf2() -> Self {
        Self::new(FdmSchemeType::TrBdf2, 2.0 - 2.0_f64.sqrt(), DEFAULT_SOLVER_TOLERANCE)
    }

    /// Instantiate the scheme.
    pub fn build(&self) -> Result<Box<dyn FdmScheme>> {
        ensure_config!(
            (0.0..=1.0).contains(&self.theta),
            "theta ({}) must be in [0, 1]",
            self.theta
        );
        ensure_config!(self.mu >= 0.0, "mu ({}) must be non-negative", self.mu);
        let (theta, mu) = (self.theta, self.mu);
        Ok(match self.scheme_type {
            FdmSchemeType::Douglas => Box::new(DouglasScheme::new(theta)),
            FdmSchemeType::CraigSneyd => Box::new(CraigSneydScheme::new(theta, mu)),
            FdmSchemeType::ModifiedCraigSneyd => Box::new(ModifiedCraigSneydScheme::new(theta, mu)),
            FdmSchemeType::Hundsdorfer | FdmSchemeType::ModifiedHundsdorfer => {
                Box::new(HundsdorferScheme::new(theta, mu))
            }
            FdmSchemeType::ExplicitEuler => Box::new(ExplicitEulerScheme::new()),
            FdmSchemeType::ImplicitEuler => Box::new(ImplicitEulerScheme::new()),
            FdmSchemeType::CrankNicolson => Box::new(CrankNicolsonScheme::new(theta)),
            FdmSchemeType::TrBdf2 => {
                ensure_config!(
                    theta > 0.0 && theta < 1.0,
                    "TR-BDF2 fraction ({theta}) must be in (0, 1)"
                );
                let tolerance = if mu > 0.0 { mu } else { DEFAULT_SOLVER_TOLERANCE };
                Box::new(TrBdf2Scheme::new(theta).with_tolerance(tolerance))
            }
        })
    }
}

impl Default for FdmSchemeDesc {
    fn default() -> Self {
        Self::douglas()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Heat equation `∂V/∂t + V_xx = 0` on `[0, 1]`. With zero Dirichlet
    //! boundaries `sin(πx)` decays by `exp(−π²τ)` over a rollback of `τ`;
    //! with zero-flux Neumann boundaries `cos(πx)` decays at the same rate.

    use std::sync::Arc;

    use ql_core::{Real, Size};
    use ql_math::Array;
    use ql_termstructures::FlatForward;

    use super::{FdmScheme, SchemeContext};
    use crate::finite_differences::boundary::{FdmBoundaryCondition, FdmBoundaryConditionSet, Side};
    use crate::finite_differences::meshers::{Fdm1dMesher, FdmMesherComposite};
    use crate::finite_differences::operators::{
        FdmLinearOpComposite, FdmWienerOp, NinePointLinearOp, SecondDerivativeOp,
        SecondOrderMixedDerivativeOp, TripleBandLinearOp,
    };

    pub struct HeatProblem {
        pub mesher: Arc<FdmMesherComposite>,
        pub op: FdmWienerOp,
        pub bc_set: FdmBoundaryConditionSet,
        zero_flux: bool,
    }

    impl HeatProblem {
        pub fn new(points: Size) -> Self {
            let mesher = Arc::new(
                FdmMesherComposite::from_1d(Fdm1dMesher::uniform(0.0, 1.0, points).unwrap())
                    .unwrap(),
            );
            let op = FdmWienerOp::new(
                Arc::clone(&mesher),
                2.0_f64.sqrt(),
                Arc::new(FlatForward::new(0.0)),
                0,
            )
            .unwrap();
            let bc_set = FdmBoundaryConditionSet::new(vec![
                FdmBoundaryCondition::dirichlet(&mesher, 0.0, 0, Side::Lower).unwrap(),
                FdmBoundaryCondition::dirichlet(&mesher, 0.0, 0, Side::Upper).unwrap(),
            ])
            .unwrap();
            Self { mesher, op, bc_set, zero_flux: false }
        }

        pub fn zero_flux(points: Size) -> Self {
            let mut problem = Self::new(points);
            problem.bc_set = FdmBoundaryConditionSet::new(vec![
                FdmBoundaryCondition::neumann(&problem.mesher, 0.0, 0, Side::Lower).unwrap(),
                FdmBoundaryCondition::neumann(&problem.mesher, 0.0, 0, Side::Upper).unwrap(),
            ])
            .unwrap();
            problem.zero_flux = true;
            problem
        }

        pub fn initial(&self) -> Array {
            let pi = std::f64::consts::PI;
            if self.zero_flux {
                self.mesher.locations(0).map(|x| (pi * x).cos())
            } else {
                self.mesher.locations(0).map(|x| (pi * x).sin())
            }
        }

        pub fn exact(&self, tau: Real) -> Array {
            let decay = (-std::f64::consts::PI.powi(2) * tau).exp();
            &self.initial() * decay
        }

        /// Roll back `steps` steps of length `tau/steps`; returns the max error.
        pub fn run(&mut self, scheme: &mut dyn FdmScheme, tau: Real, steps: Size) -> ql_core::Result<Real> {
            let dt = tau / steps as Real;
            let mut a = self.initial();
            scheme.set_step(dt);
            for k in 0..steps {
                let t = tau - k as Real * dt;
                let mut ctx = SchemeContext {
                    op: &mut self.op as &mut dyn FdmLinearOpComposite,
                    bc_set: &mut self.bc_set,
                };
                scheme.step(&mut ctx, &mut a, t)?;
            }
            if !a.is_finite() {
                return Ok(Real::INFINITY);
            }
            let exact = self.exact(tau);
            Ok((&a - &exact).iter().fold(0.0, |m, e| m.max(e.abs())))
        }
    }

    /// `L = ∂xx + ∂yy + ρ ∂xy` on the unit square.
    #[derive(Debug, Clone)]
    pub struct Heat2dOp {
        dxx: TripleBandLinearOp,
        dyy: TripleBandLinearOp,
        dxy: NinePointLinearOp,
        map_x: TripleBandLinearOp,
        map_y: TripleBandLinearOp,
        map_xy: NinePointLinearOp,
    }

    impl Heat2dOp {
        pub fn new(mesher: &Arc<FdmMesherComposite>, rho: Real) -> Self {
            let dxx = SecondDerivativeOp::new(0, Arc::clone(mesher)).unwrap().into_inner();
            let dyy = SecondDerivativeOp::new(1, Arc::clone(mesher)).unwrap().into_inner();
            let dxy = SecondOrderMixedDerivativeOp::new(0, 1, Arc::clone(mesher))
                .unwrap()
                .into_inner()
                .mult(&Array::from_element(mesher.size(), rho))
                .unwrap();
            Self {
                map_x: dxx.clone(),
                map_y: dyy.clone(),
                map_xy: dxy.clone(),
                dxx,
                dyy,
                dxy,
            }
        }
    }

    impl FdmLinearOpComposite for Heat2dOp {
        fn size(&self) -> Size {
            2
        }

        fn set_time(&mut self, _t1: Real, _t2: Real) -> ql_core::Result<()> {
            self.map_x = self.dxx.clone();
            self.map_y = self.dyy.clone();
            self.map_xy = self.dxy.clone();
            Ok(())
        }

        fn apply(&self, r: &Array) -> ql_core::Result<Array> {
            let x = self.map_x.apply(r)?;
            let y = self.map_y.apply(r)?;
            let xy = self.map_xy.apply(r)?;
            Ok(&(&x + &y) + &xy)
        }

        fn apply_mixed(&self, r: &Array) -> ql_core::Result<Array> {
            self.map_xy.apply(r)
        }

        fn apply_direction(&self, direction: Size, r: &Array) -> ql_core::Result<Array> {
            match direction {
                0 => self.map_x.apply(r),
                _ => self.map_y.apply(r),
            }
        }

        fn solve_splitting(&self, direction: Size, r: &Array, a: Real) -> ql_core::Result<Array> {
            match direction {
                0 => self.map_x.solve_splitting(r, -a, 1.0),
                _ => self.map_y.solve_splitting(r, -a, 1.0),
            }
        }

        fn preconditioner(&self, r: &Array, a: Real) -> ql_core::Result<Array> {
            self.solve_splitting(1, &self.solve_splitting(0, r, a)?, a)
        }

        fn clear_rows(&mut self, rows: &[Size]) {
            self.map_x.clear_rows(rows);
            self.map_y.clear_rows(rows);
            self.map_xy.clear_rows(rows);
        }

        fn couple_edge_rows(&mut self, direction: Size, rows: &[Size], coefficient: Real) {
            self.clear_rows(rows);
            match direction {
                0 => self.map_x.couple_edge_rows(rows, coefficient),
                _ => self.map_y.couple_edge_rows(rows, coefficient),
            }
        }
    }

    pub struct Heat2dProblem {
        pub mesher: Arc<FdmMesherComposite>,
        pub op: Heat2dOp,
        pub bc_set: FdmBoundaryConditionSet,
    }

    impl Heat2dProblem {
        pub fn new(points: Size, rho: Real) -> Self {
            let axis = || Arc::new(Fdm1dMesher::uniform(0.0, 1.0, points).unwrap());
            let mesher = Arc::new(FdmMesherComposite::new(vec![axis(), axis()]).unwrap());
            let op = Heat2dOp::new(&mesher, rho);
            let mut bc_set = FdmBoundaryConditionSet::empty();
            for direction in 0..2 {
                for side in [Side::Lower, Side::Upper] {
                    bc_set
                        .push(FdmBoundaryCondition::dirichlet(&mesher, 0.0, direction, side).unwrap())
                        .unwrap();
                }
            }
            Self { mesher, op, bc_set }
        }

        pub fn initial(&self) -> Array {
            let pi = std::f64::consts::PI;
            Array::from_fn(self.mesher.size(), |i| {
                (pi * self.mesher.location(i, 0)).sin() * (pi * self.mesher.location(i, 1)).sin()
            })
        }

        pub fn roll_back(&mut self, scheme: &mut dyn FdmScheme, tau: Real, steps: Size) -> ql_core::Result<Array> {
            let dt = tau / steps as Real;
            let mut a = self.initial();
            scheme.set_step(dt);
            for k in 0..steps {
                let mut ctx = SchemeContext { op: &mut self.op, bc_set: &mut self.bc_set };
                scheme.step(&mut ctx, &mut a, tau - k as Real * dt)?;
            }
            Ok(a)
        }
    }

    pub fn max_abs_diff(a: &Array, b: &Array) -> Real {
        (a - b).iter().fold(0.0, |m, e| if e.is_nan() { Real::INFINITY } else { m.max(e.abs()) })
    }
}
