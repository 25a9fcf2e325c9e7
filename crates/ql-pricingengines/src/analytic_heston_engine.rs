//! Semi-analytic Heston engine for European options.
//!
//! The call price is $C = S e^{-qT} P_1 - K e^{-rT} P_2$ where
//!
//! $$P_j = \frac{1}{2} + \frac{1}{\pi} \int_0^\infty
//! \mathrm{Re}\left[\frac{e^{i\phi x} f_j(\phi)}{i\phi}\right] d\phi,
//! \qquad x = \ln(F/K)$$
//!
//! and `f_j` is the characteristic function in the "little trap" form of
//! Albrecher et al., which keeps the complex logarithm on its principal
//! branch. Puts follow from put-call parity.

use std::f64::consts::PI;
use std::sync::Arc;

use ql_core::{ensure, ensure_config, errors::Result, Real, Time};
use ql_instruments::{ExerciseType, OptionType, PricingEngine, PricingResults, VanillaOptionArguments};
use ql_math::{Integrator, SimpsonIntegral};
use ql_processes::HestonProcess;

/// Upper end of the truncated integration domain.
const PHI_MAX: Real = 500.0;

/// Variance parameters of the Heston model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonParameters {
    /// Initial variance.
    pub v0: Real,
    /// Mean-reversion speed.
    pub kappa: Real,
    /// Long-run variance.
    pub theta: Real,
    /// Volatility of variance.
    pub sigma: Real,
    /// Spot/variance correlation.
    pub rho: Real,
}

impl HestonParameters {
    /// Parameters of `process`.
    pub fn from_process(process: &HestonProcess) -> Self {
        Self {
            v0: process.v0(),
            kappa: process.kappa(),
            theta: process.theta(),
            sigma: process.sigma(),
            rho: process.rho(),
        }
    }
}

/// Semi-analytic Heston pricing engine.
#[derive(Debug)]
pub struct AnalyticHestonEngine {
    process: Arc<HestonProcess>,
    integrator: SimpsonIntegral,
}

impl AnalyticHestonEngine {
    /// Engine with absolute integration accuracy 1e-9.
    pub fn new(process: Arc<HestonProcess>) -> Self {
        Self {
            process,
            integrator: SimpsonIntegral::new(1e-9, 1_000_000),
        }
    }

    /// Override the Simpson integration accuracy and evaluation budget.
    pub fn with_integration(mut self, accuracy: Real, max_evaluations: usize) -> Self {
        self.integrator = SimpsonIntegral::new(accuracy, max_evaluations);
        self
    }
}

/// `f_j(φ)` without the forward term, as `(re, im)`.
fn characteristic_function(phi: Real, t: Time, p: &HestonParameters, j: usize) -> (Real, Real) {
    let (u, b) = if j == 1 {
        (0.5, p.kappa - p.rho * p.sigma)
    } else {
        (-0.5, p.kappa)
    };
    let sigma2 = p.sigma * p.sigma;

    // d² = (ρσiφ − b)² − σ²(2uiφ − φ²)
    let d2_re = b * b + sigma2 * phi * phi * (1.0 - p.rho * p.rho);
    let d2_im = -2.0 * p.sigma * phi * (b * p.rho + u * p.sigma);
    let (mut d_r, mut d_i) = complex_sqrt(d2_re, d2_im);
    if d_r < 0.0 {
        d_r = -d_r;
        d_i = -d_i;
    }

    // c = b − ρσiφ, g = (c − d)/(c + d)
    let (c_r, c_i) = (b, -p.rho * p.sigma * phi);
    let (cmd_r, cmd_i) = (c_r - d_r, c_i - d_i);
    let (g_r, g_i) = complex_div(cmd_r, cmd_i, c_r + d_r, c_i + d_i);

    // e^{−dT}
    let decay = (-d_r * t).exp();
    let (e_r, e_i) = (decay * (-d_i * t).cos(), decay * (-d_i * t).sin());

    // 1 − g e^{−dT}
    let (den_r, den_i) = (1.0 - (g_r * e_r - g_i * e_i), -(g_r * e_i + g_i * e_r));

    // D = (c − d)/σ² · (1 − e^{−dT}) / (1 − g e^{−dT})
    let (f_r, f_i) = complex_div(1.0 - e_r, -e_i, den_r, den_i);
    let big_d_r = (cmd_r * f_r - cmd_i * f_i) / sigma2;
    let big_d_i = (cmd_r * f_i + cmd_i * f_r) / sigma2;

    // C = κθ/σ² · [(c − d)T − 2 ln((1 − g e^{−dT}) / (1 − g))]
    let (l_r, l_i) = complex_div(den_r, den_i, 1.0 - g_r, -g_i);
    let (log_r, log_i) = complex_log(l_r, l_i);
    let scale = p.kappa * p.theta / sigma2;
    let big_c_r = scale * (cmd_r * t - 2.0 * log_r);
    let big_c_i = scale * (cmd_i * t - 2.0 * log_i);

    let (arg_r, arg_i) = (big_c_r + big_d_r * p.v0, big_c_i + big_d_i * p.v0);
    let magnitude = arg_r.exp();
    (magnitude * arg_i.cos(), magnitude * arg_i.sin())
}

fn probability(
    j: usize,
    log_moneyness: Real,
    t: Time,
    p: &HestonParameters,
    integrator: &SimpsonIntegral,
) -> Result<Real> {
    let integrand = |phi: Real| -> Real {
        if phi < 1e-12 {
            return 0.0;
        }
        let (cf_r, cf_i) = characteristic_function(phi, t, p, j);
        let (sin_px, cos_px) = (phi * log_moneyness).sin_cos();
        // Re[cf e^{iφx} / (iφ)] = Im[cf e^{iφx}] / φ
        (cf_r * sin_px + cf_i * cos_px) / phi
    };
    let integral = integrator.integrate(integrand, 1e-8, PHI_MAX)?;
    Ok(0.5 + integral / PI)
}

/// Price of a European option under the Heston model.
///
/// `r` and `q` are the continuously compounded zero rates to `t`.
#[allow(clippy::too_many_arguments)]
pub fn heston_price(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    t: Time,
    params: &HestonParameters,
    integrator: &SimpsonIntegral,
) -> Result<Real> {
    ensure!(spot > 0.0 && strike > 0.0, "spot ({spot}) and strike ({strike}) must be positive");
    ensure!(t > 0.0, "time to expiry ({t}) must be positive");
    ensure!(params.sigma > 0.0, "vol-of-vol ({}) must be positive", params.sigma);

    let x = spot.ln() + (r - q) * t - strike.ln();
    let p1 = probability(1, x, t, params, integrator)?;
    let p2 = probability(2, x, t, params, integrator)?;

    let df_q = (-q * t).exp();
    let df_r = (-r * t).exp();
    let call = spot * df_q * p1 - strike * df_r * p2;

    Ok(match option_type {
        OptionType::Call => call,
        OptionType::Put => call - spot * df_q + strike * df_r,
    })
}

impl PricingEngine<VanillaOptionArguments> for AnalyticHestonEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        ensure_config!(
            args.exercise.exercise_type() == ExerciseType::European,
            "analytic Heston engine needs European exercise, got {}",
            args.exercise
        );
        ensure_config!(
            args.dividends.is_empty(),
            "analytic Heston engine does not handle discrete dividends"
        );
        ensure_config!(
            args.payoff.name() == "Vanilla",
            "analytic Heston engine needs a plain vanilla payoff, got {}",
            args.payoff.name()
        );
        let t = args.exercise.last_time();
        let r = self.process.risk_free_rate().zero_rate(t);
        let q = self.process.dividend_yield().zero_rate(t);

        let price = heston_price(
            args.payoff.option_type(),
            self.process.spot(),
            args.payoff.strike(),
            r,
            q,
            t,
            &HestonParameters::from_process(&self.process),
            &self.integrator,
        )?;
        Ok(PricingResults::from_npv(price))
    }
}

// ─── Complex arithmetic on (re, im) pairs ───────────────────────────────────

fn complex_sqrt(re: Real, im: Real) -> (Real, Real) {
    let r = (re * re + im * im).sqrt().sqrt();
    let arg = im.atan2(re) / 2.0;
    (r * arg.cos(), r * arg.sin())
}

fn complex_div(a_r: Real, a_i: Real, b_r: Real, b_i: Real) -> (Real, Real) {
    let denom = b_r * b_r + b_i * b_i;
    if denom < 1e-300 {
        return (0.0, 0.0);
    }
    (
        (a_r * b_r + a_i * b_i) / denom,
        (a_i * b_r - a_r * b_i) / denom,
    )
}

fn complex_log(re: Real, im: Real) -> (Real, Real) {
    ((re * re + im * im).sqrt().ln(), im.atan2(re))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use approx::assert_abs_diff_eq;
    use ql_instruments::VanillaOption;
    use ql_termstructures::FlatForward;

    fn integrator() -> SimpsonIntegral {
        SimpsonIntegral::new(1e-9, 1_000_000)
    }

    #[test]
    fn close_to_black_scholes_for_small_vol_of_vol() {
        // κ large and θ = v0: variance barely moves from v0
        let params = HestonParameters {
            v0: 0.04,
            kappa: 5.0,
            theta: 0.04,
            sigma: 0.01,
            rho: 0.0,
        };
        let heston =
            heston_price(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 1.0, &params, &integrator())
                .unwrap();
        let (bs, ..) = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0);
        assert_abs_diff_eq!(heston, bs, epsilon = 1e-3);
    }

    #[test]
    fn put_call_parity() {
        let params = HestonParameters {
            v0: 0.04,
            kappa: 2.0,
            theta: 0.04,
            sigma: 0.3,
            rho: -0.7,
        };
        let (s, k, r, q, t) = (100.0, 105.0, 0.05, 0.02, 1.0);
        let call = heston_price(OptionType::Call, s, k, r, q, t, &params, &integrator()).unwrap();
        let put = heston_price(OptionType::Put, s, k, r, q, t, &params, &integrator()).unwrap();
        assert_abs_diff_eq!(call - put, s * (-q * t).exp() - k * (-r * t).exp(), epsilon = 1e-10);
        assert!(put > 0.0 && call > 0.0);
    }

    #[test]
    fn engine_prices_from_process() {
        let process = Arc::new(
            HestonProcess::new(
                Arc::new(FlatForward::new(0.05)),
                Arc::new(FlatForward::new(0.0)),
                100.0,
                0.04,
                2.0,
                0.04,
                0.3,
                -0.5,
            )
            .unwrap(),
        );
        let engine = AnalyticHestonEngine::new(process);
        let option = VanillaOption::european(OptionType::Call, 100.0, 1.0).unwrap();
        let npv = option.price(&engine).unwrap().npv;
        assert!(npv > 5.0 && npv < 20.0, "npv = {npv}");
    }

    #[test]
    fn integration_failure_propagates() {
        let params = HestonParameters {
            v0: 0.04,
            kappa: 2.0,
            theta: 0.04,
            sigma: 0.3,
            rho: -0.7,
        };
        let starved = SimpsonIntegral::new(1e-14, 10);
        assert!(heston_price(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 1.0, &params, &starved).is_err());
    }
}
