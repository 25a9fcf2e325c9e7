//! Analytic European option engine (Black-Scholes-Merton).
//!
//! Prices European vanilla options with the closed-form Black-Scholes-Merton
//! formula and reports the first and second order Greeks. The finite
//! difference engines are checked against it.

use ql_core::{ensure_config, errors::Result, Real};
use ql_instruments::{ExerciseType, OptionType, PricingEngine, PricingResults, VanillaOptionArguments};
use ql_math::{normal_cdf, normal_pdf};
use ql_processes::GeneralizedBlackScholesProcess;

use std::sync::Arc;

/// Analytic pricing engine for European vanilla options.
///
/// $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
/// $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
///
/// where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$,
/// with `r` and `q` the zero rates to expiry and `σ` the Black volatility at
/// the strike.
#[derive(Debug)]
pub struct AnalyticEuropeanEngine {
    process: Arc<GeneralizedBlackScholesProcess>,
}

impl AnalyticEuropeanEngine {
    /// Create a new engine with the given Black-Scholes process.
    pub fn new(process: Arc<GeneralizedBlackScholesProcess>) -> Self {
        Self { process }
    }
}

/// Compute Black-Scholes price and Greeks for a European option.
///
/// Returns `(price, delta, gamma, vega, theta, rho)`.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    volatility: Real,
    time_to_expiry: Real,
) -> (Real, Real, Real, Real, Real, Real) {
    let phi = option_type.sign();
    let t = time_to_expiry;

    if t <= 0.0 {
        let intrinsic = (phi * (spot - strike)).max(0.0);
        return (intrinsic, 0.0, 0.0, 0.0, 0.0, 0.0);
    }

    let r = risk_free_rate;
    let q = dividend_yield;
    let sigma = volatility;
    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let fwd = spot * ((r - q) * t).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
        (d1, d1 - std_dev)
    } else {
        let big = if fwd > strike { 1e15 } else { -1e15 };
        (big, big)
    };

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let price = phi * (spot * df_q * nd1 - strike * df_r * nd2);
    let delta = phi * df_q * nd1;
    let gamma = if std_dev > 1e-15 {
        df_q * npd1 / (spot * std_dev)
    } else {
        0.0
    };
    // per 1.0 absolute vol
    let vega = spot * df_q * npd1 * sqrt_t;
    // per year, as ∂V/∂t at fixed expiry
    let theta = {
        let term1 = -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t);
        let term2 = -phi * r * strike * df_r * nd2;
        let term3 = phi * q * spot * df_q * nd1;
        term1 + term2 + term3
    };
    let rho = phi * strike * t * df_r * nd2;

    (price, delta, gamma, vega, theta, rho)
}

impl PricingEngine<VanillaOptionArguments> for AnalyticEuropeanEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        ensure_config!(
            args.exercise.exercise_type() == ExerciseType::European,
            "analytic Black-Scholes engine needs European exercise, got {}",
            args.exercise
        );
        ensure_config!(
            args.dividends.is_empty(),
            "analytic Black-Scholes engine does not handle discrete dividends"
        );
        ensure_config!(
            args.payoff.name() == "Vanilla",
            "analytic Black-Scholes engine needs a plain vanilla payoff, got {}",
            args.payoff.name()
        );
        let spot = self.process.spot();
        let strike = args.payoff.strike();
        let t = args.exercise.last_time();

        let r = self.process.risk_free_rate().zero_rate(t);
        let q = self.process.dividend_yield().zero_rate(t);
        let sigma = self.process.black_volatility().black_vol(t, strike);

        let (price, delta, gamma, vega, theta, rho) =
            black_scholes_merton(args.payoff.option_type(), spot, strike, r, q, sigma, t);

        Ok(PricingResults::from_npv(price)
            .with_result("delta", delta)
            .with_result("gamma", gamma)
            .with_result("vega", vega)
            .with_result("theta", theta)
            .with_result("rho", rho))
    }
}
