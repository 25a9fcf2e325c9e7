//! Log-spot mesher for Black-Scholes type problems.
//!
//! The grid covers the forward envelope over the option's life, including
//! the drops caused by discrete cash dividends, widened on both sides by
//! `σ√T · Φ⁻¹(1 − ε) · scale`.

use ql_core::{ensure, errors::Result, Real, Size, Time};
use ql_instruments::Dividend;
use ql_math::normal_cdf_inverse;
use ql_processes::GeneralizedBlackScholesProcess;
use ql_termstructures::YieldTermStructure;
use tracing::debug;

use super::{ConcentrationPoint, Fdm1dMesher};

/// Tuning knobs of [`black_scholes_mesher`].
#[derive(Debug, Clone, PartialEq)]
pub struct FdmBlackScholesMesherParams {
    /// Fixed lower bound in log-spot, overriding the computed one.
    pub x_min: Option<Real>,
    /// Fixed upper bound in log-spot, overriding the computed one.
    pub x_max: Option<Real>,
    /// Tail probability left outside the grid on each side.
    pub eps: Real,
    /// Extra widening factor on the standard-deviation range.
    pub scale_factor: Real,
    /// Spot level and relative density to cluster nodes around.
    pub concentration: Option<(Real, Real)>,
}

impl Default for FdmBlackScholesMesherParams {
    fn default() -> Self {
        Self {
            x_min: None,
            x_max: None,
            eps: 1e-4,
            scale_factor: 1.5,
            concentration: None,
        }
    }
}

/// Minimum and maximum forward over `[0, maturity]`, dividends included.
pub fn forward_envelope(
    spot: Real,
    risk_free: &dyn YieldTermStructure,
    dividend_yield: &dyn YieldTermStructure,
    maturity: Time,
    dividends: &[Dividend],
) -> Result<(Real, Real)> {
    let mut steps: Vec<(Time, Real)> = dividends
        .iter()
        .filter(|d| d.time <= maturity)
        .map(|d| (d.time, d.amount))
        .collect();
    let intermediate = ((24.0 * maturity) as Size).max(2);
    steps.extend((1..=intermediate).map(|i| (i as Real * maturity / intermediate as Real, 0.0)));
    steps.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut fwd = spot;
    let (mut lo, mut hi) = (spot, spot);
    let mut last = 0.0;
    for (t, amount) in steps {
        fwd *= risk_free.discount(last) / risk_free.discount(t) * dividend_yield.discount(t)
            / dividend_yield.discount(last);
        lo = lo.min(fwd);
        hi = hi.max(fwd);
        fwd -= amount;
        lo = lo.min(fwd);
        hi = hi.max(fwd);
        last = t;
    }
    ensure!(
        lo > 0.0,
        "forward becomes non-positive ({lo}) after dividends"
    );
    Ok((lo, hi))
}

/// Log-spot mesher of `size` points for a Black-Scholes process.
pub fn black_scholes_mesher(
    size: Size,
    process: &GeneralizedBlackScholesProcess,
    maturity: Time,
    strike: Real,
    dividends: &[Dividend],
    params: &FdmBlackScholesMesherParams,
) -> Result<Fdm1dMesher> {
    ensure!(maturity > 0.0, "maturity ({maturity}) must be positive");
    ensure!(strike > 0.0, "strike ({strike}) must be positive");
    let (lo, hi) = forward_envelope(
        process.spot(),
        process.risk_free_rate(),
        process.dividend_yield(),
        maturity,
        dividends,
    )?;

    let sigma_sqrt_t = process.black_volatility().black_vol(maturity, strike) * maturity.sqrt();
    ensure!(sigma_sqrt_t > 0.0, "volatility must be positive");
    let width = sigma_sqrt_t * normal_cdf_inverse(1.0 - params.eps)? * params.scale_factor;
    let x_min = params.x_min.unwrap_or(lo.ln() - width);
    let x_max = params.x_max.unwrap_or(hi.ln() + width);
    debug!(size, x_min, x_max, maturity, "black-scholes log-spot mesher");

    let concentration = params
        .concentration
        .filter(|&(s, _)| s > 0.0 && s.ln() >= x_min && s.ln() <= x_max)
        .map(|(s, density)| ConcentrationPoint::new(s.ln(), density));
    Fdm1dMesher::concentrating(x_min, x_max, size, concentration)
}
