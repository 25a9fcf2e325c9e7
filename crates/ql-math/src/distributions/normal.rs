//! Standard normal distribution.

use ql_core::{ensure, Real, Result};
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::{FRAC_1_SQRT_2, PI, SQRT_2};

/// The standard normal probability density `φ(x) = exp(-x²/2) / √(2π)`.
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The standard normal cumulative distribution `Φ(x)`.
///
/// Computed through the complementary error function, which keeps full
/// relative accuracy deep in the lower tail.
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// The inverse standard normal cumulative distribution `Φ⁻¹(p)`.
///
/// `p` must lie in the open interval (0, 1).
pub fn normal_cdf_inverse(p: Real) -> Result<Real> {
    ensure!(p > 0.0 && p < 1.0, "probability ({p}) must be in (0, 1)");
    Ok(-SQRT_2 * erfc_inv(2.0 * p))
}
