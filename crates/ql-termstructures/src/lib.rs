//! # ql-termstructures
//!
//! Yield curves and Black volatility term structures on a year-fraction
//! time axis, as consumed by the finite-difference operators.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `YieldTermStructure` — discount factors, zero and forward rates.
pub mod yield_term_structure;

/// `FlatForward` — constant forward-rate yield curve.
pub mod flat_forward;

/// `ZeroCurve` — linearly interpolated zero rates.
pub mod interpolated_zero_curve;

/// `BlackVolTermStructure` and `BlackConstantVol`.
pub mod black_vol_term_structure;

/// `BlackVarianceCurve` — time-dependent, strike-independent volatility.
pub mod black_variance_curve;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use black_variance_curve::BlackVarianceCurve;
pub use black_vol_term_structure::{BlackConstantVol, BlackVolTermStructure};
pub use flat_forward::FlatForward;
pub use interpolated_zero_curve::ZeroCurve;
pub use yield_term_structure::YieldTermStructure;
