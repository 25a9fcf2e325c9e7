//! # ql-math
//!
//! Numerical building blocks for the finite-difference engine: the `Array`
//! newtype over nalgebra, floating-point comparison, distributions (via
//! statrs), interpolation with derivatives, Simpson integration and the
//! BiCGStab iterative solver.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Dense real vector.
pub mod array;

/// Preconditioned BiCGStab solver.
pub mod bicgstab;

/// Floating-point comparison utilities.
pub mod comparison;

/// Probability distributions.
pub mod distributions;

/// Numerical integration.
pub mod integrals;

/// 1D and 2D interpolation schemes.
pub mod interpolations;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use bicgstab::{BiCGStab, BiCGStabResult};
pub use comparison::{close_enough, close_relative};
pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf, GammaDistribution};
pub use integrals::{Integrator, SimpsonIntegral};
pub use interpolations::{BicubicSpline, CubicNaturalSpline, Interpolation1D, LinearInterpolation};
