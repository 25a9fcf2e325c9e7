//! # ql-core
//!
//! Core types and error definitions shared by the finite-difference
//! workspace: primitive type aliases, the error enum with its `ensure!`
//! family of macros, and the `LazyObject` recalculation pattern.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `ensure_config!` / `ensure_stable!` /
/// `fail!` macros.
pub mod errors;

/// Design patterns: lazy_object.
pub mod patterns;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A discount factor in [0, 1].
pub type DiscountFactor = Real;

/// A volatility level expressed as a decimal.
pub type Volatility = Real;

/// A time measurement in years from the valuation point.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
pub use patterns::lazy_object::{LazyObject, LazyState};
