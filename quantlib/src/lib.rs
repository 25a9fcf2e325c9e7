//! # quantlib-fdm
//!
//! Finite-difference PDE pricing for derivatives: meshers, banded linear
//! operators, boundary and step conditions, explicit/implicit/ADI time
//! stepping schemes, and the engines built on them.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `ql-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use quantlib_fdm::instruments::{Exercise, OptionType, PlainVanillaPayoff, VanillaOption};
//! use quantlib_fdm::pricingengines::FdBlackScholesVanillaEngine;
//! use quantlib_fdm::processes::GeneralizedBlackScholesProcess;
//! use quantlib_fdm::termstructures::{BlackConstantVol, FlatForward};
//!
//! # fn main() -> quantlib_fdm::core::Result<()> {
//! let process = GeneralizedBlackScholesProcess::new(
//!     36.0,
//!     Arc::new(FlatForward::new(0.06)),
//!     Arc::new(FlatForward::new(0.0)),
//!     Arc::new(BlackConstantVol::new(0.2)),
//! )?;
//! let put = VanillaOption::new(
//!     Arc::new(PlainVanillaPayoff::new(OptionType::Put, 40.0)),
//!     Exercise::american(0.0, 1.0)?,
//! );
//! let engine = FdBlackScholesVanillaEngine::new(Arc::new(process)).with_grid(100, 100);
//! let results = put.price(&engine)?;
//! assert!(results.npv > 4.0);
//! # Ok(())
//! # }
//! ```
//!
//! Library crates log through `tracing` and leave the choice of subscriber
//! to the application.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use ql_core as core;

/// Arrays, distributions, interpolation, integration and BiCGStab.
pub use ql_math as math;

/// Yield and Black volatility term structures.
pub use ql_termstructures as termstructures;

/// Stochastic process definitions.
pub use ql_processes as processes;

/// The finite-difference framework.
pub use ql_methods as methods;

/// Payoffs, exercises, dividends and instrument arguments.
pub use ql_instruments as instruments;

/// Pricing engines.
pub use ql_pricingengines as pricingengines;
