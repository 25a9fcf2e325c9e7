//! # ql-pricingengines
//!
//! Pricing engines built on the finite-difference framework of
//! `ql-methods`, plus the closed-form engines they are checked against.
//!
//! ## Engines
//!
//! - [`FdBlackScholesVanillaEngine`]: European, American and Bermudan
//!   vanilla options with discrete cash dividends, in log-spot
//! - [`FdHestonVanillaEngine`]: vanilla options under Heston dynamics on a
//!   (log-spot, variance) mesh
//! - [`FdSimpleStorageEngine`]: storage facility on a (volume, log-price) mesh
//! - [`AnalyticEuropeanEngine`]: Black-Scholes-Merton closed form
//! - [`AnalyticHestonEngine`]: semi-analytic Heston price
//!
//! Grid sizes are carried by [`FdGridSettings`], which derives `serde`
//! traits behind the `serde` feature.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_european_engine;
pub mod analytic_heston_engine;
pub mod fd_black_scholes_vanilla_engine;
pub mod fd_grid_settings;
pub mod fd_heston_vanilla_engine;
pub mod fd_simple_storage_engine;

pub use analytic_european_engine::{black_scholes_merton, AnalyticEuropeanEngine};
pub use analytic_heston_engine::{heston_price, AnalyticHestonEngine, HestonParameters};
pub use fd_black_scholes_vanilla_engine::FdBlackScholesVanillaEngine;
pub use fd_grid_settings::FdGridSettings;
pub use fd_heston_vanilla_engine::FdHestonVanillaEngine;
pub use fd_simple_storage_engine::FdSimpleStorageEngine;
