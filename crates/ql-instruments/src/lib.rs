//! # ql-instruments
//!
//! Instrument descriptions consumed by the pricing engines: payoffs,
//! exercise schedules on the time axis, discrete cash dividends, vanilla
//! options and storage contracts.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dividend;
pub mod exercise;
pub mod instrument;
pub mod option;
pub mod payoff;
pub mod storage;

pub use dividend::{dividend_schedule, Dividend};
pub use exercise::{Exercise, ExerciseType};
pub use instrument::{PricingEngine, PricingResults};
pub use option::{VanillaOption, VanillaOptionArguments};
pub use payoff::{CashOrNothingPayoff, OptionType, Payoff, PlainVanillaPayoff, StrikedPayoff};
pub use storage::VanillaStorageArguments;
