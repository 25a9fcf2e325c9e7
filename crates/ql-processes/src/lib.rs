//! # ql-processes
//!
//! Stochastic processes whose local coefficients drive the
//! finite-difference operators: one-factor diffusions (Black-Scholes in
//! log-spot, Ornstein-Uhlenbeck) and the Heston stochastic volatility model.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod black_scholes_process;
pub mod heston_process;
pub mod ornstein_uhlenbeck_process;
pub mod stochastic_process;

pub use black_scholes_process::GeneralizedBlackScholesProcess;
pub use heston_process::HestonProcess;
pub use ornstein_uhlenbeck_process::OrnsteinUhlenbeckProcess;
pub use stochastic_process::StochasticProcess1D;
