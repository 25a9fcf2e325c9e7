//! Spatial grids.
//!
//! [`Fdm1dMesher`] holds one direction; [`FdmMesherComposite`] combines one
//! mesher per direction into the tensor grid the operators act on. The
//! builders for Black-Scholes and Heston problems derive sensible ranges
//! from the model parameters.

mod black_scholes_mesher;
mod fdm_1d_mesher;
mod heston_variance_mesher;
mod mesher_composite;

pub use black_scholes_mesher::{black_scholes_mesher, forward_envelope, FdmBlackScholesMesherParams};
pub use fdm_1d_mesher::{ConcentrationPoint, Fdm1dMesher};
pub use heston_variance_mesher::FdmHestonVarianceMesher;
pub use mesher_composite::FdmMesherComposite;
