//! Probability distributions, delegating to the `statrs` crate.

pub mod gamma;
pub mod normal;

pub use gamma::GammaDistribution;
pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf};
