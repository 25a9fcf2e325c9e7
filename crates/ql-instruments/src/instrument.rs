//! Pricing results and the engine interface.

use ql_core::{errors::Result, Real};
use std::collections::HashMap;

/// Results of pricing an instrument.
///
/// Besides the NPV, engines may report named sensitivities such as
/// `"delta"`, `"gamma"` and `"theta"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingResults {
    /// Net present value.
    pub npv: Real,
    /// Additional named results.
    pub additional_results: HashMap<String, Real>,
}

impl PricingResults {
    /// Results holding just an NPV.
    pub fn from_npv(npv: Real) -> Self {
        Self {
            npv,
            additional_results: HashMap::new(),
        }
    }

    /// Add a named result.
    pub fn with_result(mut self, key: impl Into<String>, value: Real) -> Self {
        self.additional_results.insert(key.into(), value);
        self
    }

    /// Look up a named result.
    pub fn result(&self, key: &str) -> Option<Real> {
        self.additional_results.get(key).copied()
    }

    /// `"delta"`, if reported.
    pub fn delta(&self) -> Option<Real> {
        self.result("delta")
    }

    /// `"gamma"`, if reported.
    pub fn gamma(&self) -> Option<Real> {
        self.result("gamma")
    }

    /// `"theta"`, if reported.
    pub fn theta(&self) -> Option<Real> {
        self.result("theta")
    }
}

/// A pricing engine for instruments described by `Args`.
pub trait PricingEngine<Args>: std::fmt::Debug + Send + Sync {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_results() {
        let r = PricingResults::from_npv(42.0)
            .with_result("delta", 0.55)
            .with_result("gamma", 0.02);
        assert_eq!(r.npv, 42.0);
        assert_eq!(r.delta(), Some(0.55));
        assert_eq!(r.gamma(), Some(0.02));
        assert_eq!(r.theta(), None);
    }
}
