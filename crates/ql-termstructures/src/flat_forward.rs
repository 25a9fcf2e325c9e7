//! `FlatForward`: a constant continuously-compounded rate.

use crate::yield_term_structure::YieldTermStructure;
use ql_core::{DiscountFactor, Rate, Time};

/// Flat forward curve, `P(t) = exp(-r t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatForward {
    rate: Rate,
}

impl FlatForward {
    /// Curve with continuously-compounded rate `rate`.
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }

    /// The flat rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl YieldTermStructure for FlatForward {
    fn discount(&self, t: Time) -> DiscountFactor {
        (-self.rate * t).exp()
    }

    fn zero_rate(&self, _t: Time) -> Rate {
        self.rate
    }

    fn forward_rate(&self, _t1: Time, _t2: Time) -> Rate {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn flat_curve() {
        let c = FlatForward::new(0.05);
        assert_abs_diff_eq!(c.discount(2.0), (-0.1_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(c.zero_rate(0.0), 0.05, epsilon = 1e-15);
        assert_abs_diff_eq!(c.forward_rate(0.3, 0.7), 0.05, epsilon = 1e-15);
    }
}
