//! `ZeroCurve`: zero rates linearly interpolated in time.
//!
//! Beyond the last node the zero rate is held flat; before the first node the
//! first rate applies.

use crate::yield_term_structure::YieldTermStructure;
use ql_core::{ensure, errors::Result, DiscountFactor, Rate, Time};
use ql_math::{Interpolation1D, LinearInterpolation};

/// Yield curve built from `(time, zero rate)` pillars.
#[derive(Debug, Clone)]
pub struct ZeroCurve {
    times: Vec<Time>,
    rates: Vec<Rate>,
    interpolation: Option<LinearInterpolation>,
}

impl ZeroCurve {
    /// Build the curve; `times` must be non-negative and strictly increasing.
    pub fn new(times: &[Time], rates: &[Rate]) -> Result<Self> {
        ensure!(!times.is_empty(), "at least one pillar required");
        ensure!(
            times.len() == rates.len(),
            "times ({}) and rates ({}) differ in length",
            times.len(),
            rates.len()
        );
        ensure!(times[0] >= 0.0, "negative pillar time {}", times[0]);
        let interpolation = if times.len() > 1 {
            Some(LinearInterpolation::new(times, rates)?)
        } else {
            None
        };
        Ok(Self {
            times: times.to_vec(),
            rates: rates.to_vec(),
            interpolation,
        })
    }

    fn rate_at(&self, t: Time) -> Rate {
        let n = self.times.len();
        match &self.interpolation {
            _ if t <= self.times[0] => self.rates[0],
            _ if t >= self.times[n - 1] => self.rates[n - 1],
            Some(interp) => interp.operator(t),
            None => self.rates[0],
        }
    }
}

impl YieldTermStructure for ZeroCurve {
    fn discount(&self, t: Time) -> DiscountFactor {
        (-self.rate_at(t) * t).exp()
    }

    fn zero_rate(&self, t: Time) -> Rate {
        self.rate_at(t)
    }
}
