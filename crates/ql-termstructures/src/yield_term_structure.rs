//! `YieldTermStructure`: discounting on a year-fraction time axis.
//!
//! Times are measured from the valuation point. Implementors supply the
//! discount factor; zero and forward rates (continuously compounded) follow.

use ql_core::{DiscountFactor, Rate, Time};

/// Small time step used for instantaneous forward rates.
const DT: Time = 1.0e-4;

/// A yield (interest-rate) term structure.
pub trait YieldTermStructure: std::fmt::Debug + Send + Sync {
    /// Discount factor `P(0, t)`.
    fn discount(&self, t: Time) -> DiscountFactor;

    /// Continuously-compounded zero rate for maturity `t`.
    fn zero_rate(&self, t: Time) -> Rate {
        if t <= 0.0 {
            return self.forward_rate(0.0, DT);
        }
        -self.discount(t).ln() / t
    }

    /// Continuously-compounded forward rate over `[t1, t2]`.
    ///
    /// `t1 == t2` gives the instantaneous forward rate at `t1`.
    fn forward_rate(&self, t1: Time, t2: Time) -> Rate {
        let (t1, t2) = if t2 > t1 { (t1, t2) } else { (t1, t1 + DT) };
        (self.discount(t1) / self.discount(t2)).ln() / (t2 - t1)
    }

    /// Latest time for which the curve can return values.
    fn max_time(&self) -> Time {
        Time::INFINITY
    }
}
