//! Discrete cash dividends.

use ql_core::{ensure, errors::Result, Real, Time};

/// A cash dividend of `amount` paid at `time`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dividend {
    /// Payment time.
    pub time: Time,
    /// Cash amount.
    pub amount: Real,
}

impl Dividend {
    /// Create a dividend; the time must be non-negative.
    pub fn new(time: Time, amount: Real) -> Result<Self> {
        ensure!(time >= 0.0, "dividend time ({time}) is negative");
        ensure!(amount.is_finite(), "dividend amount must be finite");
        Ok(Self { time, amount })
    }
}

/// Dividends sorted by time, as expected by the dividend step condition.
pub fn dividend_schedule(pairs: &[(Time, Real)]) -> Result<Vec<Dividend>> {
    let mut divs = pairs
        .iter()
        .map(|&(t, a)| Dividend::new(t, a))
        .collect::<Result<Vec<_>>>()?;
    divs.sort_by(|a, b| a.time.total_cmp(&b.time));
    Ok(divs)
}
