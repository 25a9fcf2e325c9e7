//! Option payoffs as functions of the underlying price.

use ql_core::Real;
use std::fmt;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl OptionType {
    /// +1 for Call, −1 for Put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// Payoff received on exercise or at expiry.
pub trait Payoff: fmt::Debug + Send + Sync {
    /// Payoff for underlying price `price`.
    fn value(&self, price: Real) -> Real;

    /// Short name.
    fn name(&self) -> &str;
}

/// A payoff depending on a strike.
pub trait StrikedPayoff: Payoff {
    /// The strike price.
    fn strike(&self) -> Real;

    /// The option type.
    fn option_type(&self) -> OptionType;
}

// ── Plain vanilla ────────────────────────────────────────────────────────────

/// `max(φ(S − K), 0)` with `φ = ±1` for call/put.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlainVanillaPayoff {
    option_type: OptionType,
    strike: Real,
}

impl PlainVanillaPayoff {
    /// Create a plain vanilla payoff.
    pub fn new(option_type: OptionType, strike: Real) -> Self {
        Self {
            option_type,
            strike,
        }
    }
}

impl Payoff for PlainVanillaPayoff {
    fn value(&self, price: Real) -> Real {
        (self.option_type.sign() * (price - self.strike)).max(0.0)
    }

    fn name(&self) -> &str {
        "Vanilla"
    }
}

impl StrikedPayoff for PlainVanillaPayoff {
    fn strike(&self) -> Real {
        self.strike
    }

    fn option_type(&self) -> OptionType {
        self.option_type
    }
}

// ── Cash or nothing ──────────────────────────────────────────────────────────

/// Fixed cash amount if `φ(S − K) > 0`, zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashOrNothingPayoff {
    option_type: OptionType,
    strike: Real,
    cash: Real,
}

impl CashOrNothingPayoff {
    /// Create a cash-or-nothing payoff.
    pub fn new(option_type: OptionType, strike: Real, cash: Real) -> Self {
        Self {
            option_type,
            strike,
            cash,
        }
    }

    /// The cash amount.
    pub fn cash(&self) -> Real {
        self.cash
    }
}

impl Payoff for CashOrNothingPayoff {
    fn value(&self, price: Real) -> Real {
        if self.option_type.sign() * (price - self.strike) > 0.0 {
            self.cash
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "CashOrNothing"
    }
}

impl StrikedPayoff for CashOrNothingPayoff {
    fn strike(&self) -> Real {
        self.strike
    }

    fn option_type(&self) -> OptionType {
        self.option_type
    }
}
