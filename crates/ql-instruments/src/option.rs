//! Vanilla options and the arguments passed to their engines.

use crate::dividend::Dividend;
use crate::exercise::Exercise;
use crate::instrument::{PricingEngine, PricingResults};
use crate::payoff::{OptionType, PlainVanillaPayoff, StrikedPayoff};
use ql_core::{errors::Result, Real, Time};
use std::sync::Arc;

/// Arguments needed for pricing a one-asset option.
#[derive(Debug, Clone)]
pub struct VanillaOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// The exercise specification.
    pub exercise: Exercise,
    /// Discrete cash dividends paid before expiry, sorted by time.
    pub dividends: Vec<Dividend>,
}

/// A vanilla option on a single underlying, optionally paying cash
/// dividends.
#[derive(Debug, Clone)]
pub struct VanillaOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
    dividends: Vec<Dividend>,
}

impl VanillaOption {
    /// Create an option.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self {
            payoff,
            exercise,
            dividends: Vec::new(),
        }
    }

    /// European call or put with plain vanilla payoff.
    pub fn european(option_type: OptionType, strike: Real, expiry: Time) -> Result<Self> {
        Ok(Self::new(
            Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            Exercise::european(expiry)?,
        ))
    }

    /// Attach discrete cash dividends.
    pub fn with_dividends(mut self, mut dividends: Vec<Dividend>) -> Self {
        dividends.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.dividends = dividends;
        self
    }

    /// The payoff.
    pub fn payoff(&self) -> &dyn StrikedPayoff {
        &*self.payoff
    }

    /// The exercise.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// The dividends.
    pub fn dividends(&self) -> &[Dividend] {
        &self.dividends
    }

    /// Arguments for a pricing engine.
    pub fn arguments(&self) -> VanillaOptionArguments {
        VanillaOptionArguments {
            payoff: Arc::clone(&self.payoff),
            exercise: self.exercise.clone(),
            dividends: self.dividends.clone(),
        }
    }

    /// Price this option with `engine`.
    pub fn price(
        &self,
        engine: &dyn PricingEngine<VanillaOptionArguments>,
    ) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct IntrinsicAtSpot(Real);

    impl PricingEngine<VanillaOptionArguments> for IntrinsicAtSpot {
        fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
            Ok(PricingResults::from_npv(args.payoff.value(self.0)))
        }
    }

    #[test]
    fn arguments_carry_sorted_dividends() {
        let opt = VanillaOption::european(OptionType::Put, 40.0, 1.0)
            .unwrap()
            .with_dividends(vec![
                Dividend::new(0.6, 1.0).unwrap(),
                Dividend::new(0.2, 0.5).unwrap(),
            ]);
        let args = opt.arguments();
        assert_eq!(args.dividends[0].time, 0.2);
        assert_eq!(args.exercise.last_time(), 1.0);
        assert_eq!(opt.price(&IntrinsicAtSpot(36.0)).unwrap().npv, 4.0);
    }
}
