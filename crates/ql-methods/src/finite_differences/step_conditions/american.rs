use std::sync::Arc;

use ql_core::{errors::Result, Time};
use ql_math::Array;

use super::{same_time, StepCondition};
use crate::finite_differences::inner_value::FdmInnerValueCalculator;
use crate::finite_differences::meshers::FdmMesherComposite;

/// Early exercise at every rollback time inside `[earliest, latest]`.
#[derive(Debug, Clone)]
pub struct FdmAmericanStepCondition {
    mesher: Arc<FdmMesherComposite>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
    earliest: Time,
    latest: Time,
}

impl FdmAmericanStepCondition {
    /// Exercise window `[earliest, latest]`.
    pub fn new(
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
        earliest: Time,
        latest: Time,
    ) -> Self {
        Self {
            mesher,
            calculator,
            earliest,
            latest,
        }
    }

    fn in_window(&self, t: Time) -> bool {
        (t >= self.earliest || same_time(t, self.earliest))
            && (t <= self.latest || same_time(t, self.latest))
    }
}

impl StepCondition for FdmAmericanStepCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if !self.in_window(t) {
            return Ok(());
        }
        for i in 0..self.mesher.size() {
            let exercise = self.calculator.inner_value(i, t);
            if exercise > a[i] {
                a[i] = exercise;
            }
        }
        Ok(())
    }
}
