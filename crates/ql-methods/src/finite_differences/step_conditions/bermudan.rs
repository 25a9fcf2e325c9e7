use std::sync::Arc;

use ql_core::{errors::Result, Time};
use ql_math::Array;

use super::{same_time, StepCondition};
use crate::finite_differences::inner_value::FdmInnerValueCalculator;
use crate::finite_differences::meshers::FdmMesherComposite;

/// Early exercise at a discrete set of times.
#[derive(Debug, Clone)]
pub struct FdmBermudanStepCondition {
    exercise_times: Vec<Time>,
    mesher: Arc<FdmMesherComposite>,
    calculator: Arc<dyn FdmInnerValueCalculator>,
}

impl FdmBermudanStepCondition {
    /// Exercise at `exercise_times`; negative times are dropped.
    pub fn new(
        mut exercise_times: Vec<Time>,
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
    ) -> Self {
        exercise_times.retain(|&t| t >= 0.0);
        exercise_times.sort_by(|a, b| a.total_cmp(b));
        Self {
            exercise_times,
            mesher,
            calculator,
        }
    }

    /// Exercise times, ascending.
    pub fn exercise_times(&self) -> &[Time] {
        &self.exercise_times
    }
}

impl StepCondition for FdmBermudanStepCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if !self.exercise_times.iter().any(|&e| same_time(t, e)) {
            return Ok(());
        }
        for i in 0..self.mesher.size() {
            a[i] = a[i].max(self.calculator.inner_value(i, t));
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.exercise_times.clone()
    }
}
