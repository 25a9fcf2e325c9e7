//! Events applied to the solution during the backward rollback.
//!
//! A condition mutates the array in place at the times it is interested in
//! and leaves it untouched otherwise. The composite applies its members in
//! registration order, so the order of construction decides precedence
//! when two events fall on the same time.

mod american;
mod bermudan;
mod dividend;
mod snapshot;
mod storage;

pub use american::FdmAmericanStepCondition;
pub use bermudan::FdmBermudanStepCondition;
pub use dividend::FdmDividendHandler;
pub use snapshot::FdmSnapshotCondition;
pub use storage::FdmSimpleStorageCondition;

use std::fmt;
use std::sync::Arc;

use ql_core::{errors::Result, Real, Size, Time};
use ql_instruments::{Dividend, Exercise, ExerciseType};
use ql_math::{close_relative, Array};

use crate::finite_differences::inner_value::FdmInnerValueCalculator;
use crate::finite_differences::meshers::FdmMesherComposite;

/// Relative tolerance under which two times are the same event time.
pub const TIME_TOLERANCE: Real = 1e-10;

pub(crate) fn same_time(t: Time, event: Time) -> bool {
    close_relative(t, event, TIME_TOLERANCE)
}

/// An event acting on the solution array.
pub trait StepCondition: fmt::Debug + Send + Sync {
    /// Apply the event to `a` at rollback time `t`; a no-op at times the
    /// condition does not react to.
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()>;

    /// Times that must be grid points of the rollback.
    fn stopping_times(&self) -> Vec<Time> {
        Vec::new()
    }
}

/// Ordered collection of step conditions.
#[derive(Debug, Clone, Default)]
pub struct FdmStepConditionComposite {
    stopping_times: Vec<Time>,
    conditions: Vec<Arc<dyn StepCondition>>,
}

fn merged_times(conditions: &[Arc<dyn StepCondition>]) -> Vec<Time> {
    let mut times: Vec<Time> = conditions.iter().flat_map(|c| c.stopping_times()).collect();
    times.sort_by(|a, b| a.total_cmp(b));
    times.dedup_by(|a, b| same_time(*a, *b));
    times
}

impl FdmStepConditionComposite {
    /// Composite of `conditions`, applied in the given order.
    pub fn new(conditions: Vec<Arc<dyn StepCondition>>) -> Self {
        Self {
            stopping_times: merged_times(&conditions),
            conditions,
        }
    }

    /// `first` followed by the members of `rest`.
    pub fn join(first: Arc<dyn StepCondition>, rest: &FdmStepConditionComposite) -> Self {
        let mut conditions = Vec::with_capacity(rest.conditions.len() + 1);
        conditions.push(first);
        conditions.extend(rest.conditions.iter().cloned());
        Self::new(conditions)
    }

    /// Standard conditions of a vanilla option: the dividend handler first,
    /// then the exercise condition, so that exercise decisions on a dividend
    /// date see the ex-dividend values.
    pub fn vanilla(
        dividends: &[Dividend],
        exercise: &Exercise,
        mesher: Arc<FdmMesherComposite>,
        calculator: Arc<dyn FdmInnerValueCalculator>,
        equity_direction: Size,
    ) -> Result<Self> {
        let mut conditions: Vec<Arc<dyn StepCondition>> = Vec::new();
        let maturity = exercise.last_time();
        let dividends: Vec<Dividend> = dividends
            .iter()
            .copied()
            .filter(|d| d.time > 0.0 && d.time <= maturity)
            .collect();
        if !dividends.is_empty() {
            conditions.push(Arc::new(FdmDividendHandler::new(
                dividends,
                Arc::clone(&mesher),
                equity_direction,
            )?));
        }
        match exercise.exercise_type() {
            ExerciseType::European => {}
            ExerciseType::American => {
                let times = exercise.times();
                conditions.push(Arc::new(FdmAmericanStepCondition::new(
                    mesher,
                    calculator,
                    times[0],
                    exercise.last_time(),
                )));
            }
            ExerciseType::Bermudan => {
                conditions.push(Arc::new(FdmBermudanStepCondition::new(
                    exercise.times().to_vec(),
                    mesher,
                    calculator,
                )));
            }
        }
        Ok(Self::new(conditions))
    }

    /// Sorted, de-duplicated union of the members' stopping times.
    pub fn stopping_times(&self) -> &[Time] {
        &self.stopping_times
    }

    /// Members in application order.
    pub fn conditions(&self) -> &[Arc<dyn StepCondition>] {
        &self.conditions
    }

    /// `true` without members.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl StepCondition for FdmStepConditionComposite {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        for c in &self.conditions {
            c.apply_to(a, t)?;
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.stopping_times.clone()
    }
}
