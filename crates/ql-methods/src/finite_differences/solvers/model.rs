//! Backward induction over a time grid.

use ql_core::{errors::Result, Error, Size, Time};
use ql_math::Array;
use tracing::{trace, warn};

use super::time_grid::FdmTimeGrid;
use crate::finite_differences::schemes::{FdmScheme, SchemeContext};
use crate::finite_differences::step_conditions::{same_time, StepCondition};

/// Drives a scheme backwards through time, stopping at every event time
/// of the step condition.
#[derive(Debug)]
pub struct FiniteDifferenceModel {
    scheme: Box<dyn FdmScheme>,
}

impl FiniteDifferenceModel {
    /// Model stepping with `scheme`.
    pub fn new(scheme: Box<dyn FdmScheme>) -> Self {
        Self { scheme }
    }

    /// Roll `a` back from `from` to `to` in `steps` uniform steps refined
    /// at the condition's stopping times.
    ///
    /// The condition is applied at `from` when that is one of its stopping
    /// times, and after every step at the time reached. Fails with
    /// [`Error::NumericalInstability`] as soon as a step produces a
    /// non-finite value.
    pub fn rollback(
        &mut self,
        ctx: &mut SchemeContext<'_>,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: Size,
        condition: Option<&dyn StepCondition>,
    ) -> Result<()> {
        self.rollback_impl(ctx, a, from, to, steps, condition, true)
    }

    /// Rollback that continues a previous one ending at `from`, whose
    /// condition has already been applied there.
    pub(crate) fn continue_rollback(
        &mut self,
        ctx: &mut SchemeContext<'_>,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: Size,
        condition: Option<&dyn StepCondition>,
    ) -> Result<()> {
        self.rollback_impl(ctx, a, from, to, steps, condition, false)
    }

    #[allow(clippy::too_many_arguments)]
    fn rollback_impl(
        &mut self,
        ctx: &mut SchemeContext<'_>,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: Size,
        condition: Option<&dyn StepCondition>,
        apply_at_from: bool,
    ) -> Result<()> {
        let stopping_times: Vec<Time> = condition
            .map(|c| c.stopping_times())
            .unwrap_or_default()
            .into_iter()
            .filter(|&t| t >= to && (t <= from || same_time(t, from)))
            .collect();
        let grid = FdmTimeGrid::new(from, to, steps, &stopping_times)?;
        trace!(from, to, steps, intervals = grid.steps(), "rollback");

        if let Some(condition) = condition {
            if apply_at_from && stopping_times.iter().any(|&s| same_time(s, from)) {
                trace!(time = from, "stopping time");
                condition.apply_to(a, from)?;
            }
        }

        for (now, next) in grid.intervals() {
            self.scheme.set_step(now - next);
            self.scheme.step(ctx, a, now)?;
            if !a.is_finite() {
                warn!(time = next, "non-finite values after time step");
                return Err(Error::NumericalInstability(format!(
                    "non-finite values after stepping from {now} to {next}"
                )));
            }
            if let Some(condition) = condition {
                if stopping_times.iter().any(|&s| same_time(s, next)) {
                    trace!(time = next, "stopping time");
                }
                condition.apply_to(a, next)?;
            }
        }
        Ok(())
    }
}
