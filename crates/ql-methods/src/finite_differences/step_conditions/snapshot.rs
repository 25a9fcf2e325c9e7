use std::sync::Mutex;

use ql_core::{errors::Result, Time};
use ql_math::Array;

use super::{same_time, StepCondition};

/// Records a copy of the solution at one time without changing it.
///
/// The solvers use it to estimate theta from the value one small step
/// before the valuation time.
#[derive(Debug)]
pub struct FdmSnapshotCondition {
    t: Time,
    values: Mutex<Option<Array>>,
}

impl FdmSnapshotCondition {
    /// Snapshot at time `t`.
    pub fn new(t: Time) -> Self {
        Self {
            t,
            values: Mutex::new(None),
        }
    }

    /// Snapshot time.
    pub fn time(&self) -> Time {
        self.t
    }

    /// Recorded values, if the rollback passed the snapshot time.
    pub fn values(&self) -> Option<Array> {
        self.values.lock().ok().and_then(|v| v.clone())
    }
}

impl StepCondition for FdmSnapshotCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if same_time(t, self.t) {
            if let Ok(mut values) = self.values.lock() {
                *values = Some(a.clone());
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        vec![self.t]
    }
}
