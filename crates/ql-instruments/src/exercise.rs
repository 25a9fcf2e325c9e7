//! When an option may be exercised, on the year-fraction time axis.

use ql_core::{ensure, errors::Result, Time};
use std::fmt;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseType {
    /// Only at expiry.
    European,
    /// At any time in a window ending at expiry.
    American,
    /// At a discrete set of times.
    Bermudan,
}

/// Exercise specification.
///
/// - European: one time (the expiry).
/// - American: two times (earliest, latest).
/// - Bermudan: sorted, de-duplicated times.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    exercise_type: ExerciseType,
    times: Vec<Time>,
}

impl Exercise {
    /// European exercise at `expiry`.
    pub fn european(expiry: Time) -> Result<Self> {
        ensure!(expiry > 0.0, "expiry ({expiry}) must be positive");
        Ok(Self {
            exercise_type: ExerciseType::European,
            times: vec![expiry],
        })
    }

    /// American exercise in `[earliest, latest]`.
    pub fn american(earliest: Time, latest: Time) -> Result<Self> {
        ensure!(earliest >= 0.0, "earliest exercise time ({earliest}) is negative");
        ensure!(
            latest > earliest,
            "latest exercise time ({latest}) must follow earliest ({earliest})"
        );
        Ok(Self {
            exercise_type: ExerciseType::American,
            times: vec![earliest, latest],
        })
    }

    /// Bermudan exercise at the given times.
    pub fn bermudan(mut times: Vec<Time>) -> Result<Self> {
        ensure!(!times.is_empty(), "at least one exercise time required");
        ensure!(
            times.iter().all(|t| t.is_finite() && *t >= 0.0),
            "exercise times must be finite and non-negative"
        );
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        ensure!(times[times.len() - 1] > 0.0, "last exercise time must be positive");
        Ok(Self {
            exercise_type: ExerciseType::Bermudan,
            times,
        })
    }

    /// The exercise type.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }

    /// All exercise times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The last exercise time, i.e. the option's maturity.
    pub fn last_time(&self) -> Time {
        self.times[self.times.len() - 1]
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exercise_type {
            ExerciseType::European => write!(f, "European({})", self.times[0]),
            ExerciseType::American => {
                write!(f, "American({} – {})", self.times[0], self.last_time())
            }
            ExerciseType::Bermudan => write!(f, "Bermudan({} times)", self.times.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        let e = Exercise::european(1.0).unwrap();
        assert_eq!(e.exercise_type(), ExerciseType::European);
        assert_eq!(e.last_time(), 1.0);

        let a = Exercise::american(0.0, 2.0).unwrap();
        assert_eq!(a.times(), &[0.0, 2.0]);
        assert!(Exercise::american(1.0, 1.0).is_err());

        let b = Exercise::bermudan(vec![1.0, 0.5, 1.0, 0.25]).unwrap();
        assert_eq!(b.times(), &[0.25, 0.5, 1.0]);
        assert_eq!(b.to_string(), "Bermudan(3 times)");
        assert!(Exercise::european(0.0).is_err());
    }
}
