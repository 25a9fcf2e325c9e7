//! Rollback time grid.

use ql_core::{ensure, ensure_config, errors::Result, Real, Size, Time};
use ql_math::close_enough;

use crate::finite_differences::step_conditions::same_time;

/// Time points of a rollback from `from` down to `to`: a uniform partition
/// plus every mandatory event time inside the interval, so that no step
/// straddles an event.
///
/// Times are stored in increasing order; `times()[0] == to` and the last
/// entry is `from`.
#[derive(Debug, Clone, PartialEq)]
pub struct FdmTimeGrid {
    times: Vec<Time>,
}

impl FdmTimeGrid {
    /// Grid of `steps` uniform intervals on `[to, from]` merged with
    /// `mandatory`. Times closer than the event tolerance are merged, the
    /// mandatory time winning.
    pub fn new(from: Time, to: Time, steps: Size, mandatory: &[Time]) -> Result<Self> {
        ensure_config!(steps > 0, "at least one time step is required");
        ensure_config!(
            from >= to,
            "rollback must go backwards in time (from {from} < to {to})"
        );
        ensure!(to >= 0.0, "rollback end time ({to}) must not be negative");
        for &t in mandatory {
            ensure_config!(
                t >= 0.0 && (t <= from || same_time(t, from)),
                "event time {t} lies outside [0, {from}]"
            );
        }

        let dt = (from - to) / steps as Real;
        let mut events: Vec<Time> = mandatory
            .iter()
            .copied()
            .filter(|&t| t > to && !same_time(t, to) && !same_time(t, from))
            .collect();
        events.sort_by(|a, b| a.total_cmp(b));
        events.dedup_by(|a, b| same_time(*a, *b));

        let mut times = Vec::with_capacity(steps + events.len() + 1);
        times.push(to);
        let mut pending = events.into_iter().peekable();
        for i in 1..=steps {
            let t = if i == steps { from } else { to + i as Real * dt };
            while let Some(&e) = pending.peek() {
                if e < t && !same_time(e, t) {
                    times.push(e);
                    pending.next();
                } else {
                    break;
                }
            }
            match pending.peek() {
                Some(&e) if same_time(e, t) => {
                    times.push(e);
                    pending.next();
                }
                _ => times.push(t),
            }
        }
        if close_enough(from, to, 42) {
            times.truncate(1);
        }
        Ok(Self { times })
    }

    /// All grid times in increasing order.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Start of the rollback.
    pub fn from(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// End of the rollback.
    pub fn to(&self) -> Time {
        self.times[0]
    }

    /// Number of intervals.
    pub fn steps(&self) -> Size {
        self.times.len() - 1
    }

    /// Intervals `(now, next)` in rollback order, latest first.
    pub fn intervals(&self) -> impl Iterator<Item = (Time, Time)> + '_ {
        self.times.windows(2).rev().map(|w| (w[1], w[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniform_without_events() {
        let grid = FdmTimeGrid::new(1.0, 0.0, 4, &[]).unwrap();
        assert_eq!(grid.steps(), 4);
        assert_abs_diff_eq!(grid.times()[2], 0.5, epsilon = 1e-15);
        let intervals: Vec<_> = grid.intervals().collect();
        assert_eq!(intervals[0].0, 1.0);
        assert_eq!(intervals[3].1, 0.0);
    }

    #[test]
    fn events_are_inserted_and_merged() {
        let grid = FdmTimeGrid::new(1.0, 0.0, 4, &[0.3, 0.5 + 1e-13, 0.3, 1.0]).unwrap();
        let times = grid.times();
        assert_eq!(times.len(), 6);
        assert!(times.contains(&0.3));
        assert!(times.contains(&(0.5 + 1e-13)));
        assert!(times.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(grid.from(), 1.0);
    }

    #[test]
    fn invalid_requests() {
        assert!(FdmTimeGrid::new(1.0, 0.0, 0, &[]).unwrap_err().is_configuration());
        assert!(FdmTimeGrid::new(0.0, 1.0, 5, &[]).unwrap_err().is_configuration());
        assert!(FdmTimeGrid::new(1.0, 0.0, 5, &[1.5]).unwrap_err().is_configuration());
        assert!(FdmTimeGrid::new(1.0, 0.0, 5, &[-0.1]).unwrap_err().is_configuration());
    }
}
