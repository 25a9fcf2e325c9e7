//! Numerical integration.

use ql_core::{
    errors::{Error, Result},
    Real,
};

/// A numerical integrator on a finite interval.
pub trait Integrator {
    /// Integrate `f` on `[a, b]`.
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real>;
}

// ── Simpson ───────────────────────────────────────────────────────────────────

/// Composite Simpson rule, doubling the number of panels until two successive
/// estimates agree within the absolute accuracy.
#[derive(Debug, Clone)]
pub struct SimpsonIntegral {
    absolute_accuracy: Real,
    max_evaluations: usize,
}

impl SimpsonIntegral {
    /// Create a new Simpson integrator.
    pub fn new(absolute_accuracy: Real, max_evaluations: usize) -> Self {
        Self {
            absolute_accuracy,
            max_evaluations,
        }
    }
}

impl Integrator for SimpsonIntegral {
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<Real> {
        if a == b {
            return Ok(0.0);
        }
        let fa = f(a);
        let fb = f(b);
        let mut n = 1usize;
        let mut previous: Option<Real> = None;
        let mut evaluations = 2usize;

        loop {
            let h = (b - a) / (2 * n) as Real;
            let mut sum_odd = 0.0;
            let mut sum_even = 0.0;
            for i in 1..2 * n {
                let x = a + i as Real * h;
                if i % 2 == 1 {
                    sum_odd += f(x);
                } else {
                    sum_even += f(x);
                }
            }
            evaluations += 2 * n - 1;
            let value = h / 3.0 * (fa + 4.0 * sum_odd + 2.0 * sum_even + fb);

            if let Some(old) = previous {
                if (value - old).abs() < self.absolute_accuracy {
                    return Ok(value);
                }
            }
            if evaluations >= self.max_evaluations {
                return Err(Error::Runtime(format!(
                    "Simpson integration: max evaluations ({}) exceeded",
                    self.max_evaluations
                )));
            }
            previous = Some(value);
            n *= 2;
        }
    }
}
