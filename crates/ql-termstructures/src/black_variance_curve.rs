//! `BlackVarianceCurve`: strike-independent term structure of volatility.
//!
//! Total variance is linearly interpolated in time between pillars, which
//! keeps forward variances piecewise constant. Before the first pillar
//! variance grows linearly from zero; after the last one the last
//! volatility is held flat.

use crate::black_vol_term_structure::BlackVolTermStructure;
use ql_core::{ensure, errors::Result, Real, Time, Volatility};
use ql_math::{Interpolation1D, LinearInterpolation};

/// Black variance curve from `(time, volatility)` pillars.
#[derive(Debug, Clone)]
pub struct BlackVarianceCurve {
    variances: LinearInterpolation,
    last_time: Time,
    last_vol: Volatility,
}

impl BlackVarianceCurve {
    /// Build from strictly increasing positive `times` and volatilities.
    ///
    /// The implied total variance must be non-decreasing.
    pub fn new(times: &[Time], vols: &[Volatility]) -> Result<Self> {
        ensure!(!times.is_empty(), "at least one pillar required");
        ensure!(
            times.len() == vols.len(),
            "times ({}) and vols ({}) differ in length",
            times.len(),
            vols.len()
        );
        ensure!(times[0] > 0.0, "first pillar time must be positive");
        let mut ts = Vec::with_capacity(times.len() + 1);
        let mut vs = Vec::with_capacity(times.len() + 1);
        ts.push(0.0);
        vs.push(0.0);
        for (&t, &v) in times.iter().zip(vols) {
            let var = v * v * t;
            ensure!(
                var >= vs[vs.len() - 1],
                "variance must be non-decreasing, got {var} at t={t}"
            );
            ts.push(t);
            vs.push(var);
        }
        let n = times.len();
        Ok(Self {
            variances: LinearInterpolation::new(&ts, &vs)?,
            last_time: times[n - 1],
            last_vol: vols[n - 1],
        })
    }
}

impl BlackVolTermStructure for BlackVarianceCurve {
    fn black_variance(&self, t: Time, _strike: Real) -> Real {
        if t <= self.last_time {
            self.variances.operator(t.max(0.0))
        } else {
            self.last_vol * self.last_vol * t
        }
    }
}
