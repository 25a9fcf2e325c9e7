//! Payoff values on the mesh.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use ql_core::{Real, Size, Time};
use ql_instruments::Payoff;
use ql_math::{Integrator, SimpsonIntegral};
use tracing::warn;

use crate::finite_differences::meshers::FdmMesherComposite;

/// Exercise value of an instrument at a grid point.
pub trait FdmInnerValueCalculator: fmt::Debug + Send + Sync {
    /// Value at the grid point `index` at time `t`.
    fn inner_value(&self, index: Size, t: Time) -> Real;

    /// Value averaged over the cell around `index`, used for the terminal
    /// condition so that payoff kinks between nodes are smoothed.
    fn avg_inner_value(&self, index: Size, t: Time) -> Real;
}

/// Payoff of `exp(x)` where `x` is the log-spot along one direction.
pub struct FdmLogInnerValue {
    payoff: Arc<dyn Payoff>,
    mesher: Arc<FdmMesherComposite>,
    direction: Size,
    averages: Mutex<HashMap<Size, Real>>,
}

impl fmt::Debug for FdmLogInnerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FdmLogInnerValue")
            .field("payoff", &self.payoff)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

impl FdmLogInnerValue {
    /// Calculator for `payoff` on the log-spot direction `direction`.
    pub fn new(payoff: Arc<dyn Payoff>, mesher: Arc<FdmMesherComposite>, direction: Size) -> Self {
        Self {
            payoff,
            mesher,
            direction,
            averages: Mutex::new(HashMap::new()),
        }
    }

    fn cell_average(&self, index: Size) -> Real {
        let x = self.mesher.location(index, self.direction);
        let (Some(hm), Some(hp)) = (
            self.mesher.dminus(index, self.direction),
            self.mesher.dplus(index, self.direction),
        ) else {
            return self.payoff.value(x.exp());
        };
        let a = x - 0.5 * hm;
        let b = x + 0.5 * hp;
        let f = |y: Real| self.payoff.value(y.exp());
        let scale = (f(a) + f(b)).abs();
        let accuracy = if scale > 0.0 { scale * 5e-5 } else { 1e-4 };
        SimpsonIntegral::new(accuracy, 1000)
            .integrate(f, a, b)
            .map(|v| v / (b - a))
            .unwrap_or_else(|e| {
                warn!(index, error = %e, "cell average failed, using the point payoff");
                self.payoff.value(x.exp())
            })
    }
}

impl FdmInnerValueCalculator for FdmLogInnerValue {
    fn inner_value(&self, index: Size, _t: Time) -> Real {
        self.payoff
            .value(self.mesher.location(index, self.direction).exp())
    }

    fn avg_inner_value(&self, index: Size, _t: Time) -> Real {
        let coordinate = self.mesher.layout().coordinate(index, self.direction);
        if let Ok(cache) = self.averages.lock() {
            if let Some(&v) = cache.get(&coordinate) {
                return v;
            }
        }
        let v = self.cell_average(index);
        if let Ok(mut cache) = self.averages.lock() {
            cache.insert(coordinate, v);
        }
        v
    }
}

/// Inner value that is zero everywhere; for problems whose value comes
/// entirely from step conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FdmZeroInnerValue;

impl FdmInnerValueCalculator for FdmZeroInnerValue {
    fn inner_value(&self, _index: Size, _t: Time) -> Real {
        0.0
    }

    fn avg_inner_value(&self, _index: Size, _t: Time) -> Real {
        0.0
    }
}
