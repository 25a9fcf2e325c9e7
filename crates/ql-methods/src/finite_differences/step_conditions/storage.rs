use std::sync::Arc;

use ql_core::{ensure, ensure_config, errors::Result, Real, Time};
use ql_math::{Array, Interpolation1D, LinearInterpolation};

use super::{same_time, StepCondition};
use crate::finite_differences::meshers::FdmMesherComposite;

const VOLUME: usize = 0;
const PRICE: usize = 1;

/// Inject/withdraw decision of a storage facility.
///
/// The mesh holds the stored volume along direction 0 and the log-price
/// along direction 1. At a decision time the holder moves from volume `v`
/// to any reachable volume `w` with `|w − v| ≤ change_rate` inside the
/// capacity, paying `(w − v)·price`. Values between volume nodes are
/// linearly interpolated, so the optimum is attained at a node or at the
/// edge of the reachable range, and both kinds of level are checked.
#[derive(Debug, Clone)]
pub struct FdmSimpleStorageCondition {
    exercise_times: Vec<Time>,
    mesher: Arc<FdmMesherComposite>,
    change_rate: Real,
}

impl FdmSimpleStorageCondition {
    /// Decisions at `exercise_times` on a (volume, log-price) mesh.
    pub fn new(
        mut exercise_times: Vec<Time>,
        mesher: Arc<FdmMesherComposite>,
        change_rate: Real,
    ) -> Result<Self> {
        ensure_config!(
            mesher.directions() == 2,
            "storage needs a (volume, log-price) mesh, got {} directions",
            mesher.directions()
        );
        ensure!(change_rate > 0.0, "change rate ({change_rate}) must be positive");
        exercise_times.sort_by(|a, b| a.total_cmp(b));
        Ok(Self {
            exercise_times,
            mesher,
            change_rate,
        })
    }
}

impl StepCondition for FdmSimpleStorageCondition {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        if !self.exercise_times.iter().any(|&e| same_time(t, e)) {
            return Ok(());
        }
        let volumes = self.mesher.mesher(VOLUME).locations();
        let n = volumes.len();
        let (v_min, v_max) = (volumes[0], volumes[n - 1]);
        let layout = self.mesher.layout();
        let stride = layout.spacing()[VOLUME];

        let mut line = vec![0.0; n];
        for start in 0..layout.size() {
            if layout.coordinate(start, VOLUME) != 0 {
                continue;
            }
            let price = self.mesher.location(start, PRICE).exp();
            for (k, v) in line.iter_mut().enumerate() {
                *v = a[start + k * stride];
            }
            let value = LinearInterpolation::new(volumes, &line)?;

            for (k, &v) in volumes.iter().enumerate() {
                let lo = (v - self.change_rate).max(v_min);
                let hi = (v + self.change_rate).min(v_max);
                let payoff = |w: Real| value.operator(w) - (w - v) * price;
                let best = volumes
                    .iter()
                    .copied()
                    .filter(|&w| w >= lo && w <= hi)
                    .chain([lo, hi])
                    .map(payoff)
                    .fold(Real::NEG_INFINITY, Real::max);
                a[start + k * stride] = best;
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.exercise_times.clone()
    }
}
