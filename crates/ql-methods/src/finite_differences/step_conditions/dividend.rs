use std::sync::Arc;

use ql_core::{ensure_config, errors::Result, Real, Size, Time};
use ql_instruments::Dividend;
use ql_math::{Array, Interpolation1D, LinearInterpolation};

use super::{same_time, StepCondition};
use crate::finite_differences::meshers::FdmMesherComposite;

/// Cash dividends on a log-spot direction.
///
/// Just before the payment the holder owns the value of the stock after the
/// drop, so at a dividend time every grid line along the equity direction
/// is replaced by its values at `S − D`, linearly interpolated in spot and
/// floored at the lowest grid spot.
#[derive(Debug, Clone)]
pub struct FdmDividendHandler {
    dividends: Vec<Dividend>,
    mesher: Arc<FdmMesherComposite>,
    direction: Size,
    spots: Vec<Real>,
}

impl FdmDividendHandler {
    /// Handler for `dividends` along `direction`, whose locations are
    /// log-spots.
    pub fn new(
        mut dividends: Vec<Dividend>,
        mesher: Arc<FdmMesherComposite>,
        direction: Size,
    ) -> Result<Self> {
        ensure_config!(
            direction < mesher.directions(),
            "dividend direction {direction} outside a {}-dimensional mesh",
            mesher.directions()
        );
        dividends.sort_by(|a, b| a.time.total_cmp(&b.time));
        let spots = mesher
            .mesher(direction)
            .locations()
            .iter()
            .map(|x| x.exp())
            .collect();
        Ok(Self {
            dividends,
            mesher,
            direction,
            spots,
        })
    }

    /// Dividends, sorted by time.
    pub fn dividends(&self) -> &[Dividend] {
        &self.dividends
    }
}

impl StepCondition for FdmDividendHandler {
    fn apply_to(&self, a: &mut Array, t: Time) -> Result<()> {
        let amount: Real = self
            .dividends
            .iter()
            .filter(|d| same_time(t, d.time))
            .map(|d| d.amount)
            .sum();
        if amount == 0.0 {
            return Ok(());
        }

        let layout = self.mesher.layout();
        let n = self.spots.len();
        let stride = layout.spacing()[self.direction];
        let s_min = self.spots[0];

        let mut line = vec![0.0; n];
        for start in 0..layout.size() {
            if layout.coordinate(start, self.direction) != 0 {
                continue;
            }
            for (k, v) in line.iter_mut().enumerate() {
                *v = a[start + k * stride];
            }
            let interpolation = LinearInterpolation::new(&self.spots, &line)?;
            for (k, &s) in self.spots.iter().enumerate() {
                a[start + k * stride] = interpolation.operator((s - amount).max(s_min));
            }
        }
        Ok(())
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.dividends.iter().map(|d| d.time).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Fdm1dMesher;
    use approx::assert_abs_diff_eq;

    #[test]
    fn shifts_each_line_by_the_cash_amount() {
        let spot = Fdm1dMesher::from_locations((1..=5).map(|s| (10.0 * s as Real).ln()).collect())
            .unwrap();
        let other = Fdm1dMesher::uniform(0.0, 1.0, 2).unwrap();
        let m = Arc::new(FdmMesherComposite::new(vec![Arc::new(other), Arc::new(spot)]).unwrap());
        let handler =
            FdmDividendHandler::new(vec![Dividend::new(0.5, 5.0).unwrap()], Arc::clone(&m), 1).unwrap();

        // value = spot on the first line, twice the spot on the second
        let mut a = Array::from_fn(m.size(), |i| {
            let s = m.location(i, 1).exp();
            if m.layout().coordinate(i, 0) == 0 { s } else { 2.0 * s }
        });
        handler.apply_to(&mut a, 0.5).unwrap();
        let expected = [10.0, 15.0, 25.0, 35.0, 45.0];
        for (k, e) in expected.iter().enumerate() {
            assert_abs_diff_eq!(a[2 * k], *e, epsilon = 1e-10);
            assert_abs_diff_eq!(a[2 * k + 1], 2.0 * e, epsilon = 1e-10);
        }
        assert_eq!(handler.stopping_times(), vec![0.5]);
    }
}
