//! Three-point stencil along one direction of a multi-dimensional grid.
//!
//! Every flattened row `i` couples the point to its two neighbours along the
//! operator's direction:
//!
//! ```text
//! (L x)[i] = lower[i]·x[i0[i]] + diag[i]·x[i] + upper[i]·x[i2[i]]
//! ```
//!
//! Neighbour indices outside the grid are reflected back inside, and the
//! edge rows always carry a zero on the outward side, so the rows of one
//! grid line never couple to another line.

use std::sync::Arc;

use ql_core::{
    ensure_config, ensure_stable,
    errors::{Error, Result},
    Real, Size,
};
use ql_math::Array;

use crate::finite_differences::meshers::FdmMesherComposite;
use crate::finite_differences::operators::FdmLinearOpLayout;

/// Tridiagonal operator acting along a single direction.
#[derive(Debug, Clone)]
pub struct TripleBandLinearOp {
    direction: Size,
    i0: Arc<Vec<Size>>,
    i2: Arc<Vec<Size>>,
    reverse_index: Arc<Vec<Size>>,
    pub(crate) lower: Vec<Real>,
    pub(crate) diag: Vec<Real>,
    pub(crate) upper: Vec<Real>,
    mesher: Arc<FdmMesherComposite>,
}

/// Entry `i` of a coefficient array, broadcasting arrays of size one.
#[inline]
fn coefficient(a: &Array, i: Size) -> Real {
    if a.size() == 1 {
        a[0]
    } else {
        a[i]
    }
}

impl TripleBandLinearOp {
    /// Zero operator along `direction` of `mesher`.
    pub fn new(direction: Size, mesher: Arc<FdmMesherComposite>) -> Result<Self> {
        let layout = mesher.layout();
        ensure_config!(
            direction < layout.directions(),
            "direction {direction} outside a {}-dimensional mesh",
            layout.directions()
        );
        let size = layout.size();

        let i0 = (0..size)
            .map(|i| layout.neighbourhood(i, direction, -1))
            .collect();
        let i2 = (0..size)
            .map(|i| layout.neighbourhood(i, direction, 1))
            .collect();

        // Ordering in which `direction` varies fastest, so that the rows of
        // one grid line are consecutive for the tridiagonal sweep.
        let mut swapped_dim = layout.dim().to_vec();
        swapped_dim.swap(0, direction);
        let swapped = FdmLinearOpLayout::new(swapped_dim)?;
        let mut reverse_index = vec![0; size];
        for point in layout.iter() {
            let mut coordinates = point.coordinates;
            coordinates.swap(0, direction);
            reverse_index[swapped.index(&coordinates)] = point.index;
        }

        Ok(Self {
            direction,
            i0: Arc::new(i0),
            i2: Arc::new(i2),
            reverse_index: Arc::new(reverse_index),
            lower: vec![0.0; size],
            diag: vec![0.0; size],
            upper: vec![0.0; size],
            mesher,
        })
    }

    /// Direction the operator acts along.
    pub fn direction(&self) -> Size {
        self.direction
    }

    /// Number of rows.
    pub fn size(&self) -> Size {
        self.diag.len()
    }

    /// Mesh the operator is defined on.
    pub fn mesher(&self) -> &Arc<FdmMesherComposite> {
        &self.mesher
    }

    /// Band coefficients `(lower, diag, upper)` of row `i`.
    pub fn row(&self, i: Size) -> (Real, Real, Real) {
        (self.lower[i], self.diag[i], self.upper[i])
    }

    fn zeroed(&self) -> Self {
        let n = self.size();
        Self {
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
            ..self.clone()
        }
    }

    fn check_size(&self, what: &str, n: Size) -> Result<()> {
        ensure_config!(
            n == self.size(),
            "{what} has size {n}, operator has {} rows",
            self.size()
        );
        Ok(())
    }

    /// `L x`.
    pub fn apply(&self, x: &Array) -> Result<Array> {
        self.check_size("input array", x.size())?;
        Ok(Array::from_fn(self.size(), |i| {
            self.lower[i] * x[self.i0[i]] + self.diag[i] * x[i] + self.upper[i] * x[self.i2[i]]
        }))
    }

    /// Solve `(a·L + b·I) x = r` along the operator's direction.
    pub fn solve_splitting(&self, r: &Array, a: Real, b: Real) -> Result<Array> {
        self.check_size("right-hand side", r.size())?;
        let n = self.size();
        let rev = &self.reverse_index;
        let mut ret = Array::zeros(n);
        let mut tmp = vec![0.0; n];

        let mut rim1 = rev[0];
        let pivot = a * self.diag[rim1] + b;
        ensure_stable!(pivot != 0.0, "zero pivot in tridiagonal solve at row {rim1}");
        let mut bet = 1.0 / pivot;
        ret[rim1] = r[rim1] * bet;

        for j in 1..n {
            let ri = rev[j];
            tmp[j] = a * self.upper[rim1] * bet;
            let pivot = b + a * (self.diag[ri] - tmp[j] * self.lower[ri]);
            ensure_stable!(pivot != 0.0, "zero pivot in tridiagonal solve at row {ri}");
            bet = 1.0 / pivot;
            ret[ri] = (r[ri] - a * self.lower[ri] * ret[rim1]) * bet;
            rim1 = ri;
        }

        for j in (0..n - 1).rev() {
            let correction = tmp[j + 1] * ret[rev[j + 1]];
            ret[rev[j]] -= correction;
        }

        if !ret.is_finite() {
            return Err(Error::NumericalInstability(
                "tridiagonal solve produced non-finite values".into(),
            ));
        }
        Ok(ret)
    }

    /// Set `self = y + a∘x + b` (diagonal shift by `b`).
    ///
    /// `a` scales the rows of `x`; both `a` and `b` may have size one, in
    /// which case they act as scalars.
    pub fn axpyb(
        &mut self,
        a: Option<&Array>,
        x: &TripleBandLinearOp,
        y: &TripleBandLinearOp,
        b: Option<&Array>,
    ) -> Result<()> {
        ensure_config!(
            x.direction == y.direction && y.direction == self.direction,
            "operators along different directions cannot be combined"
        );
        self.check_size("x", x.size())?;
        self.check_size("y", y.size())?;
        if let Some(a) = a {
            ensure_config!(a.size() == 1 || a.size() == self.size(), "coefficient a has wrong size");
        }
        if let Some(b) = b {
            ensure_config!(b.size() == 1 || b.size() == self.size(), "coefficient b has wrong size");
        }

        for i in 0..self.size() {
            let s = a.map_or(0.0, |a| coefficient(a, i));
            let shift = b.map_or(0.0, |b| coefficient(b, i));
            self.lower[i] = y.lower[i] + s * x.lower[i];
            self.diag[i] = y.diag[i] + s * x.diag[i] + shift;
            self.upper[i] = y.upper[i] + s * x.upper[i];
        }
        Ok(())
    }

    /// `self + other`; both must act along the same direction.
    pub fn add(&self, other: &TripleBandLinearOp) -> Result<Self> {
        ensure_config!(
            self.direction == other.direction,
            "cannot add operators along directions {} and {}",
            self.direction,
            other.direction
        );
        self.check_size("other operator", other.size())?;
        let mut ret = self.zeroed();
        for i in 0..self.size() {
            ret.lower[i] = self.lower[i] + other.lower[i];
            ret.diag[i] = self.diag[i] + other.diag[i];
            ret.upper[i] = self.upper[i] + other.upper[i];
        }
        Ok(ret)
    }

    /// `self + diag(u)`.
    pub fn add_array(&self, u: &Array) -> Result<Self> {
        self.check_size("diagonal", u.size())?;
        let mut ret = self.clone();
        for (d, &ui) in ret.diag.iter_mut().zip(u.iter()) {
            *d += ui;
        }
        Ok(ret)
    }

    /// `diag(u) · self`: row `i` scaled by `u[i]`.
    pub fn mult(&self, u: &Array) -> Result<Self> {
        self.check_size("row scaling", u.size())?;
        let mut ret = self.clone();
        for i in 0..self.size() {
            ret.lower[i] *= u[i];
            ret.diag[i] *= u[i];
            ret.upper[i] *= u[i];
        }
        Ok(ret)
    }

    /// `self · s`.
    pub fn scale(&self, s: Real) -> Self {
        let mut ret = self.clone();
        for v in ret
            .lower
            .iter_mut()
            .chain(ret.diag.iter_mut())
            .chain(ret.upper.iter_mut())
        {
            *v *= s;
        }
        ret
    }

    /// Zero the listed rows.
    pub fn clear_rows(&mut self, rows: &[Size]) {
        for &i in rows {
            self.lower[i] = 0.0;
            self.diag[i] = 0.0;
            self.upper[i] = 0.0;
        }
    }

    /// Turn the listed edge rows into `coefficient·x[inner]`, where `inner`
    /// is the neighbour of the edge point inside the grid line.
    pub fn couple_edge_rows(&mut self, rows: &[Size], coefficient: Real) {
        let layout = Arc::clone(self.mesher.layout());
        for &i in rows {
            self.diag[i] = 0.0;
            if layout.coordinate(i, self.direction) == 0 {
                self.lower[i] = 0.0;
                self.upper[i] = coefficient;
            } else {
                self.lower[i] = coefficient;
                self.upper[i] = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Fdm1dMesher;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn mesh(dims: &[(Real, Real, Size)]) -> Arc<FdmMesherComposite> {
        let meshers = dims
            .iter()
            .map(|&(a, b, n)| Arc::new(Fdm1dMesher::uniform(a, b, n).unwrap()))
            .collect();
        Arc::new(FdmMesherComposite::new(meshers).unwrap())
    }

    /// Random diagonally dominant operator along `direction`.
    fn dominant(direction: Size, m: Arc<FdmMesherComposite>, seed: &[Real]) -> TripleBandLinearOp {
        let mut op = TripleBandLinearOp::new(direction, m).unwrap();
        let layout = Arc::clone(op.mesher().layout());
        let last = layout.dim()[direction] - 1;
        for i in 0..op.size() {
            let c = layout.coordinate(i, direction);
            let s = seed[i % seed.len()];
            op.lower[i] = if c == 0 { 0.0 } else { -0.3 - 0.1 * s };
            op.upper[i] = if c == last { 0.0 } else { -0.2 - 0.1 * s };
            op.diag[i] = 2.0 + s;
        }
        op
    }

    #[test]
    fn reverse_index_groups_lines() {
        let m = mesh(&[(0.0, 1.0, 3), (0.0, 1.0, 4)]);
        let op = TripleBandLinearOp::new(1, m).unwrap();
        assert_eq!(&op.reverse_index[..4], &[0, 3, 6, 9]);
        assert_eq!(&op.reverse_index[4..8], &[1, 4, 7, 10]);
        assert_eq!(op.i0[0], 3);
        assert_eq!(op.i2[9], 6);
    }

    #[test]
    fn rejects_bad_direction() {
        let m = mesh(&[(0.0, 1.0, 3)]);
        assert!(TripleBandLinearOp::new(1, m).unwrap_err().is_configuration());
    }

    #[test]
    fn add_requires_same_direction() {
        let m = mesh(&[(0.0, 1.0, 3), (0.0, 1.0, 3)]);
        let a = TripleBandLinearOp::new(0, Arc::clone(&m)).unwrap();
        let b = TripleBandLinearOp::new(1, m).unwrap();
        assert!(a.add(&b).unwrap_err().is_configuration());
    }

    #[test]
    fn axpyb_broadcasts_scalars() {
        let m = mesh(&[(0.0, 1.0, 4)]);
        let x = dominant(0, Arc::clone(&m), &[0.5]);
        let y = dominant(0, Arc::clone(&m), &[1.0]);
        let mut z = TripleBandLinearOp::new(0, m).unwrap();
        z.axpyb(Some(&Array::from_element(1, 2.0)), &x, &y, Some(&Array::from_element(1, 1.0)))
            .unwrap();
        for i in 0..4 {
            assert_abs_diff_eq!(z.diag[i], y.diag[i] + 2.0 * x.diag[i] + 1.0, epsilon = 1e-15);
            assert_abs_diff_eq!(z.upper[i], y.upper[i] + 2.0 * x.upper[i], epsilon = 1e-15);
        }
    }

    #[test]
    fn zero_pivot_is_instability() {
        let m = mesh(&[(0.0, 1.0, 3)]);
        let op = TripleBandLinearOp::new(0, m).unwrap();
        let err = op.solve_splitting(&Array::from_element(3, 1.0), 1.0, 0.0).unwrap_err();
        assert!(err.is_numerical_instability());
    }

    #[test]
    fn coupled_edge_rows_become_differences_in_solves() {
        let m = mesh(&[(0.0, 1.0, 3), (0.0, 1.0, 5)]);
        let mut op = dominant(1, Arc::clone(&m), &[0.2, 0.7]);
        let lower: Vec<Size> = (0..3).collect();
        let upper: Vec<Size> = (12..15).collect();
        let w = 0.25;
        op.couple_edge_rows(&lower, 1.0 / w);
        op.couple_edge_rows(&upper, 1.0 / w);

        let mut r = Array::from_fn(op.size(), |i| (i as Real * 0.3).cos());
        for &i in lower.iter().chain(&upper) {
            r[i] = 0.5;
        }
        // (I − w·L) x = r
        let x = op.solve_splitting(&r, -w, 1.0).unwrap();
        for k in 0..3 {
            assert_abs_diff_eq!(x[k] - x[k + 3], 0.5, epsilon = 1e-12);
            assert_abs_diff_eq!(x[12 + k] - x[9 + k], 0.5, epsilon = 1e-12);
        }
    }

    proptest! {
        #[test]
        fn solve_inverts_apply(
            seed in prop::collection::vec(0.0f64..1.0, 1..7),
            direction in 0usize..2,
            a in 0.1f64..2.0,
        ) {
            let m = mesh(&[(0.0, 1.0, 5), (0.0, 2.0, 4)]);
            let op = dominant(direction, m, &seed);
            let x = Array::from_fn(op.size(), |i| (i as Real * 0.37).sin());
            // r = (a·L + I) x
            let r = &(&op.apply(&x).unwrap() * a) + &x;
            let y = op.solve_splitting(&r, a, 1.0).unwrap();
            for i in 0..x.size() {
                prop_assert!((x[i] - y[i]).abs() < 1e-10);
            }
        }
    }
}
