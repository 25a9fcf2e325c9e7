//! Nine-point stencil coupling two directions.

use std::sync::Arc;

use ql_core::{ensure_config, errors::Result, Real, Size};
use ql_math::Array;

use super::derivatives::first_derivative_weights;
use crate::finite_differences::meshers::FdmMesherComposite;

/// Operator whose row `i` reads the 3×3 neighbourhood of point `i` in the
/// plane of two directions.
///
/// Entry `3·j + k` of a row belongs to the neighbour shifted by `j − 1`
/// along the first direction and `k − 1` along the second.
#[derive(Debug, Clone)]
pub struct NinePointLinearOp {
    d0: Size,
    d1: Size,
    index: Arc<Vec<[Size; 9]>>,
    coefficients: Vec<[Real; 9]>,
    mesher: Arc<FdmMesherComposite>,
}

impl NinePointLinearOp {
    /// Zero operator in the plane of directions `d0` and `d1`.
    pub fn new(d0: Size, d1: Size, mesher: Arc<FdmMesherComposite>) -> Result<Self> {
        let layout = mesher.layout();
        let n_dir = layout.directions();
        ensure_config!(
            d0 != d1 && d0 < n_dir && d1 < n_dir,
            "invalid direction pair ({d0}, {d1}) on a {n_dir}-dimensional mesh"
        );
        let index = (0..layout.size())
            .map(|i| {
                let mut row = [0; 9];
                for (k, slot) in row.iter_mut().enumerate() {
                    let o0 = (k / 3) as isize - 1;
                    let o1 = (k % 3) as isize - 1;
                    *slot = layout.neighbourhood2(i, d0, o0, d1, o1);
                }
                row
            })
            .collect();
        Ok(Self {
            d0,
            d1,
            index: Arc::new(index),
            coefficients: vec![[0.0; 9]; layout.size()],
            mesher,
        })
    }

    /// The two directions.
    pub fn directions(&self) -> (Size, Size) {
        (self.d0, self.d1)
    }

    /// Number of rows.
    pub fn size(&self) -> Size {
        self.coefficients.len()
    }

    /// Mesh the operator is defined on.
    pub fn mesher(&self) -> &Arc<FdmMesherComposite> {
        &self.mesher
    }

    /// `L x`.
    pub fn apply(&self, x: &Array) -> Result<Array> {
        ensure_config!(
            x.size() == self.size(),
            "input array has size {}, operator has {} rows",
            x.size(),
            self.size()
        );
        Ok(Array::from_fn(self.size(), |i| {
            self.index[i]
                .iter()
                .zip(&self.coefficients[i])
                .map(|(&j, &c)| c * x[j])
                .sum()
        }))
    }

    /// `diag(u) · self`.
    pub fn mult(&self, u: &Array) -> Result<Self> {
        ensure_config!(u.size() == self.size(), "row scaling has wrong size");
        let mut ret = self.clone();
        for (row, &s) in ret.coefficients.iter_mut().zip(u.iter()) {
            row.iter_mut().for_each(|c| *c *= s);
        }
        Ok(ret)
    }

    /// Zero the listed rows.
    pub fn clear_rows(&mut self, rows: &[Size]) {
        for &i in rows {
            self.coefficients[i] = [0.0; 9];
        }
    }
}

/// `∂²/∂x∂y` as the tensor product of two first-derivative stencils.
///
/// Edges and corners use the one-sided first-derivative weights of the
/// affected direction.
#[derive(Debug, Clone)]
pub struct SecondOrderMixedDerivativeOp(NinePointLinearOp);

impl SecondOrderMixedDerivativeOp {
    /// Build the stencil in the plane of `d0` and `d1`.
    pub fn new(d0: Size, d1: Size, mesher: Arc<FdmMesherComposite>) -> Result<Self> {
        let mut op = NinePointLinearOp::new(d0, d1, Arc::clone(&mesher))?;
        for (i, row) in op.coefficients.iter_mut().enumerate() {
            let (l0, c0, u0) = first_derivative_weights(mesher.dminus(i, d0), mesher.dplus(i, d0));
            let (l1, c1, u1) = first_derivative_weights(mesher.dminus(i, d1), mesher.dplus(i, d1));
            let w0 = [l0, c0, u0];
            let w1 = [l1, c1, u1];
            for (k, c) in row.iter_mut().enumerate() {
                *c = w0[k / 3] * w1[k % 3];
            }
        }
        Ok(Self(op))
    }

    /// The underlying nine-point operator.
    pub fn into_inner(self) -> NinePointLinearOp {
        self.0
    }
}

impl std::ops::Deref for SecondOrderMixedDerivativeOp {
    type Target = NinePointLinearOp;
    fn deref(&self) -> &NinePointLinearOp {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::meshers::Fdm1dMesher;
    use approx::assert_abs_diff_eq;

    fn mesher() -> Arc<FdmMesherComposite> {
        let x = Fdm1dMesher::from_locations(vec![0.0, 0.2, 0.5, 0.6, 1.0]).unwrap();
        let y = Fdm1dMesher::uniform(-1.0, 1.0, 4).unwrap();
        Arc::new(FdmMesherComposite::new(vec![Arc::new(x), Arc::new(y)]).unwrap())
    }

    #[test]
    fn exact_on_bilinear_functions() {
        let m = mesher();
        let f = Array::from_fn(m.size(), |i| {
            let (x, y) = (m.location(i, 0), m.location(i, 1));
            2.0 * x * y + x - 3.0 * y
        });
        let op = SecondOrderMixedDerivativeOp::new(0, 1, Arc::clone(&m)).unwrap();
        let r = op.apply(&f).unwrap();
        // corners and edges included
        for i in 0..m.size() {
            assert_abs_diff_eq!(r[i], 2.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn interior_quadratic_cross_term() {
        let m = mesher();
        let f = Array::from_fn(m.size(), |i| {
            let (x, y) = (m.location(i, 0), m.location(i, 1));
            x * x * y
        });
        let r = SecondOrderMixedDerivativeOp::new(0, 1, Arc::clone(&m)).unwrap().apply(&f).unwrap();
        for i in 0..m.size() {
            let c = m.layout().coordinates(i);
            if c[0] > 0 && c[0] < 4 {
                assert_abs_diff_eq!(r[i], 2.0 * m.location(i, 0), epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn rows_clear_and_scale() {
        let m = mesher();
        let op = SecondOrderMixedDerivativeOp::new(0, 1, Arc::clone(&m)).unwrap();
        let f = Array::from_fn(m.size(), |i| m.location(i, 0) * m.location(i, 1));
        let mut scaled = op.mult(&Array::from_element(m.size(), 3.0)).unwrap();
        scaled.clear_rows(&[0, 7]);
        let r = scaled.apply(&f).unwrap();
        assert_eq!(r[0], 0.0);
        assert_eq!(r[7], 0.0);
        assert_abs_diff_eq!(r[6], 3.0, epsilon = 1e-10);
        assert!(NinePointLinearOp::new(1, 1, m).is_err());
    }
}
