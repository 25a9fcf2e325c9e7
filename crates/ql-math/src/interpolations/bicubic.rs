//! Bicubic spline on a rectangular grid.
//!
//! One natural cubic spline per `y` row interpolates along `x`; a query at
//! `(x, y)` evaluates every row spline at `x` and interpolates the resulting
//! column along `y` with another natural spline.

use ql_core::{ensure, errors::Result, Real};

use super::{CubicNaturalSpline, Interpolation1D};

/// Bicubic spline interpolation.
///
/// `z` is row-major in `x`: `z[j * nx + i] = f(xs[i], ys[j])`, which is the
/// flattened ordering of a two-direction finite-difference grid.
#[derive(Debug, Clone)]
pub struct BicubicSpline {
    ys: Vec<Real>,
    row_splines: Vec<CubicNaturalSpline>,
}

impl BicubicSpline {
    /// Build the spline on the grid `xs × ys`.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        let nx = xs.len();
        let ny = ys.len();
        ensure!(nx >= 2 && ny >= 2, "bicubic spline needs at least 2×2 nodes");
        ensure!(
            z.len() == nx * ny,
            "z length ({}) must equal nx*ny ({nx}*{ny})",
            z.len()
        );
        let row_splines = z
            .chunks(nx)
            .map(|row| CubicNaturalSpline::new(xs, row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            ys: ys.to_vec(),
            row_splines,
        })
    }

    fn column<F: Fn(&CubicNaturalSpline) -> Real>(&self, f: F) -> Result<CubicNaturalSpline> {
        let values: Vec<Real> = self.row_splines.iter().map(f).collect();
        CubicNaturalSpline::new(&self.ys, &values)
    }

    /// Value at `(x, y)`.
    pub fn value(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.column(|s| s.operator(x))?.operator(y))
    }

    /// `∂f/∂x` at `(x, y)`.
    pub fn derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.column(|s| s.derivative(x))?.operator(y))
    }

    /// `∂²f/∂x²` at `(x, y)`.
    pub fn second_derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.column(|s| s.second_derivative(x))?.operator(y))
    }

    /// `∂f/∂y` at `(x, y)`.
    pub fn derivative_y(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.column(|s| s.operator(x))?.derivative(y))
    }

    /// `∂²f/∂y²` at `(x, y)`.
    pub fn second_derivative_y(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.column(|s| s.operator(x))?.second_derivative(y))
    }

    /// `∂²f/∂x∂y` at `(x, y)`.
    pub fn derivative_xy(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.column(|s| s.derivative(x))?.derivative(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid<F: Fn(Real, Real) -> Real>(xs: &[Real], ys: &[Real], f: F) -> Vec<Real> {
        ys.iter()
            .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect()
    }

    #[test]
    fn exact_on_grid() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 0.5, 2.0];
        let z = grid(&xs, &ys, |x, y| (x * y).sin());
        let s = BicubicSpline::new(&xs, &ys, &z).unwrap();
        for &y in &ys {
            for &x in &xs {
                assert_abs_diff_eq!(s.value(x, y).unwrap(), (x * y).sin(), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn reproduces_bilinear_function() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 1.0, 2.0, 3.0];
        let z = grid(&xs, &ys, |x, y| 2.0 * x + 3.0 * y + x * y + 1.0);
        let s = BicubicSpline::new(&xs, &ys, &z).unwrap();
        let (x, y) = (1.5, 2.5);
        assert_abs_diff_eq!(s.value(x, y).unwrap(), 2.0 * x + 3.0 * y + x * y + 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.derivative_x(x, y).unwrap(), 2.0 + y, epsilon = 1e-12);
        assert_abs_diff_eq!(s.derivative_y(x, y).unwrap(), 3.0 + x, epsilon = 1e-12);
        assert_abs_diff_eq!(s.derivative_xy(x, y).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.second_derivative_x(x, y).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_mismatched_values() {
        assert!(BicubicSpline::new(&[0.0, 1.0], &[0.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
    }
}
