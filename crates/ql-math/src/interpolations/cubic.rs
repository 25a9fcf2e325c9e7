//! Natural cubic spline with an optional Hyman monotonicity filter.
//!
//! Node tangents solve the tridiagonal system of a C² spline with vanishing
//! second derivative at both ends. The monotonic variant then clips each
//! tangent into the Hyman region, trading C² continuity for shape
//! preservation: the filtered spline never overshoots monotone data, which
//! keeps interpolated option values and deltas free of spurious wiggles.

use ql_core::{errors::Result, Real};

use super::{check_nodes, locate, Interpolation1D};

/// Cubic spline `f(x) = yᵢ + dx·(aᵢ + dx·(bᵢ + dx·cᵢ))` on each interval.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    a: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
}

impl CubicNaturalSpline {
    /// C² natural spline through the nodes.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        Self::build(xs, ys, false)
    }

    /// Natural spline with tangents filtered for monotonicity.
    pub fn monotonic(xs: &[Real], ys: &[Real]) -> Result<Self> {
        Self::build(xs, ys, true)
    }

    fn build(xs: &[Real], ys: &[Real], monotonic: bool) -> Result<Self> {
        check_nodes(xs, ys)?;
        let n = xs.len();
        let dx: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let s: Vec<Real> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / dx[i]).collect();

        let mut ts = natural_tangents(&dx, &s);
        if monotonic {
            hyman_filter(&mut ts, &dx, &s);
        }

        let mut a = Vec::with_capacity(n - 1);
        let mut b = Vec::with_capacity(n - 1);
        let mut c = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            a.push(ts[i]);
            b.push((3.0 * s[i] - ts[i + 1] - 2.0 * ts[i]) / dx[i]);
            c.push((ts[i + 1] + ts[i] - 2.0 * s[i]) / (dx[i] * dx[i]));
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            a,
            b,
            c,
        })
    }
}

/// Tangents of the natural spline (Thomas algorithm on the standard system).
fn natural_tangents(dx: &[Real], s: &[Real]) -> Vec<Real> {
    let n = dx.len() + 1;
    let mut lower = vec![0.0; n];
    let mut diag = vec![0.0; n];
    let mut upper = vec![0.0; n];
    let mut rhs = vec![0.0; n];

    diag[0] = 2.0;
    upper[0] = 1.0;
    rhs[0] = 3.0 * s[0];
    for i in 1..n - 1 {
        lower[i] = dx[i];
        diag[i] = 2.0 * (dx[i] + dx[i - 1]);
        upper[i] = dx[i - 1];
        rhs[i] = 3.0 * (dx[i] * s[i - 1] + dx[i - 1] * s[i]);
    }
    lower[n - 1] = 1.0;
    diag[n - 1] = 2.0;
    rhs[n - 1] = 3.0 * s[n - 2];

    // the system is strictly diagonally dominant, pivots never vanish
    let mut gamma = vec![0.0; n];
    let mut ts = vec![0.0; n];
    let mut bet = diag[0];
    ts[0] = rhs[0] / bet;
    for i in 1..n {
        gamma[i] = upper[i - 1] / bet;
        bet = diag[i] - lower[i] * gamma[i];
        ts[i] = (rhs[i] - lower[i] * ts[i - 1]) / bet;
    }
    for i in (0..n - 1).rev() {
        ts[i] -= gamma[i + 1] * ts[i + 1];
    }
    ts
}

/// Hyman (1983) filter on the node tangents.
fn hyman_filter(ts: &mut [Real], dx: &[Real], s: &[Real]) {
    let n = ts.len();
    let clip = |t: Real, bound: Real, sign_ref: Real| -> Real {
        if t * sign_ref > 0.0 {
            t.signum() * t.abs().min(bound)
        } else {
            0.0
        }
    };

    for i in 0..n {
        if i == 0 {
            ts[0] = clip(ts[0], (3.0 * s[0]).abs(), s[0]);
        } else if i == n - 1 {
            ts[i] = clip(ts[i], (3.0 * s[n - 2]).abs(), s[n - 2]);
        } else {
            let pm = (s[i - 1] * dx[i] + s[i] * dx[i - 1]) / (dx[i - 1] + dx[i]);
            let mut m = 3.0 * s[i - 1].abs().min(s[i].abs()).min(pm.abs());
            if i > 1 && (s[i - 1] - s[i - 2]) * (s[i] - s[i - 1]) > 0.0 {
                let pd = (s[i - 1] * (2.0 * dx[i - 1] + dx[i - 2]) - s[i - 2] * dx[i - 1])
                    / (dx[i - 2] + dx[i - 1]);
                if pm * pd > 0.0 && pm * (s[i - 1] - s[i - 2]) > 0.0 {
                    m = m.max(1.5 * pm.abs().min(pd.abs()));
                }
            }
            if i < n - 2 && (s[i] - s[i - 1]) * (s[i + 1] - s[i]) > 0.0 {
                let pu = (s[i] * (2.0 * dx[i] + dx[i + 1]) - s[i + 1] * dx[i])
                    / (dx[i] + dx[i + 1]);
                if pm * pu > 0.0 && -pm * (s[i] - s[i - 1]) > 0.0 {
                    m = m.max(1.5 * pm.abs().min(pu.abs()));
                }
            }
            ts[i] = clip(ts[i], m, pm);
        }
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn operator(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.ys[i] + dx * (self.a[i] + dx * (self.b[i] + dx * self.c[i]))
    }

    fn derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.a[i] + dx * (2.0 * self.b[i] + 3.0 * dx * self.c[i])
    }

    fn second_derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        2.0 * self.b[i] + 6.0 * dx * self.c[i]
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exact_on_nodes() {
        let xs = [0.0, 0.7, 1.5, 3.0, 4.0];
        let ys = [0.0, 1.0, 1.5, 3.0, 5.0];
        for s in [
            CubicNaturalSpline::new(&xs, &ys).unwrap(),
            CubicNaturalSpline::monotonic(&xs, &ys).unwrap(),
        ] {
            for (&x, &y) in xs.iter().zip(ys.iter()) {
                assert_abs_diff_eq!(s.operator(x), y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn natural_end_conditions() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 0.0, 2.0, 1.0];
        let s = CubicNaturalSpline::new(&xs, &ys).unwrap();
        assert_abs_diff_eq!(s.second_derivative(0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.second_derivative(3.0), 0.0, epsilon = 1e-12);
        // C² at an interior knot
        let left = s.second_derivative(1.0 - 1e-9);
        let right = s.second_derivative(1.0 + 1e-9);
        assert_abs_diff_eq!(left, right, epsilon = 1e-6);
    }

    #[test]
    fn reproduces_linear_data() {
        let xs = [0.0, 0.5, 2.0, 2.5, 4.0];
        let ys: Vec<Real> = xs.iter().map(|x| 3.0 * x - 1.0).collect();
        let s = CubicNaturalSpline::monotonic(&xs, &ys).unwrap();
        assert_abs_diff_eq!(s.operator(1.3), 2.9, epsilon = 1e-12);
        assert_abs_diff_eq!(s.derivative(3.1), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.second_derivative(3.1), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn smooth_function_derivatives() {
        let xs: Vec<Real> = (0..=40).map(|i| i as Real * 0.05).collect();
        let ys: Vec<Real> = xs.iter().map(|x| x.exp()).collect();
        let s = CubicNaturalSpline::monotonic(&xs, &ys).unwrap();
        let x = 1.02;
        assert_abs_diff_eq!(s.operator(x), x.exp(), epsilon = 1e-5);
        assert_abs_diff_eq!(s.derivative(x), x.exp(), epsilon = 1e-3);
        assert_abs_diff_eq!(s.second_derivative(x), x.exp(), epsilon = 5e-2);
    }

    #[test]
    fn monotonic_step_stays_in_range() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 0.0, 1.0, 1.0, 1.0];
        let s = CubicNaturalSpline::monotonic(&xs, &ys).unwrap();
        let mut prev = Real::NEG_INFINITY;
        for i in 0..=400 {
            let v = s.operator(4.0 * i as Real / 400.0);
            assert!((-1e-12..=1.0 + 1e-12).contains(&v), "overshoot: {v}");
            assert!(v >= prev - 1e-12);
            prev = v;
        }
    }
}
