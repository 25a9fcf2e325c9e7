//! Interpolation traits and the piecewise-linear scheme.
//!
//! The spline schemes live in [`cubic`] (one dimension) and [`bicubic`]
//! (tensor grid). Both expose first and second derivatives, which the
//! finite-difference solvers use for sensitivities.

use ql_core::{ensure, errors::Result, Real};

pub mod bicubic;
pub mod cubic;

pub use bicubic::BicubicSpline;
pub use cubic::CubicNaturalSpline;

/// A 1D interpolation function `f: R → R` defined by a set of known points.
///
/// Outside `[x_min, x_max]` the end segment is extended.
pub trait Interpolation1D: std::fmt::Debug + Send + Sync {
    /// Evaluate the interpolation at `x`.
    fn operator(&self, x: Real) -> Real;

    /// First derivative at `x`.
    fn derivative(&self, x: Real) -> Real;

    /// Second derivative at `x`.
    fn second_derivative(&self, x: Real) -> Real;

    /// Lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Index `i` such that `xs[i] <= x < xs[i+1]`, clamped to `[0, n-2]`.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    // first index with xs[i] > x, minus one
    xs.partition_point(|&v| v <= x) - 1
}

/// Checks shared by every interpolation constructor.
pub(crate) fn check_nodes(xs: &[Real], ys: &[Real]) -> Result<()> {
    ensure!(xs.len() >= 2, "need at least 2 points for interpolation");
    ensure!(
        xs.len() == ys.len(),
        "xs ({}) and ys ({}) must have the same length",
        xs.len(),
        ys.len()
    );
    ensure!(
        xs.windows(2).all(|w| w[1] > w[0]),
        "abscissae must be strictly increasing"
    );
    Ok(())
}

// ── Linear ───────────────────────────────────────────────────────────────────

/// Linear interpolation.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct from strictly increasing `xs` and corresponding `ys`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }

    fn slope(&self, i: usize) -> Real {
        (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i])
    }
}

impl Interpolation1D for LinearInterpolation {
    fn operator(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        self.ys[i] + (x - self.xs[i]) * self.slope(i)
    }

    fn derivative(&self, x: Real) -> Real {
        self.slope(locate(&self.xs, x))
    }

    fn second_derivative(&self, _x: Real) -> Real {
        0.0
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}
