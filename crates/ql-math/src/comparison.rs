//! Floating-point comparison utilities.

use ql_core::Real;

/// Return `true` if `a` and `b` agree to within `n` ulps relative to the
/// larger magnitude.
#[inline]
pub fn close_enough(a: Real, b: Real, n: u32) -> bool {
    if a == b {
        return true;
    }
    let eps = a.abs().max(b.abs()) * Real::EPSILON * n as Real;
    (a - b).abs() <= eps
}

/// Return `true` if `a` and `b` agree to within the relative tolerance
/// `tol` (absolute near zero).
#[inline]
pub fn close_relative(a: Real, b: Real, tol: Real) -> bool {
    (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
}
