//! Grid sizes shared by the finite-difference engines.

use ql_core::Size;

/// Number of time steps and mesh points used by a finite-difference engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdGridSettings {
    /// Time steps between maturity and today, damping steps excluded.
    pub t_grid: Size,
    /// Points along the log-spot direction.
    pub x_grid: Size,
    /// Points along the second direction: variance for Heston, stored
    /// volume for storage. Ignored by one-dimensional engines.
    pub v_grid: Size,
    /// Implicit Euler steps run before the configured scheme.
    pub damping_steps: Size,
}

impl FdGridSettings {
    /// 100 time steps, 100 log-spot points, no damping.
    pub fn black_scholes() -> Self {
        Self {
            t_grid: 100,
            x_grid: 100,
            v_grid: 0,
            damping_steps: 0,
        }
    }

    /// 100 time steps on a 100 × 50 (log-spot, variance) mesh.
    pub fn heston() -> Self {
        Self {
            t_grid: 100,
            x_grid: 100,
            v_grid: 50,
            damping_steps: 0,
        }
    }

    /// 50 time steps on a 50 × 100 (volume, log-price) mesh.
    pub fn storage() -> Self {
        Self {
            t_grid: 50,
            x_grid: 100,
            v_grid: 50,
            damping_steps: 0,
        }
    }
}

impl Default for FdGridSettings {
    fn default() -> Self {
        Self::black_scholes()
    }
}
