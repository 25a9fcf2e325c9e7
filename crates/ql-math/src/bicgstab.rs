//! Preconditioned BiCGStab for matrix-free linear systems.
//!
//! The operator and the preconditioner are closures, so the implicit
//! finite-difference schemes can solve `(I - θ·dt·L) x = b` on
//! multi-dimensional grids without ever assembling `L`.

use ql_core::{
    errors::{Error, Result},
    Real,
};

use crate::array::Array;

/// Outcome of a converged BiCGStab run.
#[derive(Debug, Clone)]
pub struct BiCGStabResult {
    /// Number of iterations performed.
    pub iterations: usize,
    /// Final relative residual `|b - A x| / |b|`.
    pub error: Real,
    /// Solution vector.
    pub x: Array,
}

/// Biconjugate gradient stabilized solver (van der Vorst, 1992).
#[derive(Debug, Clone, Copy)]
pub struct BiCGStab {
    max_iterations: usize,
    rel_tolerance: Real,
}

impl BiCGStab {
    /// Solver stopping at relative residual `rel_tolerance` or after
    /// `max_iterations`.
    pub fn new(max_iterations: usize, rel_tolerance: Real) -> Self {
        Self {
            max_iterations,
            rel_tolerance,
        }
    }

    /// Solve `A x = b` starting from `x0`, with right preconditioner `M ≈ A⁻¹`.
    ///
    /// Fails with [`Error::NumericalInstability`] if the iteration breaks down
    /// or does not reach the tolerance within the iteration budget.
    pub fn solve<A, M>(&self, a: A, m: M, b: &Array, x0: &Array) -> Result<BiCGStabResult>
    where
        A: Fn(&Array) -> Result<Array>,
        M: Fn(&Array) -> Result<Array>,
    {
        let b_norm = b.norm();
        if b_norm == 0.0 {
            return Ok(BiCGStabResult {
                iterations: 0,
                error: 0.0,
                x: b.clone(),
            });
        }

        let mut x = x0.clone();
        let mut r = b - &a(&x)?;
        let r_tld = r.clone();
        let mut p = Array::zeros(b.size());
        let mut v = Array::zeros(b.size());
        let mut omega = 1.0;
        let mut alpha = 0.0;
        let mut rho_tld = 1.0;
        let mut error = r.norm() / b_norm;
        let mut iterations = 0;

        while iterations < self.max_iterations && error >= self.rel_tolerance {
            let rho = r_tld.dot(&r);
            if rho == 0.0 || omega == 0.0 {
                break;
            }
            if iterations > 0 {
                let beta = (rho / rho_tld) * (alpha / omega);
                // p = r + beta * (p - omega * v)
                p.axpy(-omega, &v);
                p *= beta;
                p += &r;
            } else {
                p = r.clone();
            }
            iterations += 1;

            let p_tld = m(&p)?;
            v = a(&p_tld)?;
            alpha = rho / r_tld.dot(&v);
            let mut s = r.clone();
            s.axpy(-alpha, &v);
            if s.norm() < self.rel_tolerance * b_norm {
                x.axpy(alpha, &p_tld);
                error = s.norm() / b_norm;
                break;
            }

            let s_tld = m(&s)?;
            let t = a(&s_tld)?;
            omega = t.dot(&s) / t.dot(&t);
            x.axpy(alpha, &p_tld);
            x.axpy(omega, &s_tld);
            r = s;
            r.axpy(-omega, &t);
            error = r.norm() / b_norm;
            rho_tld = rho;
        }

        if !error.is_finite() || error >= self.rel_tolerance {
            return Err(Error::NumericalInstability(format!(
                "BiCGStab did not converge: relative residual {error:e} after {iterations} iterations"
            )));
        }
        Ok(BiCGStabResult {
            iterations,
            error,
            x,
        })
    }
}
