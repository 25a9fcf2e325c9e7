//! Error types shared by every crate in the workspace.
//!
//! A single `thiserror`-derived enum carries all failure kinds. The
//! `ensure!`, `ensure_config!`, `ensure_stable!`, `ensure_post!` and `fail!`
//! macros build the matching variant and return early.

use thiserror::Error;

/// The top-level error type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated: an input is outside the domain of the operation.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Inconsistent solver configuration (grid sizes, step counts, event
    /// times outside the solving interval, mismatched dimensions).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The numerical procedure broke down (zero pivot, non-convergence,
    /// non-finite values).
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// Index out of range.
    #[error("index ({index}) out of range [0, {size})")]
    IndexOutOfRange {
        /// The index that was out of range.
        index: usize,
        /// The size of the container.
        size: usize,
    },

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// `true` for [`Error::NumericalInstability`].
    pub fn is_numerical_instability(&self) -> bool {
        matches!(self, Error::NumericalInstability(_))
    }

    /// `true` for [`Error::Configuration`].
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Shorthand `Result` type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure, errors::Error};
/// fn positive(x: f64) -> ql_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Configuration(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure_config, errors::Error};
/// fn steps(n: usize) -> ql_core::errors::Result<usize> {
///     ensure_config!(n > 0, "at least one time step required");
///     Ok(n)
/// }
/// assert!(matches!(steps(0), Err(Error::Configuration(_))));
/// ```
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Configuration(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::NumericalInstability(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure_stable, errors::Error};
/// fn pivot(p: f64) -> ql_core::errors::Result<f64> {
///     ensure_stable!(p != 0.0, "zero pivot");
///     Ok(1.0 / p)
/// }
/// assert!(matches!(pivot(0.0), Err(Error::NumericalInstability(_))));
/// ```
#[macro_export]
macro_rules! ensure_stable {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::NumericalInstability(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use ql_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> ql_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use ql_core::{fail, errors::Error};
/// fn always_err() -> ql_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
