//! Pull-based lazy recalculation.
//!
//! A `LazyObject` caches an expensive computation (a full PDE rollback, for
//! instance) and performs it on first use. The cache flags live in `Cell`s
//! so that the calculation can be triggered through `&self`.

use std::cell::Cell;

/// Trait for objects that lazily compute and cache their results.
///
/// Implementors provide [`perform_calculations`][Self::perform_calculations]
/// and access to a [`LazyState`]; the trait handles the bookkeeping.
pub trait LazyObject {
    /// Perform the actual (expensive) calculation.
    fn perform_calculations(&self) -> crate::errors::Result<()>;

    /// Bookkeeping fields.
    fn lazy_state(&self) -> &LazyState;

    /// Ensure results are up to date.
    ///
    /// A failed calculation leaves the cache stale, so the next call retries.
    fn calculate(&self) -> crate::errors::Result<()> {
        let state = self.lazy_state();
        if !state.calculated.get() && state.freeze_count.get() == 0 {
            self.perform_calculations()?;
            state.calculated.set(true);
        }
        Ok(())
    }

    /// Mark the cached result as stale without triggering a recalculation.
    fn update(&self) {
        self.lazy_state().calculated.set(false);
    }

    /// Defer recalculation until [`unfreeze`][Self::unfreeze] is called.
    fn freeze(&self) {
        let count = &self.lazy_state().freeze_count;
        count.set(count.get() + 1);
    }

    /// Undo one call to [`freeze`][Self::freeze].
    fn unfreeze(&self) {
        let count = &self.lazy_state().freeze_count;
        if count.get() > 0 {
            count.set(count.get() - 1);
        }
    }

    /// Return `true` if the cache is currently valid.
    fn is_calculated(&self) -> bool {
        self.lazy_state().calculated.get()
    }

    /// Return `true` if recalculation is currently deferred.
    fn is_frozen(&self) -> bool {
        self.lazy_state().freeze_count.get() > 0
    }
}

/// Bookkeeping fields required by [`LazyObject`].
///
/// # Example
/// ```
/// use std::cell::Cell;
/// use ql_core::patterns::lazy_object::{LazyObject, LazyState};
///
/// struct Rollback {
///     state: LazyState,
///     value: Cell<f64>,
/// }
///
/// impl LazyObject for Rollback {
///     fn perform_calculations(&self) -> ql_core::errors::Result<()> {
///         self.value.set(42.0);
///         Ok(())
///     }
///     fn lazy_state(&self) -> &LazyState { &self.state }
/// }
///
/// let r = Rollback { state: LazyState::new(), value: Cell::new(0.0) };
/// r.calculate().unwrap();
/// assert_eq!(r.value.get(), 42.0);
/// ```
#[derive(Debug, Default)]
pub struct LazyState {
    /// `true` when the cached result is valid.
    pub calculated: Cell<bool>,
    /// Number of times the object has been frozen without a matching unfreeze.
    pub freeze_count: Cell<u32>,
}

impl LazyState {
    /// Create a new `LazyState` where the cache is initially stale.
    pub fn new() -> Self {
        Self::default()
    }
}
