//! Design patterns shared across the workspace.

pub mod lazy_object;
