//! Storage facility with bang-bang inject/withdraw decisions.
//!
//! At every exercise time the holder may change the stored volume by at most
//! the change rate, within `[0, capacity]`. Injecting one unit costs the
//! spot price; withdrawing one unit earns it.

use crate::exercise::{Exercise, ExerciseType};
use ql_core::{ensure, errors::Result, Real};

/// Arguments of a storage contract.
#[derive(Debug, Clone, PartialEq)]
pub struct VanillaStorageArguments {
    /// Decision times (Bermudan exercise).
    pub exercise: Exercise,
    /// Maximum stored volume.
    pub capacity: Real,
    /// Initial volume.
    pub load: Real,
    /// Maximum volume change per decision time.
    pub change_rate: Real,
}

impl VanillaStorageArguments {
    /// Validate and bundle the storage arguments.
    pub fn new(exercise: Exercise, capacity: Real, load: Real, change_rate: Real) -> Result<Self> {
        ensure!(
            exercise.exercise_type() == ExerciseType::Bermudan,
            "storage decisions require a Bermudan exercise"
        );
        ensure!(capacity > 0.0, "capacity ({capacity}) must be positive");
        ensure!(
            (0.0..=capacity).contains(&load),
            "load ({load}) must be within [0, {capacity}]"
        );
        ensure!(change_rate > 0.0, "change rate ({change_rate}) must be positive");
        Ok(Self {
            exercise,
            capacity,
            load,
            change_rate,
        })
    }
}
