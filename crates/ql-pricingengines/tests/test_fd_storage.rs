//! Storage facility valued with the finite-difference storage engine.

use std::sync::Arc;

use ql_core::Real;
use ql_instruments::{Exercise, PricingEngine, VanillaStorageArguments};
use ql_pricingengines::FdSimpleStorageEngine;
use ql_processes::{GeneralizedBlackScholesProcess, OrnsteinUhlenbeckProcess};
use ql_termstructures::{BlackConstantVol, FlatForward};

/// Log-price reverting to ln 10 with speed 3 and volatility 0.4.
fn engine() -> FdSimpleStorageEngine {
    let ln10 = 10.0_f64.ln();
    let process = OrnsteinUhlenbeckProcess::new(3.0, 0.4, ln10, ln10).unwrap();
    FdSimpleStorageEngine::mean_reverting(Arc::new(process), Arc::new(FlatForward::new(0.01)))
        .with_grid(36, 60, 41)
}

fn monthly_decisions() -> Vec<Real> {
    (0..12).map(|m| m as Real / 12.0).collect()
}

fn monthly_storage(load: Real) -> VanillaStorageArguments {
    VanillaStorageArguments::new(Exercise::bermudan(monthly_decisions()).unwrap(), 20.0, load, 5.0)
        .unwrap()
}

#[test]
fn test_value_increases_with_initial_load() {
    let engine = engine();
    let values: Vec<Real> = [0.0, 5.0, 10.0, 15.0, 20.0]
        .iter()
        .map(|&load| engine.calculate(&monthly_storage(load)).unwrap().npv)
        .collect();
    for pair in values.windows(2) {
        assert!(pair[1] > pair[0], "values {values:?}");
    }
    assert!(values[0] > 0.0, "values {values:?}");
}

#[test]
fn test_change_rate_limits_value() {
    let engine = engine();
    let slow = VanillaStorageArguments::new(Exercise::bermudan(monthly_decisions()).unwrap(), 20.0, 0.0, 2.5)
        .unwrap();
    let fast = VanillaStorageArguments::new(Exercise::bermudan(monthly_decisions()).unwrap(), 20.0, 0.0, 10.0)
        .unwrap();
    let slow = engine.calculate(&slow).unwrap().npv;
    let fast = engine.calculate(&fast).unwrap().npv;
    assert!(fast > slow, "fast {fast}, slow {slow}");
}

#[test]
fn test_black_scholes_full_tank_sells_out_immediately() {
    // r = q: the discounted forward never rises, so selling as fast as
    // possible is optimal and an empty tank is worthless
    let r: Real = 0.01;
    let process = GeneralizedBlackScholesProcess::new(
        10.0,
        Arc::new(FlatForward::new(r)),
        Arc::new(FlatForward::new(r)),
        Arc::new(BlackConstantVol::new(0.25)),
    )
    .unwrap();
    let engine = FdSimpleStorageEngine::new(Arc::new(process)).with_grid(36, 60, 41);

    let sell_out: Real = monthly_decisions()[..4]
        .iter()
        .map(|&t| 5.0 * 10.0 * (-r * t).exp())
        .sum();
    let full = engine.calculate(&monthly_storage(20.0)).unwrap().npv;
    let empty = engine.calculate(&monthly_storage(0.0)).unwrap().npv;
    assert!((full - sell_out).abs() < 1e-2 * sell_out, "full {full}, sell-out {sell_out}");
    assert!(empty.abs() < 0.5, "empty = {empty}");
}
