//! Finite-difference Heston engine against the semi-analytic price and
//! published finite-difference reference values.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use ql_core::Real;
use ql_instruments::{
    dividend_schedule, Exercise, OptionType, PlainVanillaPayoff, VanillaOption,
};
use ql_methods::FdmSchemeDesc;
use ql_pricingengines::{AnalyticHestonEngine, FdHestonVanillaEngine};
use ql_processes::HestonProcess;
use ql_termstructures::FlatForward;

/// r = 5%, q = 0, v0 = θ = 0.04, κ = 2.5, σ = 0.66, ρ = −0.8; the Feller
/// condition fails, so the variance mesh reaches zero.
fn process() -> Arc<HestonProcess> {
    Arc::new(
        HestonProcess::new(
            Arc::new(FlatForward::new(0.05)),
            Arc::new(FlatForward::new(0.0)),
            100.0,
            0.04,
            2.5,
            0.04,
            0.66,
            -0.8,
        )
        .unwrap(),
    )
}

fn put(exercise: Exercise) -> VanillaOption {
    VanillaOption::new(Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0)), exercise)
}

#[test]
fn test_european_put_reference_value() {
    let p = process();
    let option = put(Exercise::european(1.0).unwrap());
    let fd = option
        .price(&FdHestonVanillaEngine::new(Arc::clone(&p)).with_grid(200, 100, 50))
        .unwrap();
    let analytic = option.price(&AnalyticHestonEngine::new(p)).unwrap().npv;

    assert_abs_diff_eq!(analytic, 5.13756, epsilon = 1e-3);
    assert_abs_diff_eq!(fd.npv, analytic, epsilon = 5e-2);
    assert_abs_diff_eq!(fd.delta().unwrap(), -0.2516, epsilon = 2e-2);
    assert_abs_diff_eq!(fd.gamma().unwrap(), 0.0161, epsilon = 5e-3);
}

#[test]
fn test_european_put_with_cash_dividend() {
    // dividend of 5 half a year before expiry
    let option = put(Exercise::european(1.0).unwrap())
        .with_dividends(dividend_schedule(&[(184.0 / 365.0, 5.0)]).unwrap());
    let fd = option
        .price(&FdHestonVanillaEngine::new(process()).with_grid(50, 100, 50))
        .unwrap();
    assert_abs_diff_eq!(fd.npv, 6.7674, epsilon = 5e-2);
    assert_abs_diff_eq!(fd.delta().unwrap(), -0.3486, epsilon = 3e-2);
}

#[test]
fn test_adi_schemes_agree() {
    let option = put(Exercise::european(1.0).unwrap());
    let value = |scheme: FdmSchemeDesc, damping: usize| -> Real {
        let engine = FdHestonVanillaEngine::new(process())
            .with_grid(100, 80, 40)
            .with_damping_steps(damping)
            .with_scheme(scheme);
        option.price(&engine).unwrap().npv
    };
    let reference = value(FdmSchemeDesc::hundsdorfer(), 0);
    for (scheme, damping) in [
        (FdmSchemeDesc::douglas(), 2),
        (FdmSchemeDesc::craig_sneyd(), 2),
        (FdmSchemeDesc::modified_craig_sneyd(), 0),
        (FdmSchemeDesc::modified_hundsdorfer(), 0),
    ] {
        let v = value(scheme, damping);
        assert_abs_diff_eq!(v, reference, epsilon = 3e-2);
    }
}

#[test]
fn test_american_put_exceeds_european() {
    let engine = FdHestonVanillaEngine::new(process()).with_grid(100, 100, 40);
    let european = put(Exercise::european(1.0).unwrap()).price(&engine).unwrap().npv;
    let american = put(Exercise::american(0.0, 1.0).unwrap()).price(&engine).unwrap().npv;
    assert!(american > european, "american {american}, european {european}");
    assert!(american - european < 1.0, "american {american}, european {european}");
}
