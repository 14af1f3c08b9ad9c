//! THE CORE CONTRACT: no hidden randomness.
//!
//! Same seed, same inputs, same order: identical allocations, identical
//! optima, identical sweep reports. Any divergence is a bug.

use territory_core::{
    allocator::allocate,
    config::SweepConfig,
    optimizer::optimize_weights,
    sweep::SensitivitySweep,
    weights::WeightTriple,
};

#[test]
fn same_inputs_produce_identical_allocations() {
    let config = SweepConfig::default_test();
    let sweep = SensitivitySweep::new(&config).expect("valid config");
    let accounts = sweep.generate_accounts().expect("generate");

    let a = allocate(&accounts, &config.mid_market_reps, WeightTriple::unchecked(30, 30, 40), 0.05, 0.05, 70);
    let b = allocate(&accounts, &config.mid_market_reps, WeightTriple::unchecked(30, 30, 40), 0.05, 0.05, 70);

    assert_eq!(a, b, "Allocator diverged on identical inputs");
}

#[test]
fn same_inputs_produce_identical_optima() {
    let config = SweepConfig::default_test();
    let accounts = SensitivitySweep::new(&config).unwrap().generate_accounts().unwrap();

    let a = optimize_weights(&accounts, &config.enterprise_reps, 0.1, 0.1, 10);
    let b = optimize_weights(&accounts, &config.enterprise_reps, 0.1, 0.1, 10);

    assert_eq!(a, b, "Optimizer diverged on identical inputs");
}

#[test]
fn same_seed_produces_identical_sweep_reports() {
    let config = SweepConfig::default_test();

    let run = || {
        let sweep = SensitivitySweep::new(&config).unwrap();
        let accounts = sweep.generate_accounts().unwrap();
        serde_json::to_string(&sweep.run(&accounts)).unwrap()
    };

    let report_a = run();
    let report_b = run();
    assert_eq!(report_a, report_b, "Sweep reports diverged for the same seed");
}

#[test]
fn different_seeds_produce_different_pools() {
    let config_a = SweepConfig { seed: 42, ..SweepConfig::default_test() };
    let config_b = SweepConfig { seed: 99, ..SweepConfig::default_test() };

    let a = SensitivitySweep::new(&config_a).unwrap().generate_accounts().unwrap();
    let b = SensitivitySweep::new(&config_b).unwrap().generate_accounts().unwrap();

    assert_ne!(a, b, "Different seeds produced identical pools; seed is not being used");
}
