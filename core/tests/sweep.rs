//! Sensitivity sweep: segment split, per-point optima, volatility summary.

use territory_core::{
    config::{SweepConfig, ThresholdSweep},
    error::TerritoryError,
    segment::segment_accounts,
    sweep::{SensitivitySweep, Volatility},
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn sweep_covers_every_setting_and_threshold() {
    init_logging();
    let config = SweepConfig::default_test();
    let sweep = SensitivitySweep::new(&config).unwrap();
    let accounts = sweep.generate_accounts().unwrap();

    let report = sweep.run(&accounts);

    assert_eq!(report.seed, config.seed);
    assert_eq!(report.account_count, config.generator.account_count);
    assert_eq!(report.settings.len(), config.preference_settings.len());
    for setting in &report.settings {
        let thresholds: Vec<u64> = setting.points.iter().map(|p| p.threshold).collect();
        assert_eq!(thresholds, vec![50_000, 100_000, 150_000]);
    }
}

#[test]
fn each_point_splits_the_pool_and_averages_segment_scores() {
    let config = SweepConfig::default_test();
    let sweep = SensitivitySweep::new(&config).unwrap();
    let accounts = sweep.generate_accounts().unwrap();

    let report = sweep.run(&accounts);

    for setting in &report.settings {
        for p in &setting.points {
            let segments = segment_accounts(&accounts, p.threshold);
            assert_eq!(p.enterprise_accounts, segments.enterprise.len());
            assert_eq!(p.mid_market_accounts, segments.mid_market.len());
            assert_eq!(p.enterprise_accounts + p.mid_market_accounts, accounts.len());
            assert_eq!(p.combined_score, (p.enterprise.score + p.mid_market.score) / 2.0);
            assert_eq!(p.deal_size_ratio, segments.deal_size_ratio());
            assert_eq!(p.enterprise.weights.sum(), 100);
            assert_eq!(p.mid_market.weights.sum(), 100);
        }
    }
}

#[test]
fn threshold_above_every_account_leaves_enterprise_vacuous() {
    let config = SweepConfig::default_test();
    let sweep = SensitivitySweep::new(&config).unwrap();
    let accounts = sweep.generate_accounts().unwrap();

    let above_all = config.generator.employees_max + 1;
    let point = sweep.point(&accounts, &config.preference_settings[0], above_all);

    assert_eq!(point.enterprise_accounts, 0);
    assert_eq!(point.enterprise.weights.as_tuple(), (34, 33, 33));
    assert_eq!(point.enterprise.score, 100.0);
    assert_eq!(point.deal_size_ratio, None);
}

#[test]
fn volatility_summarizes_combined_scores() {
    let config = SweepConfig::default_test();
    let sweep = SensitivitySweep::new(&config).unwrap();
    let accounts = sweep.generate_accounts().unwrap();

    let report = sweep.run(&accounts);
    for setting in &report.settings {
        let scores = setting.combined_scores();
        let v = setting.volatility.expect("non-empty sweep has volatility");
        assert_eq!(Some(v), Volatility::of(&scores));
        assert!(v.min <= v.max);
        assert_eq!(v.spread, v.max - v.min);
        assert!(scores.iter().all(|s| (v.min..=v.max).contains(s)));
    }
}

#[test]
fn volatility_arithmetic() {
    let v = Volatility::of(&[80.0, 90.0, 100.0, 90.0]).unwrap();
    assert_eq!(v.min, 80.0);
    assert_eq!(v.max, 100.0);
    assert_eq!(v.spread, 20.0);
    // mean 90, squared deviations 100 + 0 + 100 + 0 over 4.
    assert_eq!(v.std_dev, 50.0_f64.sqrt());
    assert_eq!(Volatility::of(&[]), None);
}

#[test]
fn empty_threshold_list_yields_no_points() {
    let config = SweepConfig::default_test();
    let sweep = SensitivitySweep::new(&config).unwrap();
    let accounts = sweep.generate_accounts().unwrap();

    let report = sweep.run_with_thresholds(&accounts, &[]);
    assert!(report.settings.iter().all(|s| s.points.is_empty() && s.volatility.is_none()));
}

#[test]
fn threshold_sweep_matches_reference_range() {
    let thresholds = SweepConfig::reference().thresholds.thresholds();
    assert_eq!(thresholds.len(), 15);
    assert_eq!(thresholds.first(), Some(&5_000));
    assert_eq!(thresholds.last(), Some(&145_000));
}

#[test]
fn spanning_sweep_follows_employee_range() {
    let config = SweepConfig::default_test();
    let accounts = SensitivitySweep::new(&config).unwrap().generate_accounts().unwrap();

    let span = ThresholdSweep::spanning(&accounts, 10_000).expect("pool has a range");
    let min = accounts.iter().map(|a| a.employees).min().unwrap();
    let max = accounts.iter().map(|a| a.employees).max().unwrap();
    assert!(span.start <= min && span.start % 1_000 == 0);
    assert!(span.end >= max && span.end % 1_000 == 0);
    assert!(ThresholdSweep::spanning(&[], 10_000).is_none());
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let no_settings = SweepConfig { preference_settings: vec![], ..SweepConfig::default_test() };
    assert!(matches!(
        SensitivitySweep::new(&no_settings),
        Err(TerritoryError::InvalidConfig { .. })
    ));

    let empty_sweep = SweepConfig {
        thresholds: ThresholdSweep { start: 10, end: 5, step: 1 },
        ..SweepConfig::default_test()
    };
    assert!(matches!(
        SensitivitySweep::new(&empty_sweep),
        Err(TerritoryError::InvalidConfig { .. })
    ));
}
