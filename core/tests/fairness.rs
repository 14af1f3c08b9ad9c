//! Fairness scoring: CV, floor at zero, vacuous cases, composites and bands.

use territory_core::{
    allocator::allocate,
    config::GeneratorConfig,
    fairness::{
        calc_fairness, coefficient_of_variation, fairness, population_std_dev, FairnessBand,
        FairnessScores,
    },
    generator::AccountGenerator,
    roster::{Rep, Roster},
    weights::WeightTriple,
};

#[test]
fn cv_is_zero_for_empty_or_zero_mean_input() {
    assert_eq!(coefficient_of_variation(&[]), 0.0);
    assert_eq!(coefficient_of_variation(&[0.0, 0.0, 0.0]), 0.0);
}

#[test]
fn cv_uses_population_statistics() {
    // mean 2, population std-dev 1.
    assert_eq!(population_std_dev(&[1.0, 3.0]), 1.0);
    assert_eq!(coefficient_of_variation(&[1.0, 3.0]), 0.5);
    assert_eq!(fairness(&[1.0, 3.0]), 50.0);
}

#[test]
fn identical_values_score_exactly_100() {
    for values in [vec![7.3; 3], vec![0.1; 10], vec![123_456.789; 6], vec![42.0]] {
        assert_eq!(fairness(&values), 100.0, "Identical values {values:?} must be perfectly fair");
    }
}

#[test]
fn cv_of_one_or_more_floors_at_zero() {
    assert_eq!(fairness(&[0.0, 100.0]), 0.0, "CV of exactly 1 scores 0");
    assert_eq!(fairness(&[0.0, 0.0, 300.0]), 0.0, "CV above 1 is floored at 0");
}

#[test]
fn fairness_stays_within_bounds() {
    let samples: [&[f64]; 6] = [
        &[1.0],
        &[1.0, 2.0, 3.0],
        &[1e9, 1.0, 1.0, 1.0],
        &[0.0, 0.0, 1.0],
        &[5.5, 5.4, 5.6],
        &[],
    ];
    for values in samples {
        let score = fairness(values);
        assert!((0.0..=100.0).contains(&score), "fairness({values:?}) = {score} out of [0, 100]");
    }
}

#[test]
fn empty_roster_is_vacuously_fair() {
    let allocation = allocate(&[], &Roster::default(), WeightTriple::NEUTRAL, 0.0, 0.0, 70);
    assert_eq!(calc_fairness(&allocation).as_tuple(), (100.0, 100.0, 100.0, 100.0));
}

#[test]
fn reps_with_no_accounts_score_as_perfectly_fair() {
    let roster = Roster::new(vec![Rep::new("A", "GA"), Rep::new("B", "NC")]).unwrap();
    let allocation = allocate(&[], &roster, WeightTriple::NEUTRAL, 0.0, 0.0, 70);
    assert_eq!(calc_fairness(&allocation), FairnessScores::VACUOUS);
}

#[test]
fn composite_is_mean_of_dimensions() {
    let config = GeneratorConfig { account_count: 90, ..GeneratorConfig::default_test() };
    let roster = Roster::new(vec![Rep::new("A", "GA"), Rep::new("B", "NC"), Rep::new("C", "CA")]).unwrap();
    let accounts = AccountGenerator::new(&config).generate(3, &["A".to_string()]).unwrap();
    let allocation = allocate(&accounts, &roster, WeightTriple::unchecked(50, 25, 25), 0.0, 0.0, 70);

    let scores = calc_fairness(&allocation);
    assert_eq!(scores.arr, fairness(&allocation.arr_totals()));
    assert_eq!(scores.account, fairness(&allocation.account_counts()));
    assert_eq!(scores.risk, fairness(&allocation.high_risk_arr_totals()));
    let expected = (scores.arr + scores.account + scores.risk) / 3.0;
    assert!((scores.composite - expected).abs() < 1e-12);
}

#[test]
fn weighted_composite_honours_weights() {
    let scores = FairnessScores::from_dimensions(90.0, 60.0, 30.0);
    assert_eq!(scores.composite, 60.0);
    assert_eq!(scores.weighted_composite(WeightTriple::unchecked(100, 0, 0)), 90.0);
    assert_eq!(scores.weighted_composite(WeightTriple::unchecked(50, 50, 0)), 75.0);
    assert_eq!(
        scores.weighted_composite(WeightTriple::unchecked(0, 0, 0)),
        60.0,
        "Zero weights fall back to the equal-weight composite"
    );
}

#[test]
fn bands_follow_score_cutoffs() {
    assert_eq!(FairnessBand::classify(100.0), FairnessBand::Excellent);
    assert_eq!(FairnessBand::classify(94.0), FairnessBand::Excellent);
    assert_eq!(FairnessBand::classify(93.9), FairnessBand::Good);
    assert_eq!(FairnessBand::classify(88.0), FairnessBand::Good);
    assert_eq!(FairnessBand::classify(85.0), FairnessBand::Acceptable);
    assert_eq!(FairnessBand::classify(75.0), FairnessBand::Concerning);
    assert_eq!(FairnessBand::classify(74.9), FairnessBand::Poor);
    assert_eq!(FairnessBand::classify(0.0).label(), "poor");
}
