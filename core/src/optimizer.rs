//! Exhaustive search over the weight simplex.
//!
//! For every triple the grid yields (see `WeightGrid` for the order), run the
//! allocator and score the result by its equal-weight fairness composite.
//! The first candidate with the strictly highest composite wins, so on ties
//! the earliest triple in grid order is kept.

use crate::{
    account::Account,
    allocator::allocate,
    fairness::{calc_fairness, VACUOUS_FAIRNESS},
    roster::Roster,
    types::DEFAULT_RISK_THRESHOLD,
    weights::{WeightGrid, WeightTriple},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INCREMENT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizeOptions {
    pub geo_bonus:      f64,
    pub preserve_bonus: f64,
    /// Grid step in weight points. 0 is treated as 1.
    pub increment:      u32,
    pub risk_threshold: u8,
    /// Upper bound on the allocation's max/min rep ARR ratio.
    #[serde(default)]
    pub arr_ratio_cap:  Option<f64>,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            geo_bonus:      0.0,
            preserve_bonus: 0.0,
            increment:      DEFAULT_INCREMENT,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            arr_ratio_cap:  None,
        }
    }
}

impl OptimizeOptions {
    pub fn with_bonuses(geo_bonus: f64, preserve_bonus: f64) -> Self {
        Self { geo_bonus, preserve_bonus, ..Self::default() }
    }
}

/// Best blend found by a search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Optimum {
    pub weights:              WeightTriple,
    /// Equal-weight fairness composite at `weights`.
    pub score:                f64,
    /// False when a cap was set and no candidate satisfied it.
    pub constraints_met:      bool,
    pub candidates_evaluated: usize,
}

impl Optimum {
    /// Result for empty input: neutral weights, perfect score, no search.
    pub fn vacuous() -> Self {
        Self {
            weights:              WeightTriple::NEUTRAL,
            score:                VACUOUS_FAIRNESS,
            constraints_met:      true,
            candidates_evaluated: 0,
        }
    }
}

pub fn optimize_weights(
    accounts: &[Account],
    roster: &Roster,
    geo_bonus: f64,
    preserve_bonus: f64,
    increment: u32,
) -> Optimum {
    let options = OptimizeOptions {
        increment,
        ..OptimizeOptions::with_bonuses(geo_bonus, preserve_bonus)
    };
    optimize_weights_with(accounts, roster, &options)
}

pub fn optimize_weights_with(
    accounts: &[Account],
    roster: &Roster,
    options: &OptimizeOptions,
) -> Optimum {
    if accounts.is_empty() || roster.is_empty() {
        return Optimum::vacuous();
    }

    let mut best: Option<(WeightTriple, f64)> = None;
    let mut best_capped: Option<(WeightTriple, f64)> = None;
    let mut evaluated = 0usize;

    for weights in WeightGrid::with_increment(options.increment) {
        let allocation = allocate(
            accounts,
            roster,
            weights,
            options.geo_bonus,
            options.preserve_bonus,
            options.risk_threshold,
        );
        let score = calc_fairness(&allocation).composite;
        evaluated += 1;

        if improves(best, score) {
            best = Some((weights, score));
        }
        if let Some(cap) = options.arr_ratio_cap {
            let within_cap = allocation.arr_max_min_ratio().is_some_and(|r| r <= cap);
            if within_cap && improves(best_capped, score) {
                best_capped = Some((weights, score));
            }
        }
    }

    // The grid always yields at least one triple.
    let Some((weights, score)) = best else {
        return Optimum::vacuous();
    };

    let optimum = match (options.arr_ratio_cap, best_capped) {
        (Some(_), Some((weights, score))) => Optimum {
            weights,
            score,
            constraints_met: true,
            candidates_evaluated: evaluated,
        },
        (Some(cap), None) => {
            log::warn!("optimizer: no blend met ARR ratio cap {cap:.2}, using best overall");
            Optimum { weights, score, constraints_met: false, candidates_evaluated: evaluated }
        }
        (None, _) => Optimum { weights, score, constraints_met: true, candidates_evaluated: evaluated },
    };

    log::debug!(
        "optimizer: {} accounts / {} reps -> best {} score={:.2} ({} candidates)",
        accounts.len(),
        roster.len(),
        optimum.weights,
        optimum.score,
        evaluated
    );
    optimum
}

fn improves(best: Option<(WeightTriple, f64)>, score: f64) -> bool {
    match best {
        Some((_, best_score)) => score > best_score,
        None => true,
    }
}
