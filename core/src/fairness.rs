//! Load-balance quality metrics.
//!
//! Fairness = 100 * (1 - CV), floored at 0, where CV is the population
//! coefficient of variation of one load dimension across reps.
//! Higher is more balanced; 100 means every rep carries the same load.

use crate::{allocator::Allocation, weights::WeightTriple};
use serde::{Deserialize, Serialize};

/// Score assigned when there is nothing to compare.
pub const VACUOUS_FAIRNESS: f64 = 100.0;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation. 0 for empty input.
pub fn population_std_dev(values: &[f64]) -> f64 {
    let Some(mean) = mean(values) else {
        return 0.0;
    };
    if all_equal(values) {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Population std-dev over population mean.
/// Defined as 0 for an empty list or a zero mean.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    match mean(values) {
        Some(m) if m != 0.0 => population_std_dev(values) / m,
        _ => 0.0,
    }
}

/// Balance score in [0, 100].
pub fn fairness(values: &[f64]) -> f64 {
    (100.0 * (1.0 - coefficient_of_variation(values))).max(0.0)
}

// Identical values must score exactly 100; summing then dividing can
// leave a rounding residue in the mean.
fn all_equal(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Per-dimension fairness plus the equal-weight composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessScores {
    pub arr:       f64,
    pub account:   f64,
    pub risk:      f64,
    /// Unweighted mean of the three.
    pub composite: f64,
}

impl FairnessScores {
    pub const VACUOUS: FairnessScores = FairnessScores {
        arr:       VACUOUS_FAIRNESS,
        account:   VACUOUS_FAIRNESS,
        risk:      VACUOUS_FAIRNESS,
        composite: VACUOUS_FAIRNESS,
    };

    pub fn from_dimensions(arr: f64, account: f64, risk: f64) -> Self {
        Self { arr, account, risk, composite: (arr + account + risk) / 3.0 }
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.arr, self.account, self.risk, self.composite)
    }

    /// Composite weighted by a blend triple instead of 1/3 each.
    /// Falls back to the equal-weight composite when the weights sum to 0.
    pub fn weighted_composite(&self, weights: WeightTriple) -> f64 {
        let total = f64::from(weights.sum());
        if total == 0.0 {
            return self.composite;
        }
        (self.arr * f64::from(weights.arr)
            + self.account * f64::from(weights.account)
            + self.risk * f64::from(weights.risk))
            / total
    }

    pub fn band(&self) -> FairnessBand {
        FairnessBand::classify(self.composite)
    }
}

/// Fairness of an allocation across ARR, account count and high-risk ARR.
/// An allocation with no reps is vacuously fair.
pub fn calc_fairness(allocation: &Allocation<'_>) -> FairnessScores {
    if allocation.is_empty() {
        return FairnessScores::VACUOUS;
    }
    FairnessScores::from_dimensions(
        fairness(&allocation.arr_totals()),
        fairness(&allocation.account_counts()),
        fairness(&allocation.high_risk_arr_totals()),
    )
}

/// Display bands for a fairness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FairnessBand {
    Excellent,  // 94–100
    Good,       // 88–93
    Acceptable, // 82–87
    Concerning, // 75–81
    Poor,       // < 75
}

impl FairnessBand {
    pub fn classify(score: f64) -> Self {
        if score >= 94.0 {
            Self::Excellent
        } else if score >= 88.0 {
            Self::Good
        } else if score >= 82.0 {
            Self::Acceptable
        } else if score >= 75.0 {
            Self::Concerning
        } else {
            Self::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent  => "excellent",
            Self::Good       => "good",
            Self::Acceptable => "acceptable",
            Self::Concerning => "concerning",
            Self::Poor       => "poor",
        }
    }
}
