//! One territory plan over a loaded dataset.
//!
//! Split the accounts at a threshold, settle the weights for each segment
//! (fixed, or the fairest blend on the grid), then allocate each segment
//! against its own reps with the decision trace recorded.

use crate::{
    account::Account,
    allocator::{allocate_traced, AllocationStep},
    dataset::Dataset,
    error::TerritoryResult,
    fairness::{calc_fairness, FairnessScores},
    optimizer::{optimize_weights_with, OptimizeOptions, Optimum, DEFAULT_INCREMENT},
    roster::Roster,
    segment::{segment_accounts, Segment},
    types::{AccountId, RepId, Threshold, DEFAULT_RISK_THRESHOLD},
    weights::WeightTriple,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanOptions {
    pub threshold:      Threshold,
    pub geo_bonus:      f64,
    pub preserve_bonus: f64,
    /// Used for both segments. `None` optimizes each segment separately.
    pub weights:        Option<WeightTriple>,
    pub increment:      u32,
    pub risk_threshold: u8,
}

impl PlanOptions {
    pub fn at_threshold(threshold: Threshold) -> Self {
        Self {
            threshold,
            geo_bonus:      0.0,
            preserve_bonus: 0.0,
            weights:        None,
            increment:      DEFAULT_INCREMENT,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
        }
    }

    fn optimize_options(&self) -> OptimizeOptions {
        OptimizeOptions {
            geo_bonus:      self.geo_bonus,
            preserve_bonus: self.preserve_bonus,
            increment:      self.increment,
            risk_threshold: self.risk_threshold,
            arr_ratio_cap:  None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepSummary {
    pub rep:           RepId,
    pub total_arr:     f64,
    pub account_count: u64,
    pub high_risk_arr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentPlan {
    pub segment:           Segment,
    pub weights:           WeightTriple,
    /// Search result when the weights were optimized.
    pub optimum:           Option<Optimum>,
    pub fairness:          FairnessScores,
    /// Fairness composite weighted by `weights` instead of equally.
    pub weighted_fairness: f64,
    pub reps:              Vec<RepSummary>,
    /// One decision per assigned account, in processing order.
    pub steps:             Vec<AllocationStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerritoryPlan {
    pub threshold:  Threshold,
    pub enterprise: SegmentPlan,
    pub mid_market: SegmentPlan,
}

impl TerritoryPlan {
    pub fn segments(&self) -> [&SegmentPlan; 2] {
        [&self.enterprise, &self.mid_market]
    }

    /// Plain average of the two segment composites.
    pub fn combined_score(&self) -> f64 {
        (self.enterprise.fairness.composite + self.mid_market.fairness.composite) / 2.0
    }

    pub fn decision(&self, id: AccountId) -> Option<&AllocationStep> {
        self.segments()
            .into_iter()
            .flat_map(|s| s.steps.iter())
            .find(|step| step.account_id == id)
    }
}

pub fn plan_territories(dataset: &Dataset, options: &PlanOptions) -> TerritoryResult<TerritoryPlan> {
    let accounts = dataset.accounts();
    let segments = segment_accounts(&accounts, options.threshold);

    let enterprise = plan_segment(
        Segment::Enterprise,
        &segments.enterprise,
        &dataset.roster(Segment::Enterprise)?,
        options,
    );
    let mid_market = plan_segment(
        Segment::MidMarket,
        &segments.mid_market,
        &dataset.roster(Segment::MidMarket)?,
        options,
    );

    Ok(TerritoryPlan { threshold: options.threshold, enterprise, mid_market })
}

fn plan_segment(
    segment: Segment,
    accounts: &[Account],
    roster: &Roster,
    options: &PlanOptions,
) -> SegmentPlan {
    if roster.is_empty() && !accounts.is_empty() {
        log::warn!(
            "plan: {} has {} accounts but no reps, they stay unassigned",
            segment.label(),
            accounts.len()
        );
    }

    let (weights, optimum) = match options.weights {
        Some(weights) => (weights, None),
        None => {
            let optimum = optimize_weights_with(accounts, roster, &options.optimize_options());
            (optimum.weights, Some(optimum))
        }
    };

    let (allocation, steps) = allocate_traced(
        accounts,
        roster,
        weights,
        options.geo_bonus,
        options.preserve_bonus,
        options.risk_threshold,
    );
    let fairness = calc_fairness(&allocation);
    let reps = allocation
        .iter()
        .map(|load| RepSummary {
            rep:           load.rep().to_string(),
            total_arr:     load.total_arr(),
            account_count: load.account_count(),
            high_risk_arr: load.high_risk_arr(),
        })
        .collect();

    log::info!(
        "plan: {} weights {weights} fairness {:.1} ({})",
        segment.label(),
        fairness.composite,
        fairness.band().label()
    );

    SegmentPlan {
        segment,
        weights,
        optimum,
        weighted_fairness: fairness.weighted_composite(weights),
        fairness,
        reps,
        steps,
    }
}
