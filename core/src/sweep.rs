//! Sensitivity sweep: how stable is the optimal fairness as the segment
//! threshold and the preference bonuses move?
//!
//! For every preference setting and every threshold:
//!   1. Split the pool into Enterprise / Mid-Market.
//!   2. Optimize weights for each segment against its own roster.
//!   3. Combined score = plain average of the two segment optima.
//! Each setting then gets a volatility summary over its combined scores.

use crate::{
    account::Account,
    config::{PreferenceSetting, SweepConfig},
    error::TerritoryResult,
    fairness::population_std_dev,
    generator::AccountGenerator,
    optimizer::{optimize_weights_with, Optimum},
    segment::segment_accounts,
    types::Threshold,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub threshold:           Threshold,
    pub enterprise_accounts: usize,
    pub mid_market_accounts: usize,
    pub enterprise:          Optimum,
    pub mid_market:          Optimum,
    pub combined_score:      f64,
    /// Enterprise average ARR over Mid-Market average ARR.
    pub deal_size_ratio:     Option<f64>,
}

/// Spread of combined scores across one setting's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volatility {
    pub min:     f64,
    pub max:     f64,
    pub spread:  f64,
    pub std_dev: f64,
}

impl Volatility {
    pub fn of(scores: &[f64]) -> Option<Self> {
        let min = scores.iter().copied().reduce(f64::min)?;
        let max = scores.iter().copied().reduce(f64::max)?;
        Some(Self { min, max, spread: max - min, std_dev: population_std_dev(scores) })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingSweep {
    pub setting:    PreferenceSetting,
    pub points:     Vec<SweepPoint>,
    pub volatility: Option<Volatility>,
}

impl SettingSweep {
    pub fn combined_scores(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.combined_score).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub seed:          u64,
    pub account_count: usize,
    pub increment:     u32,
    pub settings:      Vec<SettingSweep>,
}

pub struct SensitivitySweep<'c> {
    config: &'c SweepConfig,
}

impl<'c> SensitivitySweep<'c> {
    pub fn new(config: &'c SweepConfig) -> TerritoryResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Synthetic pool for this config's seed.
    pub fn generate_accounts(&self) -> TerritoryResult<Vec<Account>> {
        AccountGenerator::new(&self.config.generator)
            .generate(self.config.seed, &self.config.all_rep_ids())
    }

    /// Sweep the configured thresholds.
    pub fn run(&self, accounts: &[Account]) -> SweepReport {
        self.run_with_thresholds(accounts, &self.config.thresholds.thresholds())
    }

    pub fn run_with_thresholds(&self, accounts: &[Account], thresholds: &[Threshold]) -> SweepReport {
        let settings = self
            .config
            .preference_settings
            .iter()
            .map(|setting| self.sweep_setting(accounts, setting, thresholds))
            .collect();

        SweepReport {
            seed:          self.config.seed,
            account_count: accounts.len(),
            increment:     self.config.increment,
            settings,
        }
    }

    pub fn sweep_setting(
        &self,
        accounts: &[Account],
        setting: &PreferenceSetting,
        thresholds: &[Threshold],
    ) -> SettingSweep {
        let points: Vec<SweepPoint> = thresholds
            .iter()
            .map(|&threshold| self.point(accounts, setting, threshold))
            .collect();
        let scores: Vec<f64> = points.iter().map(|p| p.combined_score).collect();
        let volatility = Volatility::of(&scores);

        if let Some(v) = volatility {
            log::info!(
                "sweep: '{}' over {} thresholds: {:.1}–{:.1} (spread {:.1}, std {:.2})",
                setting.label,
                points.len(),
                v.min,
                v.max,
                v.spread,
                v.std_dev
            );
        }

        SettingSweep { setting: setting.clone(), points, volatility }
    }

    pub fn point(&self, accounts: &[Account], setting: &PreferenceSetting, threshold: Threshold) -> SweepPoint {
        let segments = segment_accounts(accounts, threshold);

        let enterprise = optimize_weights_with(
            &segments.enterprise,
            &self.config.enterprise_reps,
            &self.config.optimize_options(setting, self.config.enterprise_arr_cap),
        );
        let mid_market = optimize_weights_with(
            &segments.mid_market,
            &self.config.mid_market_reps,
            &self.config.optimize_options(setting, self.config.mid_market_arr_cap),
        );
        let combined_score = (enterprise.score + mid_market.score) / 2.0;

        log::debug!(
            "sweep: '{}' threshold={threshold} E={} MM={} combined={combined_score:.2}",
            setting.label,
            segments.enterprise.len(),
            segments.mid_market.len()
        );

        SweepPoint {
            threshold,
            enterprise_accounts: segments.enterprise.len(),
            mid_market_accounts: segments.mid_market.len(),
            enterprise,
            mid_market,
            combined_score,
            deal_size_ratio: segments.deal_size_ratio(),
        }
    }
}
