//! Sweep configuration.
//!
//! Loaded from a JSON file (see data/sweep_config.json). Two hardcoded
//! variants exist: `reference()` reproduces the standard experiment and
//! `default_test()` is a small, fast setup for tests.

use crate::{
    account::Account,
    error::{TerritoryError, TerritoryResult},
    optimizer::{OptimizeOptions, DEFAULT_INCREMENT},
    roster::{Rep, Roster},
    segment::threshold_range,
    types::{Location, RepId, Threshold, DEFAULT_RISK_THRESHOLD},
};
use serde::{Deserialize, Serialize};

// ── Synthetic accounts ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub account_count: usize,
    pub arr_min:       f64,
    pub arr_max:       f64,
    pub employees_min: u64,
    pub employees_max: u64,
    pub locations:     Vec<Location>,
}

impl GeneratorConfig {
    pub fn validate(&self) -> TerritoryResult<()> {
        if !(self.arr_min > 0.0 && self.arr_min < self.arr_max && self.arr_max.is_finite()) {
            return Err(invalid(format!(
                "ARR range must be positive and increasing, got {}..{}",
                self.arr_min, self.arr_max
            )));
        }
        if self.employees_min == 0 || self.employees_min > self.employees_max {
            return Err(invalid(format!(
                "employee range must be positive and ordered, got {}..{}",
                self.employees_min, self.employees_max
            )));
        }
        if self.locations.is_empty() {
            return Err(invalid("at least one location is required"));
        }
        Ok(())
    }

    /// Small pool with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            account_count: 60,
            arr_min:       10_000.0,
            arr_max:       500_000.0,
            employees_min: 1_500,
            employees_max: 200_000,
            locations:     vec!["GA".into(), "NC".into(), "CA".into()],
        }
    }
}

// ── Threshold sweep ────────────────────────────────────────────────

/// Inclusive `start..=end` in steps of `step`. `end` is only included when
/// a step lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSweep {
    pub start: Threshold,
    pub end:   Threshold,
    pub step:  Threshold,
}

impl ThresholdSweep {
    pub fn thresholds(&self) -> Vec<Threshold> {
        if self.step == 0 || self.start > self.end {
            return Vec::new();
        }
        (self.start..=self.end).step_by(self.step as usize).collect()
    }

    /// A sweep spanning the pool's employee range, rounded outward to
    /// whole thousands. `None` when the pool is empty or has one size.
    pub fn spanning(accounts: &[Account], step: Threshold) -> Option<Self> {
        let (start, end) = threshold_range(accounts)?;
        if start == end || step == 0 {
            return None;
        }
        Some(Self { start, end, step })
    }
}

// ── Preference settings ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSetting {
    pub label:          String,
    pub geo_bonus:      f64,
    pub preserve_bonus: f64,
}

impl PreferenceSetting {
    pub fn new(label: impl Into<String>, geo_bonus: f64, preserve_bonus: f64) -> Self {
        Self { label: label.into(), geo_bonus, preserve_bonus }
    }
}

// ── Top level ──────────────────────────────────────────────────────

fn default_increment() -> u32 { DEFAULT_INCREMENT }
fn default_risk_threshold() -> u8 { DEFAULT_RISK_THRESHOLD }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub seed:                u64,
    pub generator:           GeneratorConfig,
    pub enterprise_reps:     Roster,
    pub mid_market_reps:     Roster,
    pub thresholds:          ThresholdSweep,
    pub preference_settings: Vec<PreferenceSetting>,
    #[serde(default = "default_increment")]
    pub increment:           u32,
    #[serde(default = "default_risk_threshold")]
    pub risk_threshold:      u8,
    /// Optional cap on Enterprise max/min rep ARR.
    #[serde(default)]
    pub enterprise_arr_cap:  Option<f64>,
    /// Optional cap on Mid-Market max/min rep ARR.
    #[serde(default)]
    pub mid_market_arr_cap:  Option<f64>,
}

impl SweepConfig {
    /// Load and validate a config file.
    /// In tests, use SweepConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SweepConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TerritoryResult<()> {
        self.generator.validate()?;

        if self.enterprise_reps.is_empty() && self.mid_market_reps.is_empty() {
            return Err(invalid("at least one rep is required across both rosters"));
        }
        if self.thresholds.thresholds().is_empty() {
            return Err(invalid(format!(
                "threshold sweep {}..={} step {} yields no thresholds",
                self.thresholds.start, self.thresholds.end, self.thresholds.step
            )));
        }
        if self.preference_settings.is_empty() {
            return Err(invalid("at least one preference setting is required"));
        }
        for setting in &self.preference_settings {
            let ok = |b: f64| b.is_finite() && b >= 0.0;
            if !ok(setting.geo_bonus) || !ok(setting.preserve_bonus) {
                return Err(invalid(format!(
                    "preference setting '{}' has a negative or non-finite bonus",
                    setting.label
                )));
            }
        }
        if self.increment == 0 {
            return Err(invalid("weight increment must be > 0"));
        }
        if self.risk_threshold > 100 {
            return Err(invalid(format!("risk threshold {} exceeds 100", self.risk_threshold)));
        }
        for (name, cap) in [
            ("enterprise_arr_cap", self.enterprise_arr_cap),
            ("mid_market_arr_cap", self.mid_market_arr_cap),
        ] {
            if let Some(cap) = cap {
                // A max/min ratio is never below 1.
                if !(cap.is_finite() && cap >= 1.0) {
                    return Err(invalid(format!("{name} must be a finite ratio >= 1.0, got {cap}")));
                }
            }
        }
        Ok(())
    }

    /// Every rep id across both rosters, Enterprise first.
    /// This is the pool incumbent owners are drawn from.
    pub fn all_rep_ids(&self) -> Vec<RepId> {
        self.enterprise_reps
            .ids()
            .chain(self.mid_market_reps.ids())
            .map(str::to_string)
            .collect()
    }

    pub fn optimize_options(&self, setting: &PreferenceSetting, cap: Option<f64>) -> OptimizeOptions {
        OptimizeOptions {
            geo_bonus:      setting.geo_bonus,
            preserve_bonus: setting.preserve_bonus,
            increment:      self.increment,
            risk_threshold: self.risk_threshold,
            arr_ratio_cap:  cap,
        }
    }

    /// The standard experiment: 500 accounts, 4 Enterprise reps, 6 Mid-Market
    /// reps, thresholds 5K–145K, three preference settings.
    pub fn reference() -> Self {
        Self {
            seed: 42,
            generator: GeneratorConfig {
                account_count: 500,
                arr_min:       10_000.0,
                arr_max:       500_000.0,
                employees_min: 1_500,
                employees_max: 200_000,
                locations:     ["GA", "NC", "CA", "OH", "TX", "NY"].map(String::from).to_vec(),
            },
            enterprise_reps: roster_of(&[
                ("Mickey", "GA"),
                ("Goofy", "NC"),
                ("Pluto", "CA"),
                ("Daisy", "OH"),
            ]),
            mid_market_reps: roster_of(&[
                ("Minnie", "TX"),
                ("Donald", "NY"),
                ("Ariel", "GA"),
                ("Simba", "CA"),
                ("Elsa", "NC"),
                ("Moana", "OH"),
            ]),
            thresholds: ThresholdSweep { start: 5_000, end: 150_000, step: 10_000 },
            preference_settings: vec![
                PreferenceSetting::new("No prefs", 0.00, 0.00),
                PreferenceSetting::new("Default (0.05/0.05)", 0.05, 0.05),
                PreferenceSetting::new("Max prefs (0.10/0.10)", 0.10, 0.10),
            ],
            increment:          DEFAULT_INCREMENT,
            risk_threshold:     DEFAULT_RISK_THRESHOLD,
            enterprise_arr_cap: None,
            mid_market_arr_cap: None,
        }
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            seed:                7,
            generator:           GeneratorConfig::default_test(),
            enterprise_reps:     roster_of(&[("Mickey", "GA"), ("Goofy", "NC")]),
            mid_market_reps:     roster_of(&[("Minnie", "CA"), ("Donald", "GA"), ("Elsa", "NC")]),
            thresholds:          ThresholdSweep { start: 50_000, end: 150_000, step: 50_000 },
            preference_settings: vec![
                PreferenceSetting::new("No prefs", 0.0, 0.0),
                PreferenceSetting::new("Max prefs", 0.10, 0.10),
            ],
            increment:           20,
            risk_threshold:      DEFAULT_RISK_THRESHOLD,
            enterprise_arr_cap:  None,
            mid_market_arr_cap:  None,
        }
    }
}

// Only for the hardcoded rosters above, whose ids are unique.
fn roster_of(reps: &[(&str, &str)]) -> Roster {
    let roster = Roster::new(reps.iter().map(|(id, loc)| Rep::new(*id, *loc)).collect());
    debug_assert!(roster.is_ok(), "hardcoded roster has duplicate rep ids: {roster:?}");
    roster.unwrap_or_default()
}

fn invalid(reason: impl Into<String>) -> TerritoryError {
    TerritoryError::InvalidConfig { reason: reason.into() }
}
