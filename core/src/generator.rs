//! Synthetic account generation.
//!
//! All generation is deterministic: same seed, same config, same accounts.
//! Each attribute draws from its own stream (see rng.rs), so changing how
//! one attribute is generated leaves the others untouched.

use crate::{
    account::Account,
    config::GeneratorConfig,
    error::{TerritoryError, TerritoryResult},
    rng::{RngBank, StreamSlot},
    types::RepId,
};

pub struct AccountGenerator<'c> {
    config: &'c GeneratorConfig,
}

impl<'c> AccountGenerator<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate `config.account_count` accounts with ids 0..n.
    /// `current_reps` is the pool the incumbent owner is drawn from.
    pub fn generate(&self, seed: u64, current_reps: &[RepId]) -> TerritoryResult<Vec<Account>> {
        self.config.validate()?;
        if current_reps.is_empty() {
            return Err(TerritoryError::InvalidConfig {
                reason: "account generation needs at least one current rep".into(),
            });
        }

        let cfg = self.config;
        let bank = RngBank::new(seed);
        let mut arr_rng = bank.for_stream(StreamSlot::Arr);
        let mut employee_rng = bank.for_stream(StreamSlot::Employees);
        let mut risk_rng = bank.for_stream(StreamSlot::RiskScore);
        let mut location_rng = bank.for_stream(StreamSlot::Location);
        let mut rep_rng = bank.for_stream(StreamSlot::CurrentRep);
        log::debug!(
            "generator: streams {} seeded from {seed}",
            [&arr_rng, &employee_rng, &risk_rng, &location_rng, &rep_rng]
                .map(|r| r.name())
                .join(", ")
        );

        let accounts: Vec<Account> = (0..cfg.account_count as u64)
            .map(|id| Account {
                id,
                arr: arr_rng.uniform(cfg.arr_min, cfg.arr_max),
                employees: employee_rng.uniform(cfg.employees_min as f64, cfg.employees_max as f64)
                    as u64,
                risk_score: risk_rng.next_u64_below(101) as u8,
                location: location_rng.pick(&cfg.locations).clone(),
                current_rep: rep_rng.pick(current_reps).clone(),
            })
            .collect();

        log::info!(
            "generator: seed={seed} produced {} accounts across {} locations",
            accounts.len(),
            cfg.locations.len()
        );
        Ok(accounts)
    }
}
