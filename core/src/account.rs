//! Business accounts, the unit of assignment.

use crate::types::{AccountId, Location, RepId};
use serde::{Deserialize, Serialize};

/// An account record. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id:          AccountId,
    /// Annual recurring revenue.
    pub arr:         f64,
    /// Headcount; only the segmenter reads this.
    pub employees:   u64,
    /// 0–100.
    pub risk_score:  u8,
    pub location:    Location,
    /// Rep that owns the account today (continuity preference).
    pub current_rep: RepId,
}

impl Account {
    pub fn is_high_risk(&self, risk_threshold: u8) -> bool {
        self.risk_score >= risk_threshold
    }
}
