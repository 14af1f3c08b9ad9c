//! Blend weights and the discretized weight simplex.

use crate::error::{TerritoryError, TerritoryResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Total that a well-formed triple's components add up to.
pub const WEIGHT_TOTAL: u32 = 100;

/// Relative importance of balancing ARR, account count and high-risk ARR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeightTriple {
    pub arr:     u32,
    pub account: u32,
    pub risk:    u32,
}

impl WeightTriple {
    /// Neutral blend returned when there is nothing to optimize.
    pub const NEUTRAL: WeightTriple = WeightTriple { arr: 34, account: 33, risk: 33 };

    /// Strict constructor: the components must sum to 100.
    pub fn new(arr: u32, account: u32, risk: u32) -> TerritoryResult<Self> {
        let sum = arr.saturating_add(account).saturating_add(risk);
        if sum != WEIGHT_TOTAL {
            return Err(TerritoryError::InvalidWeightTriple { arr, account, risk, sum });
        }
        Ok(Self { arr, account, risk })
    }

    /// Accepts any triple. The allocator blends it as given, so a sum
    /// other than 100 rescales every priority.
    pub const fn unchecked(arr: u32, account: u32, risk: u32) -> Self {
        Self { arr, account, risk }
    }

    pub fn sum(&self) -> u32 {
        self.arr.saturating_add(self.account).saturating_add(self.risk)
    }

    pub fn as_tuple(&self) -> (u32, u32, u32) {
        (self.arr, self.account, self.risk)
    }
}

impl fmt::Display for WeightTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.arr, self.account, self.risk)
    }
}

/// Every triple on the simplex at a fixed increment.
///
/// ORDER: ascending `arr`, then ascending `account`, with `risk` taking the
/// remainder. The optimizer keeps the first best candidate, so this order
/// is the optimizer's tie-break and must not change.
///
/// `arr` runs 0..=100 and `account` runs 0..=100-arr, both stepping by the
/// increment. When the increment does not divide 100 the remainder lands
/// in `risk`, which is then not itself a multiple of the increment.
#[derive(Debug, Clone)]
pub struct WeightGrid {
    increment: u32,
    arr:       u32,
    account:   u32,
    done:      bool,
}

impl WeightGrid {
    /// `increment` must be positive; see [`WeightGrid::with_increment`].
    pub fn new(increment: u32) -> Self {
        assert!(increment > 0, "increment must be > 0");
        Self { increment, arr: 0, account: 0, done: false }
    }

    /// Like `new`, but a zero increment falls back to 1.
    pub fn with_increment(increment: u32) -> Self {
        if increment == 0 {
            log::warn!("weight grid: increment 0 is not a step, using 1");
        }
        Self::new(increment.max(1))
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }
}

impl Iterator for WeightGrid {
    type Item = WeightTriple;

    fn next(&mut self) -> Option<WeightTriple> {
        if self.done {
            return None;
        }
        let current = WeightTriple::unchecked(
            self.arr,
            self.account,
            WEIGHT_TOTAL - self.arr - self.account,
        );

        // Advance: next account step if it fits, else next arr row.
        if self.account + self.increment <= WEIGHT_TOTAL - self.arr {
            self.account += self.increment;
        } else if self.arr + self.increment <= WEIGHT_TOTAL {
            self.arr += self.increment;
            self.account = 0;
        } else {
            self.done = true;
        }
        Some(current)
    }
}
