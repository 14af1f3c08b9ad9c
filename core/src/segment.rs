//! Threshold segmentation by employee count.
//!
//! Accounts with `employees >= threshold` are Enterprise, the rest are
//! Mid-Market. Each segment is allocated against its own roster.

use crate::{account::Account, fairness::mean, types::Threshold};
use serde::{Deserialize, Serialize};

/// Rounding unit for threshold ranges.
pub const THRESHOLD_STEP: Threshold = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Enterprise,
    MidMarket,
}

impl Segment {
    pub fn classify(account: &Account, threshold: Threshold) -> Self {
        if account.employees >= threshold {
            Self::Enterprise
        } else {
            Self::MidMarket
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Enterprise => "Enterprise",
            Self::MidMarket  => "Mid Market",
        }
    }

    /// Inverse of `label`, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "enterprise" => Some(Self::Enterprise),
            "mid market" => Some(Self::MidMarket),
            _ => None,
        }
    }
}

/// Disjoint split of an account pool. Input order is kept in both halves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segments {
    pub enterprise: Vec<Account>,
    pub mid_market: Vec<Account>,
}

impl Segments {
    /// Enterprise average ARR over Mid-Market average ARR.
    pub fn deal_size_ratio(&self) -> Option<f64> {
        deal_size_ratio(&self.enterprise, &self.mid_market)
    }
}

pub fn segment_accounts(accounts: &[Account], threshold: Threshold) -> Segments {
    let (enterprise, mid_market): (Vec<Account>, Vec<Account>) = accounts
        .iter()
        .cloned()
        .partition(|a| Segment::classify(a, threshold) == Segment::Enterprise);
    Segments { enterprise, mid_market }
}

/// Smallest and largest employee counts, rounded outward to whole thousands.
/// `None` for an empty pool.
pub fn threshold_range(accounts: &[Account]) -> Option<(Threshold, Threshold)> {
    let min = accounts.iter().map(|a| a.employees).min()?;
    let max = accounts.iter().map(|a| a.employees).max()?;
    Some((
        (min / THRESHOLD_STEP) * THRESHOLD_STEP,
        max.div_ceil(THRESHOLD_STEP) * THRESHOLD_STEP,
    ))
}

/// `None` when either side is empty or Mid-Market averages zero ARR.
pub fn deal_size_ratio(enterprise: &[Account], mid_market: &[Account]) -> Option<f64> {
    let arr = |accts: &[Account]| accts.iter().map(|a| a.arr).collect::<Vec<_>>();
    let enterprise_avg = mean(&arr(enterprise))?;
    let mid_market_avg = mean(&arr(mid_market))?;
    if mid_market_avg == 0.0 {
        return None;
    }
    Some(enterprise_avg / mid_market_avg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: u64, arr: f64, employees: u64) -> Account {
        Account {
            id,
            arr,
            employees,
            risk_score: 0,
            location: "GA".into(),
            current_rep: "Mickey".into(),
        }
    }

    #[test]
    fn threshold_boundary_is_enterprise() {
        let accounts = vec![account(0, 1.0, 4_999), account(1, 1.0, 5_000), account(2, 1.0, 5_001)];
        let segments = segment_accounts(&accounts, 5_000);

        let ids = |v: &[Account]| v.iter().map(|a| a.id).collect::<Vec<_>>();
        assert_eq!(ids(&segments.enterprise), vec![1, 2]);
        assert_eq!(ids(&segments.mid_market), vec![0]);
    }

    #[test]
    fn segment_labels_parse_case_insensitively() {
        assert_eq!(Segment::from_label(" ENTERPRISE "), Some(Segment::Enterprise));
        assert_eq!(Segment::from_label("mid market"), Some(Segment::MidMarket));
        assert_eq!(Segment::from_label(Segment::MidMarket.label()), Some(Segment::MidMarket));
        assert_eq!(Segment::from_label("Mid-Market"), None);
    }

    #[test]
    fn threshold_range_rounds_outward() {
        let accounts = vec![account(0, 1.0, 1_501), account(1, 1.0, 199_999)];
        assert_eq!(threshold_range(&accounts), Some((1_000, 200_000)));
        assert_eq!(threshold_range(&[]), None);
    }

    #[test]
    fn deal_size_ratio_compares_segment_averages() {
        let enterprise = vec![account(0, 300.0, 10), account(1, 100.0, 10)];
        let mid_market = vec![account(2, 50.0, 1), account(3, 150.0, 1)];
        assert_eq!(deal_size_ratio(&enterprise, &mid_market), Some(2.0));
        assert_eq!(deal_size_ratio(&enterprise, &[]), None);
    }
}
