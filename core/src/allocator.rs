//! Greedy weighted allocation of accounts to reps.
//!
//! ALGORITHM (one pass, every account visited exactly once):
//!   1. Stable-sort accounts by ARR descending. Equal ARR keeps input order.
//!   2. For each account, score every rep:
//!        need     = 1 - (load - min) / (max - min) per dimension,
//!                   or 0.5 when every rep carries the same load
//!        priority = (w_arr * arr_need + w_acct * acct_need + w_risk * risk_need) / 100
//!        score    = priority * (1 + geo_bonus * [home match] + preserve_bonus * [current rep])
//!   3. Assign to the highest score. Ties go to the earliest rep in roster order.
//!   4. Fold the account into the winner's load.
//!
//! RULES:
//!   - Pure function of its inputs. No state survives between calls.
//!   - No randomness. Same inputs, same account order, same result.

use crate::{
    account::Account,
    roster::Roster,
    types::{AccountId, RepId},
    weights::WeightTriple,
};
use serde::Serialize;
use std::fmt;

/// Need assigned to every rep in a dimension where all loads are equal.
pub const NEUTRAL_NEED: f64 = 0.5;

/// Running totals for one rep during a single allocation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepresentativeLoad<'a> {
    rep:           RepId,
    total_arr:     f64,
    account_count: u64,
    high_risk_arr: f64,
    assignments:   Vec<&'a Account>,
}

impl<'a> RepresentativeLoad<'a> {
    fn empty(rep: RepId) -> Self {
        Self {
            rep,
            total_arr: 0.0,
            account_count: 0,
            high_risk_arr: 0.0,
            assignments: Vec::new(),
        }
    }

    fn assign(&mut self, account: &'a Account, risk_threshold: u8) {
        self.total_arr += account.arr;
        self.account_count += 1;
        if account.is_high_risk(risk_threshold) {
            self.high_risk_arr += account.arr;
        }
        self.assignments.push(account);
    }

    pub fn rep(&self) -> &str { &self.rep }
    pub fn total_arr(&self) -> f64 { self.total_arr }
    pub fn account_count(&self) -> u64 { self.account_count }
    pub fn high_risk_arr(&self) -> f64 { self.high_risk_arr }

    /// Accounts in the order they were assigned.
    pub fn assignments(&self) -> &[&'a Account] { &self.assignments }
}

/// Result of one allocation run: one load per rep, in roster order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation<'a> {
    loads: Vec<RepresentativeLoad<'a>>,
}

impl<'a> Allocation<'a> {
    fn empty_for(roster: &Roster) -> Self {
        Self {
            loads: roster.iter().map(|r| RepresentativeLoad::empty(r.id.clone())).collect(),
        }
    }

    pub fn len(&self) -> usize { self.loads.len() }
    pub fn is_empty(&self) -> bool { self.loads.is_empty() }

    pub fn loads(&self) -> &[RepresentativeLoad<'a>] { &self.loads }

    pub fn iter(&self) -> std::slice::Iter<'_, RepresentativeLoad<'a>> { self.loads.iter() }

    pub fn get(&self, rep: &str) -> Option<&RepresentativeLoad<'a>> {
        self.loads.iter().find(|l| l.rep == rep)
    }

    /// Rep that received `account_id`, if any.
    pub fn owner_of(&self, account_id: AccountId) -> Option<&str> {
        self.loads
            .iter()
            .find(|l| l.assignments.iter().any(|a| a.id == account_id))
            .map(|l| l.rep.as_str())
    }

    pub fn assigned_count(&self) -> usize {
        self.loads.iter().map(|l| l.assignments.len()).sum()
    }

    pub fn arr_totals(&self) -> Vec<f64> {
        self.loads.iter().map(|l| l.total_arr).collect()
    }

    pub fn account_counts(&self) -> Vec<f64> {
        self.loads.iter().map(|l| l.account_count as f64).collect()
    }

    pub fn high_risk_arr_totals(&self) -> Vec<f64> {
        self.loads.iter().map(|l| l.high_risk_arr).collect()
    }

    /// Largest rep ARR over smallest rep ARR.
    /// `None` for an empty roster or when any rep holds no ARR.
    pub fn arr_max_min_ratio(&self) -> Option<f64> {
        let spread = Spread::of(self.loads.iter().map(|l| l.total_arr))?;
        if spread.min <= 0.0 {
            return None;
        }
        Some(spread.max / spread.min)
    }
}

impl<'a, 'b> IntoIterator for &'b Allocation<'a> {
    type Item = &'b RepresentativeLoad<'a>;
    type IntoIter = std::slice::Iter<'b, RepresentativeLoad<'a>>;

    fn into_iter(self) -> Self::IntoIter { self.loads.iter() }
}

/// One rep's score for one account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RepScore {
    /// Position of the rep in the roster.
    pub rep_index:      usize,
    pub arr_need:       f64,
    pub account_need:   f64,
    pub risk_need:      f64,
    pub priority:       f64,
    pub geo_match:      bool,
    pub preserve_match: bool,
    pub multiplier:     f64,
    pub score:          f64,
}

/// Why the winning rep won an account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WinReason {
    SoleCandidate,
    /// Another rep scored identically; roster order decided.
    TiedOnScore { with: RepId },
    /// The unboosted priority alone would not have beaten `runner_up`.
    PreferenceDecisive {
        geo:       bool,
        preserve:  bool,
        runner_up: RepId,
    },
    HighestNeed,
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SoleCandidate => write!(f, "only rep in roster"),
            Self::TiedOnScore { with } => {
                write!(f, "tied with {with}, won on roster order")
            }
            Self::PreferenceDecisive { geo, preserve, runner_up } => {
                let bonus = match (geo, preserve) {
                    (true, true) => "geo + preserve bonuses",
                    (true, false) => "geo bonus",
                    _ => "preserve bonus",
                };
                write!(f, "{bonus} lifted score above {runner_up}")
            }
            Self::HighestNeed => write!(f, "highest blended need"),
        }
    }
}

/// Audit record for a single assignment decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationStep {
    /// Position in processing order (0-based).
    pub order:      usize,
    pub account_id: AccountId,
    /// Every rep's score, in roster order.
    pub scores:     Vec<RepScore>,
    pub winner:     RepId,
    pub reason:     WinReason,
}

/// Assign every account to exactly one rep.
///
/// Empty `accounts` or an empty `roster` is valid and yields empty loads.
/// `weights` are used as given; see [`WeightTriple::unchecked`].
pub fn allocate<'a>(
    accounts: &'a [Account],
    roster: &Roster,
    weights: WeightTriple,
    geo_bonus: f64,
    preserve_bonus: f64,
    risk_threshold: u8,
) -> Allocation<'a> {
    run(accounts, roster, weights, geo_bonus, preserve_bonus, risk_threshold, None)
}

/// Same as [`allocate`], also recording one [`AllocationStep`] per account.
pub fn allocate_traced<'a>(
    accounts: &'a [Account],
    roster: &Roster,
    weights: WeightTriple,
    geo_bonus: f64,
    preserve_bonus: f64,
    risk_threshold: u8,
) -> (Allocation<'a>, Vec<AllocationStep>) {
    let mut steps = Vec::with_capacity(accounts.len());
    let allocation = run(
        accounts,
        roster,
        weights,
        geo_bonus,
        preserve_bonus,
        risk_threshold,
        Some(&mut steps),
    );
    (allocation, steps)
}

fn run<'a>(
    accounts: &'a [Account],
    roster: &Roster,
    weights: WeightTriple,
    geo_bonus: f64,
    preserve_bonus: f64,
    risk_threshold: u8,
    mut trace: Option<&mut Vec<AllocationStep>>,
) -> Allocation<'a> {
    let mut allocation = Allocation::empty_for(roster);
    if accounts.is_empty() || roster.is_empty() {
        return allocation;
    }

    // Stable: equal ARR keeps input order.
    let mut ordered: Vec<&'a Account> = accounts.iter().collect();
    ordered.sort_by(|a, b| b.arr.total_cmp(&a.arr));

    let mut scores: Vec<RepScore> = Vec::with_capacity(roster.len());

    for (order, account) in ordered.into_iter().enumerate() {
        let loads = &allocation.loads;
        // Roster is non-empty, so every spread exists.
        let (Some(arr), Some(count), Some(risk)) = (
            Spread::of(loads.iter().map(|l| l.total_arr)),
            Spread::of(loads.iter().map(|l| l.account_count as f64)),
            Spread::of(loads.iter().map(|l| l.high_risk_arr)),
        ) else {
            break;
        };

        scores.clear();
        for (rep_index, (rep, load)) in roster.iter().zip(loads).enumerate() {
            let arr_need = arr.need(load.total_arr);
            let account_need = count.need(load.account_count as f64);
            let risk_need = risk.need(load.high_risk_arr);

            let priority = (f64::from(weights.arr) * arr_need
                + f64::from(weights.account) * account_need
                + f64::from(weights.risk) * risk_need)
                / 100.0;

            let geo_match = rep.is_home(&account.location);
            let preserve_match = rep.id == account.current_rep;
            let multiplier = 1.0
                + if geo_match { geo_bonus } else { 0.0 }
                + if preserve_match { preserve_bonus } else { 0.0 };

            scores.push(RepScore {
                rep_index,
                arr_need,
                account_need,
                risk_need,
                priority,
                geo_match,
                preserve_match,
                multiplier,
                score: priority * multiplier,
            });
        }

        let winner = pick_winner(&scores);

        if let Some(steps) = trace.as_deref_mut() {
            steps.push(AllocationStep {
                order,
                account_id: account.id,
                scores: scores.clone(),
                winner: allocation.loads[winner].rep.clone(),
                reason: explain(&scores, winner, &allocation),
            });
        }

        allocation.loads[winner].assign(account, risk_threshold);
    }

    allocation
}

/// Ordered scan; only a strictly higher score replaces the leader.
fn pick_winner(scores: &[RepScore]) -> usize {
    let mut best = 0;
    for (i, candidate) in scores.iter().enumerate().skip(1) {
        if candidate.score > scores[best].score {
            best = i;
        }
    }
    best
}

fn explain(scores: &[RepScore], winner: usize, allocation: &Allocation<'_>) -> WinReason {
    let mut runner_up: Option<&RepScore> = None;
    for candidate in scores.iter().filter(|s| s.rep_index != winner) {
        match runner_up {
            Some(best) if best.score >= candidate.score => {}
            _ => runner_up = Some(candidate),
        }
    }
    let Some(runner_up) = runner_up else {
        return WinReason::SoleCandidate;
    };

    let won = &scores[winner];
    let runner_up_rep = allocation.loads[runner_up.rep_index].rep.clone();
    if runner_up.score == won.score {
        WinReason::TiedOnScore { with: runner_up_rep }
    } else if won.multiplier > 1.0 && won.priority <= runner_up.score {
        WinReason::PreferenceDecisive {
            geo:       won.geo_match,
            preserve:  won.preserve_match,
            runner_up: runner_up_rep,
        }
    } else {
        WinReason::HighestNeed
    }
}

/// Min and max of one load dimension across the roster.
#[derive(Debug, Clone, Copy)]
struct Spread {
    min: f64,
    max: f64,
}

impl Spread {
    fn of(mut values: impl Iterator<Item = f64>) -> Option<Self> {
        let first = values.next()?;
        Some(values.fold(Self { min: first, max: first }, |s, v| Self {
            min: s.min.min(v),
            max: s.max.max(v),
        }))
    }

    fn need(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range > 0.0 {
            1.0 - (value - self.min) / range
        } else {
            NEUTRAL_NEED
        }
    }
}
