//! Per-account assignment export.
//!
//! One row per account in file order: the original columns, the segment,
//! the assigned rep, whether the account stayed with its current rep, and
//! why the rep won. Accounts in a segment without reps export an empty
//! Assigned_Rep and Reason.

use crate::{
    allocator::AllocationStep,
    dataset::Dataset,
    error::TerritoryResult,
    plan::TerritoryPlan,
    segment::Segment,
    types::{AccountId, RepId},
};
use serde::Serialize;
use std::{collections::HashMap, io};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRow {
    #[serde(rename = "Account_ID")]
    pub account_id:       String,
    #[serde(rename = "Account_Name")]
    pub account_name:     String,
    #[serde(rename = "Original_Rep")]
    pub original_rep:     RepId,
    #[serde(rename = "ARR")]
    pub arr:              f64,
    #[serde(rename = "Num_Employees")]
    pub employees:        u64,
    #[serde(rename = "Location")]
    pub location:         String,
    #[serde(rename = "Risk_Score")]
    pub risk_score:       Option<u8>,
    #[serde(rename = "Segment")]
    pub segment:          &'static str,
    #[serde(rename = "Assigned_Rep")]
    pub assigned_rep:     Option<RepId>,
    #[serde(rename = "Kept_Current_Rep")]
    pub kept_current_rep: bool,
    #[serde(rename = "Reason")]
    pub reason:           Option<String>,
}

pub fn assignment_rows(dataset: &Dataset, plan: &TerritoryPlan) -> Vec<AssignmentRow> {
    let decisions: HashMap<AccountId, (Segment, &AllocationStep)> = plan
        .segments()
        .into_iter()
        .flat_map(|s| s.steps.iter().map(move |step| (step.account_id, (s.segment, step))))
        .collect();

    dataset
        .accounts
        .iter()
        .map(|record| {
            let account = &record.account;
            let decision = decisions.get(&account.id);
            let segment = decision
                .map(|(segment, _)| *segment)
                .unwrap_or_else(|| Segment::classify(account, plan.threshold));

            AssignmentRow {
                account_id:       record.external_id.clone(),
                account_name:     record.name.clone(),
                original_rep:     account.current_rep.clone(),
                arr:              account.arr,
                employees:        account.employees,
                location:         account.location.clone(),
                risk_score:       record.risk_score,
                segment:          segment.label(),
                assigned_rep:     decision.map(|(_, step)| step.winner.clone()),
                kept_current_rep: decision.is_some_and(|(_, step)| step.winner == account.current_rep),
                reason:           decision.map(|(_, step)| step.reason.to_string()),
            }
        })
        .collect()
}

/// Write rows as CSV with a header line.
pub fn write_assignments<W: io::Write>(writer: W, rows: &[AssignmentRow]) -> TerritoryResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
