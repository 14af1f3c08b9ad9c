//! Territory plans over loaded data and the per-account assignment export.

use territory_core::{
    allocator::WinReason,
    dataset::Dataset,
    export::{assignment_rows, write_assignments},
    optimizer::{optimize_weights_with, OptimizeOptions},
    plan::{plan_territories, PlanOptions},
    segment::{segment_accounts, Segment},
    weights::WeightTriple,
};

const REPS: &str = "\
Rep_Name,Segment,Location
R1,Enterprise,GA
R2,Enterprise,NC
M1,Mid Market,TX
";

// A1 and A2 tie on ARR, so A1 is processed first.
const ACCOUNTS: &str = "\
Account_ID,Account_Name,Original_Rep,ARR,Num_Employees,Location,Risk_Score
A1,Acme,R2,100,5000,GA,80
A2,Beta,R1,100,5000,NC,
A3,Gamma,M1,50,200,TX,10
";

const ARR_ONLY: WeightTriple = WeightTriple::unchecked(100, 0, 0);

fn dataset() -> Dataset {
    Dataset::from_readers(ACCOUNTS.as_bytes(), REPS.as_bytes()).expect("test dataset")
}

fn fixed(threshold: u64, preserve_bonus: f64) -> PlanOptions {
    PlanOptions {
        weights: Some(ARR_ONLY),
        preserve_bonus,
        ..PlanOptions::at_threshold(threshold)
    }
}

#[test]
fn fixed_weights_trace_every_account_once() {
    let data = dataset();
    let plan = plan_territories(&data, &fixed(1_000, 0.0)).unwrap();

    assert_eq!(plan.enterprise.weights, ARR_ONLY);
    assert!(plan.enterprise.optimum.is_none(), "Fixed weights skip the search");
    assert_eq!(plan.enterprise.steps.len(), 2);
    assert_eq!(plan.mid_market.steps.len(), 1);

    let a1 = plan.decision(0).expect("A1 assigned");
    assert_eq!(a1.winner, "R1");
    assert_eq!(a1.reason, WinReason::TiedOnScore { with: "R2".into() });
    assert_eq!(plan.decision(1).unwrap().winner, "R2");
    assert_eq!(plan.decision(2).unwrap().reason, WinReason::SoleCandidate);

    let totals: Vec<f64> = plan.enterprise.reps.iter().map(|r| r.total_arr).collect();
    assert_eq!(totals, vec![100.0, 100.0]);
    assert_eq!(plan.enterprise.reps[0].high_risk_arr, 100.0, "A1 risk 80 is high risk");
    assert_eq!(plan.enterprise.fairness.arr, 100.0);
    assert_eq!(plan.enterprise.fairness.risk, 0.0, "All high-risk ARR sits with R1");
}

#[test]
fn weighted_fairness_uses_the_plan_weights() {
    let data = dataset();
    let plan = plan_territories(&data, &fixed(1_000, 0.0)).unwrap();

    for segment in plan.segments() {
        assert_eq!(
            segment.weighted_fairness,
            segment.fairness.weighted_composite(segment.weights),
            "{} weighted composite",
            segment.segment.label()
        );
    }
}

#[test]
fn optimized_plan_matches_a_direct_search() {
    let data = dataset();
    let options = PlanOptions { increment: 25, ..PlanOptions::at_threshold(1_000) };
    let plan = plan_territories(&data, &options).unwrap();

    let accounts = data.accounts();
    let segments = segment_accounts(&accounts, 1_000);
    let expected = optimize_weights_with(
        &segments.enterprise,
        &data.roster(Segment::Enterprise).unwrap(),
        &OptimizeOptions { increment: 25, ..OptimizeOptions::default() },
    );

    assert_eq!(plan.enterprise.optimum, Some(expected));
    assert_eq!(plan.enterprise.weights, expected.weights);
}

#[test]
fn export_reports_winner_reason_and_retention() {
    let data = dataset();
    let plan = plan_territories(&data, &fixed(1_000, 0.10)).unwrap();
    let rows = assignment_rows(&data, &plan);

    let ids: Vec<&str> = rows.iter().map(|r| r.account_id.as_str()).collect();
    assert_eq!(ids, vec!["A1", "A2", "A3"], "Rows keep file order");

    // The continuity bonus turns the opening tie into a win for A1's current rep.
    assert_eq!(rows[0].assigned_rep.as_deref(), Some("R2"));
    assert!(rows[0].kept_current_rep);
    assert_eq!(rows[0].reason.as_deref(), Some("preserve bonus lifted score above R1"));

    assert_eq!(rows[1].assigned_rep.as_deref(), Some("R1"));
    assert!(rows[1].kept_current_rep);
    assert_eq!(rows[1].risk_score, None);

    assert_eq!(rows[2].segment, "Mid Market");
    assert_eq!(rows[2].reason.as_deref(), Some("only rep in roster"));
}

#[test]
fn without_preference_accounts_can_move_off_their_current_rep() {
    let data = dataset();
    let plan = plan_territories(&data, &fixed(1_000, 0.0)).unwrap();
    let rows = assignment_rows(&data, &plan);

    let kept: Vec<bool> = rows.iter().map(|r| r.kept_current_rep).collect();
    assert_eq!(kept, vec![false, false, true]);
}

#[test]
fn segment_without_reps_leaves_accounts_unassigned() {
    let reps = "Rep_Name,Segment,Location\nR1,Enterprise,GA\nR2,Enterprise,NC\n";
    let data = Dataset::from_readers(ACCOUNTS.as_bytes(), reps.as_bytes()).unwrap();
    let plan = plan_territories(&data, &fixed(1_000, 0.0)).unwrap();
    let rows = assignment_rows(&data, &plan);

    assert!(plan.mid_market.steps.is_empty());
    assert_eq!(rows[2].segment, "Mid Market");
    assert_eq!(rows[2].assigned_rep, None);
    assert_eq!(rows[2].reason, None);
    assert!(!rows[2].kept_current_rep);
}

#[test]
fn written_csv_has_header_and_one_line_per_account() {
    let data = dataset();
    let plan = plan_territories(&data, &fixed(1_000, 0.0)).unwrap();
    let rows = assignment_rows(&data, &plan);

    let mut buffer = Vec::new();
    write_assignments(&mut buffer, &rows).expect("write to memory");
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines[0],
        "Account_ID,Account_Name,Original_Rep,ARR,Num_Employees,Location,Risk_Score,\
         Segment,Assigned_Rep,Kept_Current_Rep,Reason"
    );
    assert_eq!(lines.len(), 4);
    assert!(lines[2].starts_with("A2,Beta,R1,100.0,5000,NC,,Enterprise,R2,false,"), "{}", lines[2]);

    // Reasons containing commas are quoted and survive a round trip.
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let reasons: Vec<String> = reader
        .records()
        .map(|r| r.unwrap().get(10).unwrap().to_string())
        .collect();
    assert_eq!(reasons[0], "tied with R2, won on roster order");
}
