//! sweep-runner: headless sensitivity sweep and territory planning for the
//! territory balance engine.
//!
//! Usage:
//!   sweep-runner
//!   sweep-runner --seed 7 --accounts 300 --increment 10
//!   sweep-runner --config data/sweep_config.json --json
//!   sweep-runner --auto-thresholds
//!   sweep-runner --accounts-csv accounts.csv --reps-csv reps.csv --threshold 50000
//!   sweep-runner --accounts-csv accounts.csv --reps-csv reps.csv --threshold 50000 \
//!                --geo 0.05 --preserve 0.05 --weights 50,30,20 --export assignments.csv

use anyhow::{anyhow, Result};
use std::{env, path::Path};
use territory_core::{
    config::{SweepConfig, ThresholdSweep},
    dataset::Dataset,
    export::{assignment_rows, write_assignments, AssignmentRow},
    fairness::FairnessBand,
    optimizer::DEFAULT_INCREMENT,
    plan::{plan_territories, PlanOptions, SegmentPlan, TerritoryPlan},
    segment::THRESHOLD_STEP,
    sweep::{SensitivitySweep, SettingSweep, SweepReport},
    types::DEFAULT_RISK_THRESHOLD,
    weights::WeightTriple,
};

#[derive(serde::Serialize)]
struct SweepOutput<'a> {
    run_id:      String,
    started_at:  chrono::DateTime<chrono::Utc>,
    config_path: Option<&'a str>,
    thresholds:  Vec<u64>,
    report:      SweepReport,
}

#[derive(serde::Serialize)]
struct PlanOutput<'a> {
    run_id:       String,
    started_at:   chrono::DateTime<chrono::Utc>,
    accounts_csv: &'a str,
    reps_csv:     &'a str,
    plan:         TerritoryPlan,
    assignments:  Vec<AssignmentRow>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    match flag_value(&args, "--accounts-csv") {
        Some(accounts_csv) => run_plan(&args, accounts_csv),
        None => run_sweep(&args),
    }
}

fn run_sweep(args: &[String]) -> Result<()> {
    let config_path = flag_value(args, "--config");
    let json = args.iter().any(|a| a == "--json");
    let auto_thresholds = args.iter().any(|a| a == "--auto-thresholds");

    let mut config = match config_path {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::reference(),
    };
    config.seed = parse_arg(args, "--seed", config.seed);
    config.generator.account_count = parse_arg(args, "--accounts", config.generator.account_count);
    config.increment = parse_arg(args, "--increment", config.increment);

    let run_id = format!("sweep-{}-{}", config.seed, uuid::Uuid::new_v4());
    let started_at = chrono::Utc::now();

    let sweep = SensitivitySweep::new(&config)?;
    let accounts = sweep.generate_accounts()?;

    let thresholds = if auto_thresholds {
        ThresholdSweep::spanning(&accounts, THRESHOLD_STEP * 10)
            .map(|t| t.thresholds())
            .unwrap_or_else(|| {
                log::warn!("No usable employee range, falling back to configured thresholds");
                config.thresholds.thresholds()
            })
    } else {
        config.thresholds.thresholds()
    };

    if !json {
        println!("{}", "=".repeat(70));
        println!("SENSITIVITY CHART VOLATILITY TEST");
        println!("{}", "=".repeat(70));
        println!("  run_id:     {run_id}");
        println!("  started:    {}", started_at.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("  seed:       {}", config.seed);
        println!("  accounts:   {}", accounts.len());
        println!("  increment:  {}%", config.increment);
        println!("  thresholds: {}", thresholds.len());
        println!();
    }

    let report = sweep.run_with_thresholds(&accounts, &thresholds);

    if json {
        let output = SweepOutput { run_id, started_at, config_path, thresholds, report };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for setting in &report.settings {
            print_setting(setting);
        }
        print_conclusion();
    }

    Ok(())
}

fn run_plan(args: &[String], accounts_csv: &str) -> Result<()> {
    let reps_csv = flag_value(args, "--reps-csv")
        .ok_or_else(|| anyhow!("--reps-csv is required with --accounts-csv"))?;
    let threshold = flag_value(args, "--threshold")
        .ok_or_else(|| anyhow!("--threshold is required with --accounts-csv"))?
        .parse::<u64>()
        .map_err(|e| anyhow!("Invalid --threshold: {e}"))?;
    let weights = flag_value(args, "--weights").map(parse_weights).transpose()?;
    let json = args.iter().any(|a| a == "--json");

    let options = PlanOptions {
        threshold,
        geo_bonus: parse_arg(args, "--geo", 0.0),
        preserve_bonus: parse_arg(args, "--preserve", 0.0),
        weights,
        increment: parse_arg(args, "--increment", DEFAULT_INCREMENT),
        risk_threshold: parse_arg(args, "--risk-threshold", DEFAULT_RISK_THRESHOLD),
    };

    let run_id = format!("plan-{}", uuid::Uuid::new_v4());
    let started_at = chrono::Utc::now();

    let dataset = Dataset::load(Path::new(accounts_csv), Path::new(reps_csv))?;
    let plan = plan_territories(&dataset, &options)?;
    let assignments = assignment_rows(&dataset, &plan);

    if let Some(path) = flag_value(args, "--export") {
        let file = std::fs::File::create(path).map_err(|e| anyhow!("Cannot write {path}: {e}"))?;
        write_assignments(file, &assignments)?;
        log::info!("Exported {} assignments to {path}", assignments.len());
    }

    if json {
        let output = PlanOutput { run_id, started_at, accounts_csv, reps_csv, plan, assignments };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "=".repeat(70));
    println!("TERRITORY PLAN");
    println!("{}", "=".repeat(70));
    println!("  run_id:     {run_id}");
    println!("  started:    {}", started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  accounts:   {} ({} warnings)", dataset.accounts.len(), dataset.warnings.len());
    println!("  threshold:  {}", with_thousands(plan.threshold));
    println!("  bonuses:    geo={:.2} preserve={:.2}", options.geo_bonus, options.preserve_bonus);
    for warning in &dataset.warnings {
        println!("  warning:    {warning}");
    }

    for segment in plan.segments() {
        print_segment_plan(segment);
    }

    let kept = assignments.iter().filter(|a| a.kept_current_rep).count();
    println!("Combined fairness: {:.1}", plan.combined_score());
    println!("Kept current rep:  {kept} of {} accounts", assignments.len());
    Ok(())
}

fn print_segment_plan(plan: &SegmentPlan) {
    let source = match plan.optimum {
        Some(o) => format!("optimized over {} candidates", o.candidates_evaluated),
        None => "fixed".to_string(),
    };
    println!("\n### {} (weights {} {source})", plan.segment.label(), plan.weights);
    println!("{}", "-".repeat(70));
    println!(
        "{:>12} | {:>14} | {:>8} | {:>14}",
        "Rep", "ARR", "Accounts", "High-risk ARR"
    );
    println!("{}", "-".repeat(70));
    for rep in &plan.reps {
        println!(
            "{:>12} | {:>14} | {:>8} | {:>14}",
            rep.rep,
            with_thousands(rep.total_arr.round() as u64),
            rep.account_count,
            with_thousands(rep.high_risk_arr.round() as u64),
        );
    }
    println!("{}", "-".repeat(70));
    let f = &plan.fairness;
    println!(
        "Fairness: ARR {:.1}, accounts {:.1}, risk {:.1} -> composite {:.1} ({}), weighted {:.1}",
        f.arr,
        f.account,
        f.risk,
        f.composite,
        f.band().label(),
        plan.weighted_fairness
    );
    println!();
}

fn print_setting(sweep: &SettingSweep) {
    let s = &sweep.setting;
    println!(
        "\n### {} (geo={:.2}, preserve={:.2})",
        s.label, s.geo_bonus, s.preserve_bonus
    );
    println!("{}", "-".repeat(78));
    println!(
        "{:>10} | {:>8} | {:>8} | {:>13} | {:>10} | Optimal Weights",
        "Threshold", "E Accts", "MM Accts", "Best Fairness", "Band"
    );
    println!("{}", "-".repeat(78));

    for p in &sweep.points {
        let band = FairnessBand::classify(p.combined_score);
        let caps = if p.enterprise.constraints_met && p.mid_market.constraints_met {
            ""
        } else {
            " (cap unmet)"
        };
        println!(
            "{:>10} | {:>8} | {:>8} | {:>13.1} | {:>10} | E:{} MM:{}{caps}",
            with_thousands(p.threshold),
            p.enterprise_accounts,
            p.mid_market_accounts,
            p.combined_score,
            band.label(),
            p.enterprise.weights,
            p.mid_market.weights,
        );
    }

    println!("{}", "-".repeat(78));
    match sweep.volatility {
        Some(v) => {
            println!("Score range: {:.1} – {:.1} (spread: {:.1})", v.min, v.max, v.spread);
            println!("Score std dev: {:.2}", v.std_dev);
        }
        None => println!("  (No thresholds swept)"),
    }
    println!();
}

fn print_conclusion() {
    println!("\n{}", "=".repeat(70));
    println!("CONCLUSION");
    println!("{}", "=".repeat(70));
    println!(
        "
If the score spread is small (e.g., <5 points) and the optimal weights
are relatively stable across thresholds, the sensitivity chart will show
a smooth, interpretable curve.

If scores jump around wildly or optimal weights flip dramatically,
the chart may be noisy and harder to interpret.
"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// "50,30,20" -> (50, 30, 20). Components must sum to 100.
fn parse_weights(text: &str) -> Result<WeightTriple> {
    let parts = text
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("Invalid --weights '{text}': {e}"))?;
    match parts[..] {
        [arr, account, risk] => Ok(WeightTriple::new(arr, account, risk)?),
        _ => Err(anyhow!("--weights takes three comma-separated values, got '{text}'")),
    }
}

fn with_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
