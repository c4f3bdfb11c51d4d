//! SaaS projection CLI
//!
//! Runs projections from JSON assumption files, compares scenarios and prints
//! reseller snapshots.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use saas_projection::assumptions::loader::{load_assumptions, load_plan_catalog};
use saas_projection::projection::reseller::ResellerLine;
use saas_projection::projection::{ResellerDeal, DEFAULT_MAX_PERIODS};
use saas_projection::{
    AssumptionSet, PeriodResult, ProjectionConfig, ProjectionEngine, ProjectionResult, SaasMetrics,
    ScenarioRunner,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "saas_projection", version, about = "Multi-period SaaS financial projections")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Project one assumption set and print the results
    Run {
        /// JSON assumption file; the built-in baseline when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// CSV plan catalog replacing the plans of the assumption set
        #[arg(long)]
        plans: Option<PathBuf>,
        /// Write every period to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write the full result and metrics to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_MAX_PERIODS)]
        max_periods: u32,
        /// Periods to print to the console
        #[arg(long, default_value_t = 24)]
        show: usize,
    },
    /// Project several assumption files in parallel and compare headline metrics
    Compare {
        #[arg(long = "config", required = true, num_args = 1..)]
        configs: Vec<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_MAX_PERIODS)]
        max_periods: u32,
    },
    /// Price the clients a reseller partner could bring in
    Reseller {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        client_base: u64,
        /// Share of the reseller's base captured, 0..=1
        #[arg(long)]
        capture: f64,
        /// Share of gross profit paid to the reseller, 0..=1
        #[arg(long, default_value_t = 0.0)]
        profit_share: f64,
    },
    /// Print the built-in baseline assumption set as JSON
    ExampleConfig,
}

/// Flat CSV row of one period
#[derive(Serialize)]
struct PeriodCsvRow<'a> {
    period: u32,
    label: &'a str,
    growth_rate: f64,
    churn_rate: f64,
    clients_starting: u64,
    clients_new: u64,
    clients_churned: u64,
    clients_ending: u64,
    revenue_subscription: f64,
    revenue_setup: f64,
    revenue_overage: f64,
    revenue_total: f64,
    cos_subscription: f64,
    cos_setup: f64,
    cos_overage: f64,
    cos_total: f64,
    gross_profit: f64,
    headcount: u64,
    onboarding_hours: f64,
    maintenance_hours: f64,
    staff_cost: f64,
    hiring_cost: f64,
    hardware_cost: f64,
    overhead_cost: f64,
    marketing_cost: f64,
    research_cost: f64,
    operating_expenses: f64,
    ebitda: f64,
    tax: f64,
    net_income: f64,
    beginning_cash: f64,
    equity_inflow: f64,
    loan_inflow: f64,
    loan_interest: f64,
    loan_repayment: f64,
    loan_balance: f64,
    ending_cash: f64,
}

impl<'a> From<&'a PeriodResult> for PeriodCsvRow<'a> {
    fn from(row: &'a PeriodResult) -> Self {
        Self {
            period: row.period_index,
            label: &row.label,
            growth_rate: row.growth_rate,
            churn_rate: row.churn_rate,
            clients_starting: row.clients.starting,
            clients_new: row.clients.new,
            clients_churned: row.clients.churned,
            clients_ending: row.clients.ending,
            revenue_subscription: row.revenue.subscription,
            revenue_setup: row.revenue.setup,
            revenue_overage: row.revenue.overage,
            revenue_total: row.total_revenue(),
            cos_subscription: row.cos.subscription,
            cos_setup: row.cos.setup,
            cos_overage: row.cos.overage,
            cos_total: row.total_cos(),
            gross_profit: row.gross_profit,
            headcount: row.total_headcount(),
            onboarding_hours: row.onboarding_hours,
            maintenance_hours: row.maintenance_hours,
            staff_cost: row.staff_cost,
            hiring_cost: row.hiring_cost,
            hardware_cost: row.hardware_cost,
            overhead_cost: row.overhead_cost,
            marketing_cost: row.marketing_cost,
            research_cost: row.research_cost,
            operating_expenses: row.operating_expenses,
            ebitda: row.ebitda,
            tax: row.tax,
            net_income: row.net_income,
            beginning_cash: row.beginning_cash,
            equity_inflow: row.equity_inflow,
            loan_inflow: row.loan_inflow,
            loan_interest: row.loan_interest,
            loan_repayment: row.loan_repayment,
            loan_balance: row.loan_balance,
            ending_cash: row.ending_cash,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    result: &'a ProjectionResult,
    summary: saas_projection::projection::ProjectionSummary,
    metrics: &'a SaasMetrics,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, plans, output, json, max_periods, show } => run(
            config.as_deref(),
            plans.as_deref(),
            output.as_deref(),
            json.as_deref(),
            ProjectionConfig { max_periods },
            show,
        ),
        Command::Compare { configs, max_periods } => compare(&configs, ProjectionConfig { max_periods }),
        Command::Reseller { config, client_base, capture, profit_share } => {
            let assumptions = load_or_default(config.as_deref())?;
            let deal = ResellerDeal { client_base, capture_fraction: capture, profit_share };
            print_reseller(&assumptions, &deal)
        }
        Command::ExampleConfig => {
            let json = serde_json::to_string_pretty(&AssumptionSet::default_pricing())?;
            println!("{}", json);
            Ok(())
        }
    }
}

fn load_or_default(config: Option<&Path>) -> Result<AssumptionSet> {
    match config {
        Some(path) => load_assumptions(path)
            .with_context(|| format!("failed to load assumptions from {}", path.display())),
        None => Ok(AssumptionSet::default_pricing()),
    }
}

fn run(
    config: Option<&Path>,
    plans: Option<&Path>,
    output: Option<&Path>,
    json: Option<&Path>,
    projection_config: ProjectionConfig,
    show: usize,
) -> Result<()> {
    let mut assumptions = load_or_default(config)?;
    if let Some(path) = plans {
        assumptions.plans = load_plan_catalog(path)
            .with_context(|| format!("failed to load plan catalog from {}", path.display()))?;
    }
    let starting_cash = assumptions.starting_cash;

    let start = Instant::now();
    let result = ProjectionEngine::new(assumptions, projection_config)
        .project()
        .context("projection failed")?;
    let metrics = SaasMetrics::from_projection(&result, starting_cash);

    println!("Scenario: {} ({} periods in {:?})", result.scenario, result.periods.len(), start.elapsed());
    println!(
        "{:>8} {:>8} {:>6} {:>8} {:>14} {:>14} {:>14} {:>14} {:>14} {:>5}",
        "Period", "Clients", "New", "Churned", "Revenue", "Gross Profit", "OPEX", "Net Income", "Cash", "Staff"
    );
    println!("{}", "-".repeat(120));
    for row in result.periods.iter().take(show) {
        println!(
            "{:>8} {:>8} {:>6} {:>8} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>5}",
            row.label,
            row.clients.ending,
            row.clients.new,
            row.clients.churned,
            row.total_revenue(),
            row.gross_profit,
            row.operating_expenses,
            row.net_income,
            row.ending_cash,
            row.total_headcount(),
        );
    }
    if result.periods.len() > show {
        println!("... ({} more periods)", result.periods.len() - show);
    }

    print_summary(&result, &metrics);

    if let Some(path) = output {
        write_csv(&result, path).with_context(|| format!("failed to write {}", path.display()))?;
        println!("\nFull results written to: {}", path.display());
    }
    if let Some(path) = json {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        let report = JsonReport {
            result: &result,
            summary: result.summary(),
            metrics: &metrics,
        };
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
        println!("JSON report written to: {}", path.display());
    }
    Ok(())
}

fn write_csv(result: &ProjectionResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in &result.periods {
        writer.serialize(PeriodCsvRow::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(result: &ProjectionResult, metrics: &SaasMetrics) {
    let summary = result.summary();
    println!("\nSummary:");
    println!("  Total Revenue:      {:>16.2}", summary.total_revenue);
    println!("  Total Gross Profit: {:>16.2}", summary.total_gross_profit);
    println!("  Total Net Income:   {:>16.2}", summary.total_net_income);
    println!("  Total Funding:      {:>16.2}", summary.total_funding);
    println!("  Final Clients:      {:>16}", summary.final_clients);
    println!("  Final Headcount:    {:>16}", summary.final_headcount);
    println!("  Final Cash:         {:>16.2}", summary.final_cash);
    println!("  Lowest Cash:        {:>16.2}", summary.min_cash);
    println!("  Final Loan Balance: {:>16.2}", summary.final_loan_balance);

    let latest = &metrics.latest;
    println!("\nMetrics:");
    println!("  MRR:            {:>16.2}", latest.mrr);
    println!("  ARR:            {:>16.2}", latest.arr);
    println!("  ARPU (monthly): {}", fmt_amount(latest.arpu));
    println!("  CAC:            {}", fmt_amount(latest.cac));
    println!("  Blended CAC:    {}", fmt_amount(metrics.blended_cac));
    println!("  LTV:            {}", fmt_amount(latest.ltv));
    println!("  LTV / CAC:      {}", fmt_amount(latest.ltv_to_cac()));
    println!("  Payback months: {}", fmt_amount(latest.payback_months));
    println!("  Gross margin:   {}", fmt_pct(metrics.gross_margin));
    println!("  Net margin:     {}", fmt_pct(metrics.net_margin));
    println!("  Revenue CAGR:   {}", fmt_pct(metrics.revenue_cagr));
    println!("  IRR:            {}", fmt_pct(metrics.irr));
    println!("  ROI:            {}", fmt_pct(metrics.roi));
}

fn compare(paths: &[PathBuf], config: ProjectionConfig) -> Result<()> {
    let sets = paths
        .iter()
        .map(|path| load_or_default(Some(path.as_path())))
        .collect::<Result<Vec<_>>>()?;
    let results = ScenarioRunner::run_all(&sets, config);

    println!(
        "{:<20} {:>10} {:>14} {:>14} {:>16} {:>16} {:>10}",
        "Scenario", "Clients", "MRR", "ARR", "Final Cash", "Lowest Cash", "IRR"
    );
    println!("{}", "-".repeat(106));
    for ((set, path), outcome) in sets.iter().zip(paths).zip(results) {
        let result = outcome.with_context(|| format!("projection of {} failed", path.display()))?;
        let metrics = SaasMetrics::from_projection(&result, set.starting_cash);
        let summary = result.summary();
        println!(
            "{:<20} {:>10} {:>14.2} {:>14.2} {:>16.2} {:>16.2} {:>10}",
            result.scenario,
            summary.final_clients,
            metrics.latest.mrr,
            metrics.latest.arr,
            summary.final_cash,
            summary.min_cash,
            fmt_pct(metrics.irr),
        );
    }
    Ok(())
}

fn print_reseller(assumptions: &AssumptionSet, deal: &ResellerDeal) -> Result<()> {
    let snapshot = deal.snapshot(assumptions).context("invalid reseller terms")?;

    println!(
        "{:<16} {:>10} {:>14} {:>14} {:>14}",
        "Plan", "Clients", "Revenue", "COS", "Gross Profit"
    );
    println!("{}", "-".repeat(72));
    let print_line = |plan: &str, line: &ResellerLine| {
        println!(
            "{:<16} {:>10.1} {:>14.2} {:>14.2} {:>14.2}",
            plan,
            line.captured_clients,
            line.revenue.total(),
            line.cos.total(),
            line.gross_profit,
        );
    };
    for (plan, line) in &snapshot.lines {
        print_line(plan, line);
    }
    print_line("TOTAL", &snapshot.total);
    println!("\nReseller share ({:.1}%): {:.2}", deal.profit_share * 100.0, snapshot.reseller_share);
    println!("Net after reseller share: {:.2}", snapshot.net_gross_profit);
    Ok(())
}

fn fmt_amount(value: Option<f64>) -> String {
    value.map(|v| format!("{:>16.2}", v)).unwrap_or_else(|| format!("{:>16}", "n/a"))
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}%", v * 100.0)).unwrap_or_else(|| "n/a".to_string())
}
