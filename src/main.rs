use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use core_types::{DailyRecord, Metric, MonthlyMetric};
use pipeline::{PipelineOutput, ReportingPipeline};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use validator::ValidationReport;

/// The main entry point for the Meridian reporting application.
fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Report(args) => handle_report(args)?,
        Commands::Validate(args) => handle_validate(args)?,
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A monthly business review engine: aggregates daily channel records into
/// monthly results, derives exclusion variants, and validates the output.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the full monthly report from a daily records file.
    Report(ReportArgs),
    /// Run the data checks only and print the findings.
    Validate(ValidateArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// Path to the daily records file (a JSON array of records).
    #[arg(long, short)]
    input: PathBuf,

    /// Path to a TOML configuration file. Defaults to `meridian.toml` in the
    /// working directory if present, otherwise built-in defaults.
    #[arg(long, short)]
    config: Option<String>,
}

#[derive(Parser)]
struct ValidateArgs {
    /// Path to the daily records file (a JSON array of records).
    #[arg(long, short)]
    input: PathBuf,

    /// Path to a TOML configuration file.
    #[arg(long, short)]
    config: Option<String>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn run_pipeline(input: &Path, config: Option<&str>) -> anyhow::Result<PipelineOutput> {
    let settings = configuration::load_config(config).context("Failed to load configuration")?;

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;
    let records: Vec<DailyRecord> =
        serde_json::from_str(&raw).context("Failed to parse daily records")?;

    let pipeline = ReportingPipeline::new(settings);
    let output = pipeline.run(&records)?;
    Ok(output)
}

fn handle_report(args: ReportArgs) -> anyhow::Result<()> {
    let output = run_pipeline(&args.input, args.config.as_deref())?;

    println!("--- Monthly Results ---");
    println!("{}", monthly_table(&output.monthly));

    if !output.ytd.is_empty() {
        println!("--- Fiscal Year-to-Date ---");
        println!("{}", ytd_table(&output.ytd));
    }

    print_report_summary(&output.report);
    Ok(())
}

fn handle_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let output = run_pipeline(&args.input, args.config.as_deref())?;

    print_report_summary(&output.report);
    if !output.report.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

// ==============================================================================
// Rendering
// ==============================================================================

fn monthly_table(monthly: &[MonthlyMetric]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Period", "Channel", "Net", "Share %", "GMV", "AOV", "CR %", "UPT", "MoM Net %",
            "YoY Net %",
        ]);

    for m in monthly {
        table.add_row(vec![
            Cell::new(m.period()),
            Cell::new(m.channel),
            money_cell(m.net),
            opt_cell(m.net_share, 1),
            money_cell(m.gmv),
            opt_cell(m.aov, 2),
            opt_cell(m.cr, 2),
            opt_cell(m.upt, 2),
            opt_cell(m.mom_growth(Metric::Net), 1),
            opt_cell(m.yoy_growth(Metric::Net), 1),
        ]);
    }
    table
}

fn ytd_table(ytd: &[MonthlyMetric]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Fiscal Year", "Through", "Channel", "Net", "Share %", "GMV", "AOV", "CR %",
        ]);

    for m in ytd {
        let fy = m
            .fiscal_year
            .map(fiscal::fiscal_year_label)
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(fy),
            Cell::new(m.period()),
            Cell::new(m.channel),
            money_cell(m.net),
            opt_cell(m.net_share, 1),
            money_cell(m.gmv),
            opt_cell(m.aov, 2),
            opt_cell(m.cr, 2),
        ]);
    }
    table
}

fn money_cell(value: Decimal) -> Cell {
    Cell::new(value.round_dp(0)).set_alignment(CellAlignment::Right)
}

/// Renders an optional metric, showing "-" for undefined values rather
/// than a misleading zero.
fn opt_cell(value: Option<Decimal>, dp: u32) -> Cell {
    let text = match value {
        Some(v) => v.round_dp(dp).to_string(),
        None => "-".to_string(),
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn print_report_summary(report: &ValidationReport) {
    println!("--- Validation ---");
    println!(
        "Checks: {} run, {} passed | Errors: {} | Warnings: {} | Quality score: {}",
        report.checks_run,
        report.checks_passed,
        report.error_count(),
        report.warning_count(),
        report.quality_score().round_dp(3),
    );
    for finding in &report.findings {
        println!("  {finding}");
    }
}
