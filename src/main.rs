//! CLI entry point for the measurement-table cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use cyto_prep::{Pipeline, PrepConfig, PrepResult};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Cleaning and normalization pipeline for per-object imaging measurement tables",
    long_about = "Cleans per-object measurement CSVs (sample typing, skew correction,\n\
                  outlier resolution), merges them, and z-score normalizes the result.\n\n\
                  EXAMPLES:\n  \
                  # Clean and merge two plates\n  \
                  cyto-prep -o results m0_plate1.csv sis_plate1.csv\n\n  \
                  # Keep results in memory only, print a JSON summary\n  \
                  cyto-prep --no-save --json plate.csv"
)]
struct Args {
    /// CSV files to process; file names drive sample-type derivation
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for the merged and normalized datasets
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Significance level for the Grubbs extreme-value test
    #[arg(long, default_value = "0.05")]
    alpha: f64,

    /// Replacement for missing and exact-zero feature values
    #[arg(long, default_value = "1e-5")]
    epsilon: f64,

    /// Do not write any output files
    #[arg(long)]
    no_save: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Print a machine-readable JSON summary instead of the text one
    ///
    /// Disables all progress logs so stdout only contains JSON.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled so stdout
/// only carries the JSON summary.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[derive(Serialize)]
struct RunSummary<'a> {
    rows: usize,
    columns: usize,
    constant_columns: &'a [String],
    reports: &'a [cyto_prep::TableReport],
    processing_steps: &'a [String],
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    for input in &args.inputs {
        if !input.exists() {
            return Err(anyhow!("Input file not found: {}", input.display()));
        }
    }

    let config = PrepConfig::builder()
        .output_dir(&args.output)
        .grubbs_alpha(args.alpha)
        .epsilon(args.epsilon)
        .save_to_disk(!args.no_save)
        .build()?;

    info!("Processing {} input file(s)", args.inputs.len());
    let result = Pipeline::new(config)?.process_files(&args.inputs)?;

    if args.json {
        let summary = RunSummary {
            rows: result.normalized.height(),
            columns: result.normalized.width(),
            constant_columns: &result.constant_columns,
            reports: &result.reports,
            processing_steps: &result.processing_steps,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_summary(&result, &args);
    Ok(())
}

/// Human-readable run summary. Intentionally `println!`, not logging:
/// this is the primary output and must survive any log level.
fn print_summary(result: &PrepResult, args: &Args) {
    println!();
    println!("{}", "=".repeat(70));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(70));
    println!();

    for report in &result.reports {
        println!(
            "  {} ({}): {} -> {} rows, {} clipped, {} dropped",
            report.name,
            report.sample_type,
            report.rows_before,
            report.rows_after,
            report.values_clipped,
            report.rows_dropped
        );
    }
    println!();
    println!(
        "Merged dataset: {} rows x {} columns",
        result.merged.height(),
        result.merged.width()
    );

    if !result.constant_columns.is_empty() {
        println!(
            "Constant columns excluded from normalization: {}",
            result.constant_columns.join(", ")
        );
    }

    if !args.no_save {
        println!("Outputs written to: {}", args.output.display());
    }
    println!("{}", "=".repeat(70));
}
