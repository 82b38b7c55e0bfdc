//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - fetches quotes from the selected provider
//! - builds the probability tree and tables
//! - prints reports
//! - writes optional exports

use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, RunArgs, ShowArgs};
use crate::domain::{RunConfig, SampleConfig, StepSize, TreeConfig};
use crate::error::AppError;
use crate::report::{RunReport, format_distribution, format_run_summary, format_wirp};

pub mod pipeline;

/// Entry point for the `ratepath` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args, OutputMode::Full),
        Command::Cumulative(args) => handle_run(args, OutputMode::CumulativeOnly),
        Command::Show(args) => handle_show(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    CumulativeOnly,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed (e.g. when embedded); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_run(args: RunArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_tree(&config)?;

    println!("{}", render_report(&run.report, mode));

    if let Some(dir) = &config.export_dir {
        crate::io::export::write_tables_csv(dir, &run.report)?;
    }
    if let Some(path) = &config.export_report {
        crate::io::report_file::write_report_json(path, &run.report)?;
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let report = crate::io::report_file::read_report_json(&args.report)?;
    let mode = if args.cumulative_only {
        OutputMode::CumulativeOnly
    } else {
        OutputMode::Full
    };
    println!("{}", render_report(&report, mode));
    Ok(())
}

fn render_report(report: &RunReport, mode: OutputMode) -> String {
    let mut out = String::new();
    if mode == OutputMode::Full {
        out.push_str(&format_run_summary(report));
        out.push_str("Implied rates (raw deltas):\n");
        out.push_str(&format_wirp(&report.wirp));
        out.push('\n');
        out.push_str(&format_distribution(
            "Rate bucket probabilities (%):",
            &report.distributions.buckets,
        ));
        out.push('\n');
    }
    out.push_str(&format_distribution(
        "Probability at or above bucket (%):",
        &report.distributions.cumulative,
    ));
    out
}

pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let step = StepSize::new(args.step)?;
    if !(args.mass_tolerance.is_finite() && args.mass_tolerance > 0.0) {
        return Err(AppError::new(2, "Mass tolerance must be finite and > 0."));
    }

    Ok(RunConfig {
        source: args.source,
        quotes_path: args.quotes.clone(),
        target_rate: args.target_rate,
        sample: SampleConfig {
            start_date: args.start_date.unwrap_or_else(|| Local::now().date_naive()),
            meetings: args.meetings,
            target_rate: args.target_rate.unwrap_or(args.sample_rate),
            drift_sd: args.drift_sd,
            seed: args.seed,
        },
        tree: TreeConfig {
            step,
            zero_change: args.zero_change,
            mass_tolerance: args.mass_tolerance,
        },
        export_dir: args.export_dir.clone(),
        export_report: args.export_report.clone(),
    })
}

/// Rewrite argv so flags without a subcommand mean `run`.
///
/// Rules:
/// - `ratepath --quotes q.csv`     -> `ratepath run --quotes q.csv`
/// - `ratepath --help/--version`   -> unchanged
/// - `ratepath <subcommand> ...`   -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "cumulative" | "show");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}
