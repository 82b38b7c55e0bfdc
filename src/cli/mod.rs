//! Command-line parsing for the implied policy-rate distribution tool.
//!
//! Argument parsing and command dispatch stay separate from the tree code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{SourceKind, TreeConfig, ZeroChange};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ratepath", version, about = "Implied policy-rate probability tree from forward OIS quotes")]
pub struct Cli {
    /// Log progress at info level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the tree and print the raw delta, bucket and cumulative tables.
    Run(RunArgs),
    /// Print only the cumulative (at-or-above) table.
    Cumulative(RunArgs),
    /// Re-render a previously saved report JSON.
    Show(ShowArgs),
}

/// Options shared by `run` and `cumulative`.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Where quotes come from.
    #[arg(long, value_enum, default_value_t = SourceKind::Csv)]
    pub source: SourceKind,

    /// Quote CSV (`date,implied_rate`), required for `--source csv`.
    #[arg(short, long, value_name = "CSV")]
    pub quotes: Option<PathBuf>,

    /// Current policy target rate (defaults to the provider's value).
    #[arg(short = 't', long)]
    pub target_rate: Option<f64>,

    /// Assumed minimum rate move.
    #[arg(short, long, default_value_t = TreeConfig::DEFAULT_STEP)]
    pub step: f64,

    /// Treatment of an exactly unchanged meeting.
    #[arg(long, value_enum, default_value_t = ZeroChange::Hold)]
    pub zero_change: ZeroChange,

    /// Allowed deviation of per-date mass from 1 before warning.
    #[arg(long, default_value_t = TreeConfig::DEFAULT_MASS_TOLERANCE)]
    pub mass_tolerance: f64,

    /// First date of the synthetic path (defaults to today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start_date: Option<NaiveDate>,

    /// Number of synthetic decision dates.
    #[arg(long, default_value_t = 8)]
    pub meetings: usize,

    /// Synthetic starting rate when no `--target-rate` is given.
    #[arg(long, default_value_t = 4.33)]
    pub sample_rate: f64,

    /// Per-meeting standard deviation of the synthetic implied rate.
    #[arg(long, default_value_t = 0.08)]
    pub drift_sd: f64,

    /// Random seed for the synthetic path.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write wirp.csv, buckets.csv and cumulative.csv into this directory.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Save the full run report as JSON.
    #[arg(long = "export-report", value_name = "JSON")]
    pub export_report: Option<PathBuf>,
}

/// Options for re-rendering a saved report.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Report JSON written by `ratepath run --export-report`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Print only the cumulative table.
    #[arg(long)]
    pub cumulative_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults() {
        let cli = Cli::parse_from(["ratepath", "run", "--quotes", "q.csv"]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.source, SourceKind::Csv);
        assert_eq!(args.step, 0.25);
        assert_eq!(args.zero_change, ZeroChange::Hold);
        assert_eq!(args.quotes, Some(PathBuf::from("q.csv")));
        assert!(!cli.verbose);
    }

    #[test]
    fn sample_flags_parse() {
        let cli = Cli::parse_from([
            "ratepath",
            "-v",
            "cumulative",
            "--source",
            "sample",
            "--start-date",
            "2025-01-02",
            "--zero-change",
            "cut",
        ]);
        assert!(cli.verbose);
        let Command::Cumulative(args) = cli.command else {
            panic!("expected cumulative");
        };
        assert_eq!(args.source, SourceKind::Sample);
        assert_eq!(args.zero_change, ZeroChange::Cut);
        assert_eq!(args.start_date, NaiveDate::from_ymd_opt(2025, 1, 2));
    }
}
