//! Shared pipeline used by every command that builds a tree.
//!
//! provider fetch -> delta extraction -> tree fold -> tables -> report
//!
//! Commands then only decide what to print or export.

use chrono::Utc;
use tracing::info;

use crate::data::{CsvQuoteFile, HttpQuoteClient, MarketDataProvider, SampleMarket};
use crate::domain::{DeltaRecord, Lattice, MarketSnapshot, RunConfig, SourceKind, TreeConfig};
use crate::error::AppError;
use crate::report::{RunReport, TOOL_NAME, format_distributions, raw_delta_table, snapshot_nodes};
use crate::tree::{TreeOutput, build_tree, extract_deltas};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub market: MarketSnapshot,
    pub deltas: Vec<DeltaRecord>,
    pub tree: TreeOutput,
    pub report: RunReport,
}

/// Fetch quotes from the configured provider, applying a target-rate override.
pub fn fetch_market(config: &RunConfig) -> Result<MarketSnapshot, AppError> {
    let provider: Box<dyn MarketDataProvider> = match config.source {
        SourceKind::Csv => {
            let path = config
                .quotes_path
                .clone()
                .ok_or_else(|| AppError::new(2, "`--source csv` requires `--quotes <CSV>`."))?;
            Box::new(CsvQuoteFile::new(path))
        }
        SourceKind::Sample => Box::new(SampleMarket {
            config: config.sample.clone(),
        }),
        SourceKind::Http => Box::new(HttpQuoteClient::from_env()?),
    };

    let mut market = provider.fetch()?;
    if let Some(rate) = config.target_rate {
        market.target_rate = rate;
    }
    Ok(market)
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_tree(config: &RunConfig) -> Result<RunOutput, AppError> {
    let market = fetch_market(config)?;
    run_tree_with_market(&config.tree, market)
}

/// Execute the pipeline on quotes already in hand.
pub fn run_tree_with_market(tree_config: &TreeConfig, market: MarketSnapshot) -> Result<RunOutput, AppError> {
    if !market.target_rate.is_finite() {
        return Err(AppError::new(2, "Target rate must be finite."));
    }

    let deltas = extract_deltas(&market.quotes, tree_config)?;

    // The tree is rooted at the policy target; step counts are measured from
    // the first implied rate.
    let lattice = Lattice::new(market.target_rate, tree_config.step);
    let tree = build_tree(lattice, market.quotes[0].date, &deltas, tree_config.mass_tolerance)?;
    let distributions = format_distributions(&tree.snapshots, &tree.lattice);
    let wirp = raw_delta_table(&market.quotes, &deltas);

    info!(
        dates = tree.snapshots.len(),
        buckets = distributions.buckets.columns.len(),
        warnings = tree.warnings.len(),
        "tree built"
    );

    let report = RunReport {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        target_rate: market.target_rate,
        step: tree_config.step,
        zero_change: tree_config.zero_change,
        quotes: market.quotes.clone(),
        deltas: deltas.clone(),
        wirp,
        distributions,
        nodes: snapshot_nodes(&tree.snapshots, &tree.lattice),
        warnings: tree.warnings.clone(),
    };

    Ok(RunOutput {
        market,
        deltas,
        tree,
        report,
    })
}
