//! Export report tables to CSV.
//!
//! One file per table so each opens cleanly in a spreadsheet:
//! `wirp.csv`, `buckets.csv`, `cumulative.csv`, plus the raw tree nodes in
//! `nodes.csv`.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;
use crate::report::{DistributionTable, RunReport, SnapshotNodes, WirpRow};

/// Write all tables into `dir` (created if missing).
pub fn write_tables_csv(dir: &Path, report: &RunReport) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let wirp = dir.join("wirp.csv");
    write_wirp_csv(&wirp, &report.wirp)?;

    let buckets = dir.join("buckets.csv");
    write_distribution_csv(&buckets, &report.distributions.buckets)?;

    let cumulative = dir.join("cumulative.csv");
    write_distribution_csv(&cumulative, &report.distributions.cumulative)?;

    let nodes = dir.join("nodes.csv");
    write_nodes_csv(&nodes, &report.nodes)?;

    info!(dir = %dir.display(), "tables exported");
    Ok(vec![wirp, buckets, cumulative, nodes])
}

/// Write tree nodes in long form: `date,level,rate,mass`.
pub fn write_nodes_csv(path: &Path, snapshots: &[SnapshotNodes]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["date", "level", "rate", "mass"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for s in snapshots {
        for n in &s.nodes {
            writer
                .write_record([
                    s.date.to_string(),
                    n.level.steps.to_string(),
                    format!("{:.6}", n.rate),
                    format!("{:.9}", n.mass),
                ])
                .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

/// Write the raw delta view.
pub fn write_wirp_csv(path: &Path, rows: &[WirpRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["date", "implied_rate", "rate_change", "step_count", "percent_step_change"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in rows {
        writer
            .write_record([
                r.date.to_string(),
                format!("{:.6}", r.implied_rate),
                r.rate_change.map(|v| format!("{v:.6}")).unwrap_or_default(),
                format!("{:.6}", r.step_count),
                r.percent_step_change.map(|v| format!("{v:.4}")).unwrap_or_default(),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

/// Write a bucketed or cumulative table: `date,<bucket labels...>`.
pub fn write_distribution_csv(path: &Path, table: &DistributionTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let mut header = vec!["date".to_string()];
    header.extend(table.columns.iter().map(|c| c.label.clone()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let precision = table.precision as usize;
    for row in &table.rows {
        let mut record = vec![row.date.to_string()];
        record.extend(row.values.iter().map(|v| format!("{v:.precision$}")));
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}
