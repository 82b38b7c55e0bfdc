//! Bucketed and cumulative probability tables.
//!
//! Every level that appears in any snapshot becomes one column. A column is
//! the bucket `(rate - step, rate]`, labelled by its basis-point edges, e.g.
//! `"500-525"` for a 5.25% level with a 25bp step. The label is derived from
//! the numeric level once, here; nothing downstream parses it back.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Lattice, RateLevel, Snapshot};

/// Decimal places kept in the bucketed (percent) table.
pub const BUCKET_PRECISION: u32 = 3;
/// Decimal places kept in the cumulative (percent) table.
pub const CUMULATIVE_PRECISION: u32 = 2;

/// One rate bucket column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketColumn {
    pub level: RateLevel,
    /// Absolute rate at the top of the bucket.
    pub rate: f64,
    pub low_bp: i64,
    pub high_bp: i64,
    pub label: String,
}

impl BucketColumn {
    pub fn new(level: RateLevel, lattice: &Lattice) -> Self {
        let rate = lattice.rate(level);
        let low_bp = (100.0 * (rate - lattice.step.value())).round() as i64;
        let high_bp = (100.0 * rate).round() as i64;
        Self {
            level,
            rate,
            low_bp,
            high_bp,
            label: format!("{low_bp}-{high_bp}"),
        }
    }
}

/// One decision date's row, values aligned with the table's columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// Percent values by decision date (rows) and rate bucket (columns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionTable {
    pub columns: Vec<BucketColumn>,
    pub rows: Vec<DistributionRow>,
    /// Decimal places the values were rounded to.
    pub precision: u32,
}

impl DistributionTable {
    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }
}

/// The bucketed table plus its "at-or-above" cumulative variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distributions {
    pub buckets: DistributionTable,
    pub cumulative: DistributionTable,
}

/// Round half away from zero to `dp` decimal places.
pub fn round_to(value: f64, dp: u32) -> f64 {
    let scale = 10f64.powi(dp as i32);
    (value * scale).round() / scale
}

/// Sorted union of every level present in any snapshot, as bucket columns.
pub fn bucket_columns(snapshots: &[Snapshot], lattice: &Lattice) -> Vec<BucketColumn> {
    let levels: BTreeSet<RateLevel> = snapshots
        .iter()
        .flat_map(|s| s.masses.keys().copied())
        .collect();
    levels
        .into_iter()
        .map(|level| BucketColumn::new(level, lattice))
        .collect()
}

/// Build both percent tables from the tree's snapshots.
///
/// Levels absent from a snapshot are zero probability. The cumulative value
/// at column `k` is the sum of the rounded bucket values at `k` and every
/// bucket above it, rounded again to `CUMULATIVE_PRECISION`.
pub fn format_distributions(snapshots: &[Snapshot], lattice: &Lattice) -> Distributions {
    let columns = bucket_columns(snapshots, lattice);

    let mut bucket_rows = Vec::with_capacity(snapshots.len());
    let mut cumulative_rows = Vec::with_capacity(snapshots.len());

    for snapshot in snapshots {
        let buckets: Vec<f64> = columns
            .iter()
            .map(|c| round_to(100.0 * snapshot.mass_at(c.level), BUCKET_PRECISION))
            .collect();

        let mut cumulative = vec![0.0; buckets.len()];
        let mut running = 0.0;
        for (k, p) in buckets.iter().enumerate().rev() {
            running += p;
            cumulative[k] = round_to(running, CUMULATIVE_PRECISION);
        }

        bucket_rows.push(DistributionRow {
            date: snapshot.date,
            values: buckets,
        });
        cumulative_rows.push(DistributionRow {
            date: snapshot.date,
            values: cumulative,
        });
    }

    Distributions {
        buckets: DistributionTable {
            columns: columns.clone(),
            rows: bucket_rows,
            precision: BUCKET_PRECISION,
        },
        cumulative: DistributionTable {
            columns,
            rows: cumulative_rows,
            precision: CUMULATIVE_PRECISION,
        },
    }
}
