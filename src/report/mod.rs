//! Reporting: raw delta view, probability tables, terminal formatting, and the
//! serializable run report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DeltaRecord, Lattice, MassConservationWarning, ProbabilityNode, RateQuote, Snapshot, StepSize, ZeroChange,
};

pub mod distribution;
pub mod format;
pub mod wirp;

pub use distribution::{
    BUCKET_PRECISION, BucketColumn, CUMULATIVE_PRECISION, DistributionRow, DistributionTable, Distributions,
    format_distributions, round_to,
};
pub use format::{format_distribution, format_run_summary, format_wirp};
pub use wirp::{WirpRow, raw_delta_table};

pub const TOOL_NAME: &str = "ratepath";

/// Everything one run produced, in a form that can be saved and re-rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub target_rate: f64,
    pub step: StepSize,
    pub zero_change: ZeroChange,
    pub quotes: Vec<RateQuote>,
    pub deltas: Vec<DeltaRecord>,
    pub wirp: Vec<WirpRow>,
    pub distributions: Distributions,
    /// Tree nodes per decision date, ascending by rate.
    #[serde(default)]
    pub nodes: Vec<SnapshotNodes>,
    #[serde(default)]
    pub warnings: Vec<MassConservationWarning>,
}

/// One decision date's tree nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNodes {
    pub date: NaiveDate,
    pub nodes: Vec<ProbabilityNode>,
}

pub fn snapshot_nodes(snapshots: &[Snapshot], lattice: &Lattice) -> Vec<SnapshotNodes> {
    snapshots
        .iter()
        .map(|s| SnapshotNodes {
            date: s.date,
            nodes: s.nodes(lattice),
        })
        .collect()
}
