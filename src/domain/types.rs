//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed between the delta extractor, the tree builder and the formatter
//! - exported to JSON/CSV
//! - reloaded later for re-rendering

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// One forward-implied overnight rate for a decision date.
///
/// Index 0 of a quote sequence is "now"; later entries are the implied rates
/// after each upcoming policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub date: NaiveDate,
    pub implied_rate: f64,
}

impl RateQuote {
    pub fn new(date: NaiveDate, implied_rate: f64) -> Self {
        Self { date, implied_rate }
    }
}

/// What a market data provider hands to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Current policy target rate (the root of the tree).
    pub target_rate: f64,
    pub quotes: Vec<RateQuote>,
}

/// Assumed minimum policy-rate move (e.g. `0.25`).
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct StepSize(f64);

impl StepSize {
    pub fn new(value: f64) -> Result<Self, TreeError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(TreeError::InvalidStep { step: value })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for StepSize {
    type Error = TreeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StepSize> for f64 {
    fn from(value: StepSize) -> Self {
        value.0
    }
}

/// How an exact zero percent step change is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ZeroChange {
    /// No branch: every level carries forward with its whole mass.
    #[default]
    Hold,
    /// Treat zero as cut-leaning (sign tie-break of `> 0 ? +1 : -1`).
    ///
    /// With a zero magnitude the higher candidate is 0 steps and the lower one
    /// is one step *up*; all weight lands on that `+step` branch and a
    /// zero-mass node is kept at the unchanged level.
    Cut,
}

/// Which way the market leans at a decision date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Hike,
    Cut,
    /// Exact zero change under `ZeroChange::Hold`.
    Flat,
}

impl Direction {
    /// Signed step count for the given number of steps in this direction.
    pub fn signed_steps(self, steps: i64) -> i64 {
        match self {
            Direction::Hike => steps,
            Direction::Cut => -steps,
            Direction::Flat => 0,
        }
    }
}

/// Branching parameters for one decision date (every date after the base).
///
/// `lower_steps` / `higher_steps` are the candidate moves in whole steps,
/// already signed by `direction`: `higher = ±ceil(magnitude)` and
/// `lower = higher ∓ 1`. For `Hike`/`Cut` they always differ by exactly one
/// step; for `Flat` both are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaRecord {
    pub date: NaiveDate,
    pub implied_rate: f64,
    /// Change in implied rate since the previous date (diagnostic only).
    pub rate_change: f64,
    /// Cumulative step count since the base date.
    pub step_count: f64,
    /// `100 × (step_count[i] − step_count[i−1])`.
    pub percent_step_change: f64,
    pub direction: Direction,
    /// `|percent_step_change| / 100`, i.e. fractional steps priced for this date.
    pub magnitude: f64,
    /// Probability of the higher-magnitude candidate, in `[0, 1]`.
    pub weight: f64,
    pub lower_steps: i64,
    pub higher_steps: i64,
    /// `lower_steps × step`.
    pub lower_delta: f64,
    /// `higher_steps × step`.
    pub higher_delta: f64,
}

/// A node position on the rate lattice: whole steps away from the base rate.
///
/// Keying by an integer offset keeps recombination exact; the absolute rate is
/// derived through `Lattice::rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RateLevel {
    pub steps: i64,
}

impl RateLevel {
    pub const BASE: RateLevel = RateLevel { steps: 0 };

    pub fn new(steps: i64) -> Self {
        Self { steps }
    }

    /// `None` when the offset would leave the `i64` range.
    pub fn shifted(self, steps: i64) -> Option<Self> {
        self.steps.checked_add(steps).map(Self::new)
    }
}

/// Base rate + step size; maps lattice positions to absolute rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    pub base_rate: f64,
    pub step: StepSize,
}

impl Lattice {
    pub fn new(base_rate: f64, step: StepSize) -> Self {
        Self { base_rate, step }
    }

    pub fn rate(&self, level: RateLevel) -> f64 {
        self.base_rate + level.steps as f64 * self.step.value()
    }
}

/// An absolute rate level with its probability mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityNode {
    pub level: RateLevel,
    pub rate: f64,
    pub mass: f64,
}

/// Probability mass per lattice level at one decision date.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub masses: BTreeMap<RateLevel, f64>,
}

impl Snapshot {
    /// The tree root: all mass on the base rate.
    pub fn root(date: NaiveDate) -> Self {
        let mut masses = BTreeMap::new();
        masses.insert(RateLevel::BASE, 1.0);
        Self { date, masses }
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.values().sum()
    }

    pub fn mass_at(&self, level: RateLevel) -> f64 {
        self.masses.get(&level).copied().unwrap_or(0.0)
    }

    /// Nodes in ascending rate order.
    pub fn nodes(&self, lattice: &Lattice) -> Vec<ProbabilityNode> {
        self.masses
            .iter()
            .map(|(&level, &mass)| ProbabilityNode {
                level,
                rate: lattice.rate(level),
                mass,
            })
            .collect()
    }
}

/// Mass at a decision date drifted from 1.0 beyond tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassConservationWarning {
    pub date: NaiveDate,
    pub total: f64,
}

/// Knobs for delta extraction and tree building.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub step: StepSize,
    pub zero_change: ZeroChange,
    /// Allowed `|Σ mass − 1|` before a `MassConservationWarning` is raised.
    pub mass_tolerance: f64,
}

impl TreeConfig {
    pub const DEFAULT_STEP: f64 = 0.25;
    pub const DEFAULT_MASS_TOLERANCE: f64 = 1e-6;

    pub fn new(step: StepSize) -> Self {
        Self {
            step,
            zero_change: ZeroChange::Hold,
            mass_tolerance: Self::DEFAULT_MASS_TOLERANCE,
        }
    }
}

/// Where quotes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// CSV file with `date` and `implied_rate` columns.
    Csv,
    /// Seeded synthetic path (no network, no files).
    Sample,
    /// JSON endpoint configured via `RATEPATH_QUOTES_URL`.
    Http,
}

/// Synthetic path parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub start_date: NaiveDate,
    pub meetings: usize,
    pub target_rate: f64,
    /// Standard deviation of the per-meeting implied-rate drift.
    pub drift_sd: f64,
    pub seed: u64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: SourceKind,
    pub quotes_path: Option<PathBuf>,
    /// Overrides the provider's target rate when set.
    pub target_rate: Option<f64>,
    pub sample: SampleConfig,
    pub tree: TreeConfig,
    pub export_dir: Option<PathBuf>,
    pub export_report: Option<PathBuf>,
}
