//! Probability tree construction.
//!
//! - `delta`: implied rates -> per-date branching parameters (`DeltaRecord`)
//! - `builder`: folds delta records into per-date probability snapshots

pub mod builder;
pub mod delta;

pub use builder::{TreeOutput, build_tree, check_mass, step_snapshot};
pub use delta::{extract_deltas, validate_quotes};
