//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - market inputs (`RateQuote`, `MarketSnapshot`)
//! - tree primitives (`StepSize`, `DeltaRecord`, `RateLevel`, `Snapshot`)
//! - run configuration (`TreeConfig`, `RunConfig`) and the saved `RunReport`

pub mod types;

pub use types::*;
