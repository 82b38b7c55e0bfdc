//! `ratepath` library crate.
//!
//! Builds a recombining probability tree of policy-rate outcomes from
//! forward-implied overnight rates, one snapshot per decision date.
//!
//! The binary (`ratepath`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the tree and table code can be reused without the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod tree;
