//! Input/output helpers.
//!
//! - CSV quote ingest (`ingest`)
//! - CSV table exports (`export`)
//! - run report JSON read/write (`report_file`)

pub mod export;
pub mod ingest;
pub mod report_file;

pub use export::*;
pub use ingest::*;
pub use report_file::*;
