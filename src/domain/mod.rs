//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - cleaned transaction rows and the table holding them (`TransactionRecord`, `Dataset`)
//! - derived outputs (`SummarySnapshot`, `MonthlyTrendPoint`, `ReferenceMarkers`)

pub mod types;

pub use types::*;
