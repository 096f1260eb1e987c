//! Pure functions over a loaded `Dataset`.
//!
//! Everything here is recomputed on each date-range change; nothing is cached.

pub mod filter;
pub mod summary;
pub mod trend;

pub use filter::filter_range;
pub use summary::{mean, mode, summarize};
pub use trend::{aggregate_monthly, reference_markers};
