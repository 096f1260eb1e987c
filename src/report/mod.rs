//! Plain-text rendering of a dashboard view.

pub mod format;

pub use format::*;
