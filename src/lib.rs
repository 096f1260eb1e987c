//! `realty-dash` library crate.
//!
//! The binary (`realty`) is a thin wrapper around this library so that:
//!
//! - the cleaning/aggregation pipeline is testable without a terminal
//! - the TUI and the plain-text report share one code path

pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod report;
pub mod tui;
