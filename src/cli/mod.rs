//! Command-line parsing for the realty dashboard.
//!
//! Argument parsing and dispatch live apart from the data pipeline.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::filter::LevelFilter;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "realty", version, about = "Real-estate transaction dashboard (實價登錄查詢)")]
pub struct Cli {
    /// Log verbosity (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (default).
    Tui(TuiArgs),
    /// Print metrics, the monthly trend and the filtered rows to stdout.
    Report(RangeArgs),
}

/// Optional initial date range (YYYY-MM-DD). Missing ends default to the data's min/max.
#[derive(Debug, Args, Clone, Default)]
pub struct RangeArgs {
    /// First transaction date to include.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub from: Option<NaiveDate>,

    /// Last transaction date to include.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Write logs to this file (the dashboard owns the terminal, so logs are off otherwise).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_range() {
        let cli = Cli::parse_from(["realty", "report", "--from", "2012-01-01", "--to", "2012-12-31"]);
        match cli.command {
            Command::Report(args) => {
                assert_eq!(args.from, NaiveDate::from_ymd_opt(2012, 1, 1));
                assert_eq!(args.to, NaiveDate::from_ymd_opt(2012, 12, 31));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.log_level, LogLevel::Info);
    }

    #[test]
    fn rejects_bad_date() {
        assert!(Cli::try_parse_from(["realty", "report", "--from", "101/1/1"]).is_err());
    }

    #[test]
    fn tui_log_file_and_global_level() {
        let cli = Cli::parse_from(["realty", "tui", "--log-file", "x.log", "--log-level", "debug"]);
        assert_eq!(cli.log_level, LogLevel::Debug);
        match cli.command {
            Command::Tui(args) => assert_eq!(args.log_file, Some(PathBuf::from("x.log"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
