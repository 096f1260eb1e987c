//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - builds the dataset service
//! - hands off to the TUI or prints a report

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::{Command, RangeArgs};
use crate::config::StorageConfig;
use crate::data::{DatasetService, SupabaseStorage};
use crate::domain::TARGET_COMMUNITY;
use crate::error::AppError;

pub mod pipeline;

use pipeline::{DateRange, MSG_EMPTY_RANGE, MSG_LOAD_FAILED};

/// Entry point for the `realty` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let level = cli.log_level.to_filter();

    match cli.command {
        Command::Tui(args) => {
            if let Some(path) = &args.log_file {
                init_file_logger(level, path)?;
            }
            let service = build_service();
            crate::tui::run(service, &args.range)
        }
        Command::Report(args) => {
            init_stderr_logger(level);
            handle_report(build_service(), &args)
        }
    }
}

/// The production dataset service: Supabase storage, fixed target community.
pub fn build_service() -> DatasetService {
    let config = StorageConfig::from_env();
    debug!("{config:?}");
    DatasetService::new(
        Box::new(SupabaseStorage::new(&config)),
        config.bucket,
        config.object_path,
        TARGET_COMMUNITY,
    )
}

fn handle_report(service: DatasetService, args: &RangeArgs) -> Result<(), AppError> {
    println!("{}", render_report(&service, args)?);
    Ok(())
}

/// Text printed by `realty report`.
///
/// An empty dataset (failed load or no rows for the community) is an
/// `EXIT_NO_DATA` error; an empty range is a normal, informational result.
pub fn render_report(service: &DatasetService, args: &RangeArgs) -> Result<String, AppError> {
    let loaded = service.dataset();
    let Some(bounds) = DateRange::covering(&loaded.dataset) else {
        let message = match &loaded.error {
            Some(err) => format!("從 Supabase 下載或處理數據時發生錯誤: {err}\n{MSG_LOAD_FAILED}"),
            None => MSG_LOAD_FAILED.to_string(),
        };
        return Err(AppError::no_data(message));
    };

    let range = resolve_range(args, bounds);
    let view = pipeline::build_view(&loaded.dataset, range);
    if view.is_empty() {
        warn!("No rows between {} and {}", range.start, range.end);
        return Ok(MSG_EMPTY_RANGE.to_string());
    }

    Ok(crate::report::format_report(service.target_community(), &view))
}

/// Fill missing ends from the data's bounds and clamp into them.
pub fn resolve_range(args: &RangeArgs, bounds: DateRange) -> DateRange {
    DateRange::new(
        args.from.unwrap_or(bounds.start),
        args.to.unwrap_or(bounds.end),
    )
    .clamp_to(bounds)
}

fn env_filter(level: LevelFilter) -> EnvFilter {
    match std::env::var("RUST_LOG").ok() {
        // RUST_LOG exists; use it.
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_CRATE_NAME"),
            level.to_string().to_lowercase()
        )),
    }
}

fn init_stderr_logger(level: LevelFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .try_init();
}

fn init_file_logger(level: LevelFilter, path: &Path) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!("Failed to create log file '{}': {e}", path.display()))
    })?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

/// Rewrite argv so `realty` defaults to `realty tui`.
///
/// Rules:
/// - `realty`                       -> `realty tui`
/// - `realty --from 2012-01-01 ...` -> `realty tui --from 2012-01-01 ...`
/// - `realty --help/--version/-h`   -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if matches!(arg1.as_str(), "tui" | "report") {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}
