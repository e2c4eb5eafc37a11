// src/logging.rs

//! Logging setup for `catalog-gen` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `CATALOG_GEN_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Quiet mode (`--quiet` or `quiet = true` in the config file) caps the level
//! at `warn`. Logs are sent to STDERR so that stdout stays free for `list`.

use std::sync::OnceLock;

use anyhow::Result;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Registry};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "CATALOG_GEN_LOG";

static LEVEL_HANDLE: OnceLock<reload::Handle<LevelFilter, Registry>> = OnceLock::new();

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, quiet: bool) -> Result<()> {
    let level = resolve_level(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref(), quiet);

    let (filter, handle) = reload::Layer::new(level);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    let _ = LEVEL_HANDLE.set(handle);
    Ok(())
}

/// Cap the active level at `warn` once the config file asks for quiet mode.
/// No-op when logging was never initialised (tests, embedders).
pub fn apply_quiet() -> Result<()> {
    if let Some(handle) = LEVEL_HANDLE.get() {
        handle.modify(|level| *level = cap_quiet(*level))?;
    }
    Ok(())
}

fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>, quiet: bool) -> LevelFilter {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => env_value
            .and_then(parse_level_str)
            .unwrap_or(LevelFilter::INFO),
    };
    if quiet { cap_quiet(level) } else { level }
}

fn cap_quiet(level: LevelFilter) -> LevelFilter {
    level.min(LevelFilter::WARN)
}

fn level_from_log_level(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<LevelFilter> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}
