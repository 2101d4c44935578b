// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.
//!
//! `RUST_LOG`, when set, replaces the configured level entirely.

use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::cli::LogFormat;
use crate::error::{BinError, BinResult};

/// Noisy dependencies capped regardless of the chosen level.
const DEPENDENCY_DIRECTIVES: &[&str] = &["hyper=warn", "tower=warn", "tower_http=info"];

// =============================================================================
// Logging Initialization
// =============================================================================

/// Initializes the global subscriber.
///
/// # Example
///
/// ```ignore
/// use taskgate_bin::cli::LogFormat;
/// use taskgate_bin::logging::init_logging;
///
/// init_logging("info", LogFormat::Text)?;
/// ```
pub fn init_logging(level: &str, format: LogFormat) -> BinResult<()> {
    let filter = build_filter(level)?;

    match format {
        LogFormat::Text => init_text_logging(filter),
        LogFormat::Json => init_json_logging(filter),
        LogFormat::Compact => init_compact_logging(filter),
    }
}

/// Builds the filter from `RUST_LOG`, falling back to `level`.
pub fn build_filter(level: &str) -> BinResult<EnvFilter> {
    let mut filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| BinError::config(format!("Invalid log level '{level}': {e}")))?,
    };

    for directive in DEPENDENCY_DIRECTIVES {
        let directive = directive
            .parse::<Directive>()
            .map_err(|e| BinError::init(format!("Invalid log directive '{directive}': {e}")))?;
        filter = filter.add_directive(directive);
    }

    Ok(filter)
}

fn init_text_logging(filter: EnvFilter) -> BinResult<()> {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(is_terminal),
        )
        .try_init()
        .map_err(already_initialized)
}

fn init_json_logging(filter: EnvFilter) -> BinResult<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init()
        .map_err(already_initialized)
}

fn init_compact_logging(filter: EnvFilter) -> BinResult<()> {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(is_terminal),
        )
        .try_init()
        .map_err(already_initialized)
}

fn already_initialized(e: tracing_subscriber::util::TryInitError) -> BinError {
    BinError::init(format!("Failed to initialize logging: {e}"))
}

// =============================================================================
// Tests
// =============================================================================
