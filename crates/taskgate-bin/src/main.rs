// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! taskgate server entry point.

use taskgate_bin::cli::{Cli, LogFormat};
use taskgate_bin::commands;
use taskgate_bin::error::report_error_and_exit;
use taskgate_bin::logging::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let config = match commands::load_config(&cli) {
        Ok(config) => config,
        Err(e) => report_error_and_exit(e.with_context("Failed to load configuration")),
    };

    let level = cli
        .log_level_override()
        .unwrap_or(config.logging.level.as_str())
        .to_string();
    let format = cli
        .log_format
        .unwrap_or_else(|| LogFormat::from(config.logging.format));

    if let Err(e) = init_logging(&level, format) {
        report_error_and_exit(e);
    }

    if let Err(e) = commands::execute(cli, config).await {
        report_error_and_exit(e);
    }
}
