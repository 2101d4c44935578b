// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `run`: Start the server
//! - `validate`: Validate the configuration
//! - `seed`: Seed the permission and role catalog
//! - `version`: Show version information

mod run;
mod seed;
mod validate;
mod version;

pub use run::run;
pub use seed::seed;
pub use validate::validate;
pub use version::version;

use taskgate_config::{ConfigLoader, TaskgateConfig};

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli, config: TaskgateConfig) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run => run::run(config).await,
        Commands::Validate(args) => validate::validate(&cli, &config, args),
        Commands::Seed(args) => seed::seed(&config, args).await,
        Commands::Version => version::version(),
    }
}

/// Loads the configuration named on the command line.
///
/// A missing file falls back to defaults plus environment overrides.
pub fn load_config(cli: &Cli) -> BinResult<TaskgateConfig> {
    Ok(ConfigLoader::new().load_or_default(Some(&cli.config))?)
}
