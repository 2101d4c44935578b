// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the server (default)
//! - `validate`: Validate the configuration
//! - `seed`: Seed the permission and role catalog
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// taskgate - task management backend with role-based access control
#[derive(Parser, Debug)]
#[command(
    name = "taskgate",
    author = "Sylvex <contact@sylvex.io>",
    version = crate::VERSION,
    about = "Task management backend with role-based access control",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path. Defaults apply when the file is absent.
    #[arg(
        short,
        long,
        default_value = "taskgate.yaml",
        env = "TASKGATE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Overrides the file.
    #[arg(short, long, env = "TASKGATE_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact). Overrides the file.
    #[arg(long, env = "TASKGATE_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server
    ///
    /// This is the default command when no subcommand is specified. It
    /// connects the store, seeds the catalog and serves until interrupted.
    Run,

    /// Validate the configuration file
    ///
    /// Loads and validates the configuration without starting the server.
    Validate(ValidateArgs),

    /// Seed the permission and role catalog
    ///
    /// Inserts any missing permissions and roles, then prints a report.
    /// Running it again is a no-op.
    Seed(SeedArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for the configuration dump
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `seed` command.
#[derive(Args, Debug, Default, Clone)]
pub struct SeedArgs {
    /// Output format for the report
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<taskgate_config::LogFormat> for LogFormat {
    fn from(format: taskgate_config::LogFormat) -> Self {
        match format {
            taskgate_config::LogFormat::Text => LogFormat::Text,
            taskgate_config::LogFormat::Json => LogFormat::Json,
            taskgate_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
    /// YAML format
    Yaml,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Returns the level forced by flags, if any.
    ///
    /// `-q` and `-v` win over `-l`; `None` means the configured level applies.
    pub fn log_level_override(&self) -> Option<&str> {
        if self.quiet {
            Some("warn")
        } else if self.verbose {
            Some("debug")
        } else {
            self.log_level.as_deref()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
