// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use taskgate_config::{DatabaseBackend, TaskgateConfig};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Prints a summary of the loaded configuration and any warnings.
///
/// Loading already validated the values; this reports what the server would
/// run with.
pub fn validate(cli: &Cli, config: &TaskgateConfig, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;
    let file_present = config_path.exists();
    let warnings = collect_warnings(config, file_present);
    // The signing key is never serialized.
    let shown = args.show_config.then_some(config);

    match args.format {
        OutputFormat::Text => {
            if file_present {
                println!("✓ Configuration is valid: {}", config_path.display());
            } else {
                println!("✓ Defaults are valid (no file at {})", config_path.display());
            }
            println!();
            println!("Summary:");
            println!("  Listen:      {}", config.server.socket_addr());
            println!("  Backend:     {}", config.database.backend.as_str());
            println!("  Database:    {}", config.database.name);
            println!("  Cookie:      {}", config.security.cookie.name);
            println!(
                "  Signing key: {}",
                if config.security.jwt.has_secret() { "present" } else { "missing" }
            );
            println!("  Token TTL:   {}s", config.security.jwt.expiration_secs);
            println!("  CORS:        {}", config.server.cors.allowed_origins.join(", "));

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if let Some(shown) = shown {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_json(shown)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "file_present": file_present,
                "summary": {
                    "listen": config.server.socket_addr().to_string(),
                    "backend": config.database.backend.as_str(),
                    "database": config.database.name,
                    "cookie": config.security.cookie.name,
                    "signing_key": config.security.jwt.has_secret(),
                    "token_ttl_secs": config.security.jwt.expiration_secs,
                },
                "warnings": warnings,
                "config": shown,
            });
            println!("{}", to_json(&output)?);
        }
        OutputFormat::Yaml => {
            println!("valid: true");
            println!("config_path: {}", config_path.display());
            println!("file_present: {}", file_present);
            if !warnings.is_empty() {
                println!("warnings:");
                for warning in &warnings {
                    println!("  - {}", warning);
                }
            }
            if let Some(shown) = shown {
                let yaml = serde_yaml::to_string(shown)
                    .map_err(|e| BinError::runtime(format!("Failed to render config: {e}")))?;
                println!("config:");
                for line in yaml.lines() {
                    println!("  {}", line);
                }
            }
        }
    }

    Ok(())
}

fn collect_warnings(config: &TaskgateConfig, file_present: bool) -> Vec<String> {
    let mut warnings = Vec::new();

    if !file_present {
        warnings.push("Configuration file not found, defaults are in use".to_string());
    }
    if !config.security.jwt.has_secret() {
        warnings.push(format!(
            "No signing key configured; `run` will refuse to start (set ${})",
            config.security.jwt.secret_env
        ));
    }
    if config.database.backend == DatabaseBackend::Memory {
        warnings.push("In-memory backend selected; data is lost on exit".to_string());
    }
    if !config.security.cookie.secure {
        warnings.push("Session cookie is sent without the Secure attribute".to_string());
    }

    warnings
}

fn to_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("Failed to render config: {e}")))
}
