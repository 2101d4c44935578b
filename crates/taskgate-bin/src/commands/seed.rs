// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `seed` command.

use std::fmt::Write as _;

use taskgate_api::BootstrapReport;
use taskgate_config::TaskgateConfig;

use crate::cli::{OutputFormat, SeedArgs};
use crate::error::{BinError, BinResult};
use crate::runtime::seed_catalog;

/// Seeds the catalog and prints what was inserted.
pub async fn seed(config: &TaskgateConfig, args: SeedArgs) -> BinResult<()> {
    let report = seed_catalog(config).await?;
    print!("{}", render_report(&report, args.format)?);
    Ok(())
}

/// Renders a seeding report in the requested format.
pub fn render_report(report: &BootstrapReport, format: OutputFormat) -> BinResult<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map(|json| json + "\n")
            .map_err(|e| BinError::runtime(format!("Failed to render report: {e}"))),
        OutputFormat::Yaml => serde_yaml::to_string(report)
            .map_err(|e| BinError::runtime(format!("Failed to render report: {e}"))),
    }
}

fn render_text(report: &BootstrapReport) -> String {
    let mut out = String::new();
    let status = if report.is_noop() {
        "Catalog already seeded"
    } else {
        "Catalog seeded"
    };
    let _ = writeln!(out, "{status}");

    let _ = writeln!(
        out,
        "  Permissions: {} created, {} total",
        report.permissions_created.len(),
        report.permissions_total
    );
    for name in &report.permissions_created {
        let _ = writeln!(out, "    + {name}");
    }

    let _ = writeln!(
        out,
        "  Roles:       {} created, {} total",
        report.roles_created.len(),
        report.roles_total
    );
    for name in &report.roles_created {
        let _ = writeln!(out, "    + {name}");
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_report() -> BootstrapReport {
        BootstrapReport {
            permissions_created: vec!["view_task".to_string(), "create_task".to_string()],
            roles_created: vec!["admin".to_string()],
            permissions_total: 2,
            roles_total: 1,
        }
    }

    #[test]
    fn test_render_text() {
        let text = render_report(&fresh_report(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("Catalog seeded\n"));
        assert!(text.contains("    + create_task"));

        let noop = BootstrapReport {
            permissions_total: 4,
            roles_total: 2,
            ..Default::default()
        };
        let text = render_report(&noop, OutputFormat::Text).unwrap();
        assert!(text.starts_with("Catalog already seeded\n"));
    }

    #[test]
    fn test_render_json() {
        let json = render_report(&fresh_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["roles_created"][0], "admin");
        assert_eq!(value["permissions_total"], 2);
    }

    #[test]
    fn test_render_yaml() {
        let yaml = render_report(&fresh_report(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("roles_created:"));
        assert!(yaml.contains("- admin"));
        assert!(yaml.contains("permissions_total: 2"));
    }
}
