// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::config::{load_config, AppConfig};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = load_config(config_path)
        .map_err(|e| e.with_context("Configuration validation failed"))?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!(
                "  Device:        {} ({}:{}, unit {})",
                config.device.alias, config.device.host, config.device.port, config.device.unit_id
            );
            println!(
                "  Scan interval: {}",
                humantime::format_duration(config.device.scan_interval)
            );
            println!(
                "  Request delay: {}",
                humantime::format_duration(config.poller.request_delay)
            );
            println!(
                "  Staleness:     {}",
                humantime::format_duration(config.poller.staleness_window)
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_json(&config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "alias": config.device.alias,
                    "target": format!("{}:{}", config.device.host, config.device.port),
                    "unit_id": config.device.unit_id,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", to_json(&output)?);
        }
    }

    Ok(())
}

/// Flags settings that are valid but likely to misbehave against the controller.
fn collect_warnings(config: &AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.poller.staleness_window < config.device.scan_interval {
        warnings.push(format!(
            "staleness_window {} is shorter than scan_interval; one failed read will invalidate a group",
            humantime::format_duration(config.poller.staleness_window)
        ));
    }

    if config.poller.request_delay.is_zero() {
        warnings.push(
            "request_delay is 0; the controller may drop back-to-back requests".to_string(),
        );
    }

    warnings
}

fn to_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults_have_no_warnings() {
        assert!(collect_warnings(&AppConfig::for_host("hp")).is_empty());
    }

    #[test]
    fn test_tight_staleness_warns() {
        let mut config = AppConfig::for_host("hp");
        config.poller.staleness_window = Duration::from_secs(2);
        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("one failed read"));
    }

    #[test]
    fn test_zero_request_delay_warns() {
        let mut config = AppConfig::for_host("hp");
        config.poller.request_delay = Duration::ZERO;
        assert_eq!(collect_warnings(&config).len(), 1);
    }
}
