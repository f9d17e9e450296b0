// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Poll the heat pump until shutdown (default)
//! - `poll`: Run one poll cycle and print the register groups
//! - `set`: Write one setpoint
//! - `validate`: Validate the configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use copmax_modbus::RegisterGroup;

// =============================================================================
// Main CLI Structure
// =============================================================================

/// COPMAX - heat-pump controller poller
///
/// Polls a COPMAX heat-pump controller over Modbus TCP, keeps the last known
/// good register values and writes setpoints.
#[derive(Parser, Debug)]
#[command(
    name = "copmax",
    author = "Sylvex <contact@sylvex.io>",
    version = copmax_modbus::VERSION,
    about = "Modbus TCP poller for COPMAX heat-pump controllers",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "copmax.yaml",
        env = "COPMAX_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "COPMAX_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "COPMAX_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (warnings and errors only)
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
    /// Poll the heat pump on the scan interval until shutdown
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Run a single poll cycle and print the register groups
    Poll(PollArgs),

    /// Write a setpoint to a holding register
    ///
    /// The value is multiplied by `--multiplier` and encoded as a signed
    /// 16-bit word before it is sent.
    Set(SetArgs),

    /// Validate the configuration file
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Stop after this many scheduled cycles (runs until shutdown if omitted)
    #[arg(long)]
    pub cycles: Option<u64>,
}

/// Arguments for the `poll` command.
#[derive(Args, Debug, Default, Clone)]
pub struct PollArgs {
    /// Only print this group (temperatures, user-settings, status, special-functions)
    #[arg(short, long)]
    pub group: Option<RegisterGroup>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `set` command.
#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    /// Holding register address
    pub address: u16,

    /// Setpoint value before scaling
    #[arg(allow_hyphen_values = true)]
    pub value: i32,

    /// Scale factor applied before encoding (e.g. 100 for hundredths of a degree)
    #[arg(short, long, default_value_t = 1, allow_hyphen_values = true)]
    pub multiplier: i32,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
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

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
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
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["copmax"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Run(_)));
        assert_eq!(cli.config, PathBuf::from("copmax.yaml"));
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["copmax", "run", "--cycles", "3"]);
        if let Some(Commands::Run(args)) = cli.command {
            assert_eq!(args.cycles, Some(3));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_poll_command() {
        let cli = Cli::parse_from(["copmax", "poll", "-g", "user-settings", "-f", "json"]);
        if let Some(Commands::Poll(args)) = cli.command {
            assert_eq!(args.group, Some(RegisterGroup::UserSettings));
            assert_eq!(args.format, OutputFormat::Json);
        } else {
            panic!("Expected Poll command");
        }
    }

    #[test]
    fn test_poll_rejects_unknown_group() {
        assert!(Cli::try_parse_from(["copmax", "poll", "-g", "pressures"]).is_err());
    }

    #[test]
    fn test_set_command() {
        let cli = Cli::parse_from(["copmax", "set", "41", "-5", "--multiplier", "100"]);
        if let Some(Commands::Set(args)) = cli.command {
            assert_eq!(args.address, 41);
            assert_eq!(args.value, -5);
            assert_eq!(args.multiplier, 100);
        } else {
            panic!("Expected Set command");
        }
    }

    #[test]
    fn test_set_default_multiplier() {
        let cli = Cli::parse_from(["copmax", "set", "38", "45"]);
        if let Some(Commands::Set(args)) = cli.command {
            assert_eq!(args.multiplier, 1);
        } else {
            panic!("Expected Set command");
        }
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["copmax", "validate", "--show-config"]);
        if let Some(Commands::Validate(args)) = cli.command {
            assert!(args.show_config);
            assert_eq!(args.format, OutputFormat::Text);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["copmax", "-c", "/etc/copmax/heatpump.toml"]);
        assert_eq!(cli.config, PathBuf::from("/etc/copmax/heatpump.toml"));
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::parse_from(["copmax", "-l", "debug"]);
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_quiet_mode() {
        let cli = Cli::parse_from(["copmax", "-q"]);
        assert!(cli.quiet);
        assert_eq!(cli.effective_log_level(), "warn");
    }

    #[test]
    fn test_verbose_mode() {
        let cli = Cli::parse_from(["copmax", "-v", "poll"]);
        assert!(cli.verbose);
        assert_eq!(cli.effective_log_level(), "debug");
    }
}
