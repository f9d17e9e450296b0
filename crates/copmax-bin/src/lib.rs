// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # copmax-bin
//!
//! Polling daemon and CLI for COPMAX heat-pump controllers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                 main.rs                  │
//! └────────────────────┬─────────────────────┘
//!                      │
//!               ┌──────▼──────┐
//!               │   cli.rs    │
//!               └──────┬──────┘
//!                      │
//!          ┌───────────┼───────────┐
//!          ▼           ▼           ▼
//!    ┌──────────┐ ┌──────────┐ ┌──────────┐
//!    │ commands │ │ runtime  │ │ logging  │
//!    └────┬─────┘ └────┬─────┘ └──────────┘
//!         │            │
//!         │     ┌──────▼──────┐
//!         │     │  shutdown   │
//!         │     └─────────────┘
//!         ▼
//!    ┌──────────┐     ┌───────────────┐
//!    │  config  │────▶│ copmax-modbus │
//!    └──────────┘     └───────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Poll on the scan interval until Ctrl+C (default command)
//! copmax -c /etc/copmax/copmax.yaml
//!
//! # One cycle, JSON output
//! copmax poll -f json
//!
//! # Set register 41 to -5.00 (hundredths)
//! copmax set 41 -5 --multiplier 100
//!
//! # Validate configuration
//! copmax validate --show-config
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use config::{AppConfig, DeviceConfig};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{PollingRuntime, RuntimeBuilder};
pub use shutdown::ShutdownCoordinator;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
