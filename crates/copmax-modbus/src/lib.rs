// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # copmax-modbus
//!
//! Modbus TCP polling core for COPMAX heat pumps.
//!
//! This crate provides:
//!
//! - **Register codec**: signed/unsigned 16-bit conversion with range checks
//! - **Poller**: fixed multi-range read sequence over one Modbus TCP session
//! - **Freshness tracking**: per-group validity with a debounced staleness window
//! - **Setpoint writes**: scaled single-register writes with distinct failure kinds
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ModbusPoller                             │
//! │     Temperatures │ UserSettings │ Status │ SpecialFunctions     │
//! │          (GroupSnapshot behind RwLock<Arc<..>> per group)       │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │  ReadStep plans
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   ModbusTransport                               │
//! │               (Abstract transport layer)                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                 ┌─────────────────────────┐
//!                 │   ModbusTcpTransport    │
//!                 │     (tokio-modbus)      │
//!                 └─────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use copmax_modbus::{ModbusPoller, ModbusTcpConfig, PollerConfig, RegisterGroup};
//!
//! let config = ModbusTcpConfig::builder()
//!     .host("192.168.1.50")
//!     .port(502)
//!     .build()?;
//!
//! let poller = ModbusPoller::tcp(config, PollerConfig::default());
//! poller.poll_cycle().await;
//!
//! let settings = poller.read_group(RegisterGroup::UserSettings);
//! if settings.valid {
//!     println!("{:?}", settings.values);
//! }
//!
//! // Write 45.0 to a hundredths-encoded setpoint.
//! let raw = poller.write_setpoint(38, 45, 100).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod client;
pub mod codec;
pub mod error;
pub mod poller;
pub mod types;

// =============================================================================
// Re-exports - Error Module
// =============================================================================

pub use error::{
    // Main error type
    ModbusError,
    ModbusResult,
    // Error categories
    CodecError,
    ConfigurationError,
    ConnectionError,
    ProtocolError,
    TimeoutError,
    WriteError,
    // Error metadata
    ErrorCode,
    ErrorSeverity,
};

// =============================================================================
// Re-exports - Types Module
// =============================================================================

pub use types::{ModbusTcpConfig, ModbusTcpConfigBuilder, PollerConfig, RegisterSpace};

// =============================================================================
// Re-exports - Client and Poller
// =============================================================================

pub use client::{ModbusTcpTransport, ModbusTransport, TransportState};
pub use codec::{decode_signed16, encode_signed16};
pub use poller::{
    GroupSnapshot, ModbusPoller, PollStats, PollStatsSnapshot, ReadStep, RegisterGroup,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
