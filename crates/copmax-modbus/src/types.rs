// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Connection, pacing and register-space types.
//!
//! - **RegisterSpace**: input vs holding registers, with their function codes
//! - **ModbusTcpConfig**: TCP connection configuration with builder
//! - **PollerConfig**: request pacing, staleness window and session lifecycle
//!
//! # Examples
//!
//! ```
//! use copmax_modbus::types::{ModbusTcpConfig, PollerConfig};
//! use std::time::Duration;
//!
//! let config = ModbusTcpConfig::builder()
//!     .host("192.168.1.50")
//!     .port(502)
//!     .unit_id(1)
//!     .build()
//!     .unwrap();
//!
//! let poller = PollerConfig::default();
//! assert_eq!(poller.request_delay, Duration::from_millis(700));
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, ModbusError};

// =============================================================================
// RegisterSpace
// =============================================================================

/// The 16-bit register class a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterSpace {
    /// Input Register (read-only, FC 04).
    Input,
    /// Holding Register (read/write, FC 03 / FC 06).
    Holding,
}

impl RegisterSpace {
    /// Returns the function code for reading this space.
    #[inline]
    pub const fn read_function_code(&self) -> u8 {
        match self {
            Self::Holding => 0x03,
            Self::Input => 0x04,
        }
    }

    /// Returns the function code for a single-register write, if writable.
    #[inline]
    pub const fn write_single_function_code(&self) -> Option<u8> {
        match self {
            Self::Holding => Some(0x06),
            Self::Input => None,
        }
    }

    /// Returns the short name.
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Input => "IR",
            Self::Holding => "HR",
        }
    }
}

impl fmt::Display for RegisterSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

// =============================================================================
// ModbusTcpConfig
// =============================================================================

/// Configuration for the Modbus TCP session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModbusTcpConfig {
    /// Target host address.
    pub host: String,

    /// Target port (default: 502).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Unit ID / Slave address (default: 1).
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,

    /// Connection timeout.
    #[serde(default = "default_timeout")]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Read/write operation timeout.
    #[serde(default = "default_timeout")]
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,

    /// Enable TCP_NODELAY.
    #[serde(default = "default_true")]
    pub tcp_nodelay: bool,
}

fn default_port() -> u16 {
    502
}

fn default_unit_id() -> u8 {
    1
}

fn default_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_true() -> bool {
    true
}

impl ModbusTcpConfig {
    /// Creates a new builder for ModbusTcpConfig.
    pub fn builder() -> ModbusTcpConfigBuilder {
        ModbusTcpConfigBuilder::default()
    }

    /// Creates configuration with host and port.
    pub fn with_port(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Returns the socket address string.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ModbusError> {
        if self.host.trim().is_empty() {
            return Err(ModbusError::configuration(ConfigurationError::missing_field(
                "host",
            )));
        }

        if !(1..=247).contains(&self.unit_id) {
            return Err(ModbusError::configuration(
                ConfigurationError::invalid_unit_id(self.unit_id),
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(ModbusError::configuration(ConfigurationError::invalid_duration(
                "connect_timeout",
                self.connect_timeout,
                "must be greater than 0",
            )));
        }

        if self.operation_timeout.is_zero() {
            return Err(ModbusError::configuration(ConfigurationError::invalid_duration(
                "operation_timeout",
                self.operation_timeout,
                "must be greater than 0",
            )));
        }

        Ok(())
    }
}

impl Default for ModbusTcpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            unit_id: default_unit_id(),
            connect_timeout: default_timeout(),
            operation_timeout: default_timeout(),
            tcp_nodelay: true,
        }
    }
}

// =============================================================================
// ModbusTcpConfigBuilder
// =============================================================================

/// Builder for ModbusTcpConfig.
#[derive(Debug, Default)]
pub struct ModbusTcpConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    unit_id: Option<u8>,
    connect_timeout: Option<Duration>,
    operation_timeout: Option<Duration>,
    tcp_nodelay: Option<bool>,
}

impl ModbusTcpConfigBuilder {
    /// Sets the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the unit ID.
    pub fn unit_id(mut self, unit_id: u8) -> Self {
        self.unit_id = Some(unit_id);
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the operation timeout.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Sets TCP_NODELAY.
    pub fn tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.tcp_nodelay = Some(nodelay);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<ModbusTcpConfig, ModbusError> {
        let host = self.host.ok_or_else(|| {
            ModbusError::configuration(ConfigurationError::missing_field("host"))
        })?;

        let config = ModbusTcpConfig {
            host,
            port: self.port.unwrap_or_else(default_port),
            unit_id: self.unit_id.unwrap_or_else(default_unit_id),
            connect_timeout: self.connect_timeout.unwrap_or_else(default_timeout),
            operation_timeout: self.operation_timeout.unwrap_or_else(default_timeout),
            tcp_nodelay: self.tcp_nodelay.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// PollerConfig
// =============================================================================

/// Pacing and freshness settings for [`ModbusPoller`](crate::poller::ModbusPoller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Pause before every request; the controller drops back-to-back frames.
    #[serde(default = "default_request_delay")]
    #[serde(with = "humantime_serde")]
    pub request_delay: Duration,

    /// How long a group keeps its last good values through failed reads.
    #[serde(default = "default_staleness_window")]
    #[serde(with = "humantime_serde")]
    pub staleness_window: Duration,

    /// Close the session once a full poll cycle completes.
    #[serde(default = "default_true")]
    pub close_after_cycle: bool,
}

fn default_request_delay() -> Duration {
    Duration::from_millis(700)
}

fn default_staleness_window() -> Duration {
    Duration::from_secs(300)
}

impl PollerConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), ModbusError> {
        if self.staleness_window.is_zero() {
            return Err(ModbusError::configuration(ConfigurationError::invalid_duration(
                "staleness_window",
                self.staleness_window,
                "must be greater than 0",
            )));
        }
        Ok(())
    }

    /// Sets the request delay.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Sets the staleness window.
    pub fn with_staleness_window(mut self, window: Duration) -> Self {
        self.staleness_window = window;
        self
    }

    /// Sets whether the session is closed after each cycle.
    pub fn with_close_after_cycle(mut self, close: bool) -> Self {
        self.close_after_cycle = close;
        self
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            request_delay: default_request_delay(),
            staleness_window: default_staleness_window(),
            close_after_cycle: true,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
