// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application configuration loading.
//!
//! The file is YAML or TOML, chosen by extension. Any value can be
//! overridden from the environment with a `COPMAX_` prefix and `__` between
//! nesting levels:
//!
//! ```text
//! COPMAX_DEVICE__HOST=192.168.1.50
//! COPMAX_POLLER__STALENESS_WINDOW=10m
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use copmax_modbus::{ConfigurationError, ModbusError, ModbusTcpConfig, PollerConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BinError, BinResult};

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "COPMAX";

// =============================================================================
// Schema
// =============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// The controller to poll.
    pub device: DeviceConfig,

    /// Pacing and freshness settings.
    #[serde(default)]
    pub poller: PollerConfig,
}

/// Connection and scheduling settings for the heat pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Name used in log spans.
    #[serde(default = "default_alias")]
    pub alias: String,

    /// Controller host name or IP address.
    pub host: String,

    /// Modbus TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Modbus unit id.
    #[serde(default = "default_unit_id")]
    pub unit_id: u8,

    /// Period between scheduled poll cycles.
    #[serde(default = "default_scan_interval", with = "humantime_serde")]
    pub scan_interval: Duration,

    /// TCP connect timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Per-request timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub operation_timeout: Duration,
}

fn default_alias() -> String {
    "heat-pump".to_string()
}

fn default_port() -> u16 {
    502
}

fn default_unit_id() -> u8 {
    1
}

fn default_scan_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_timeout() -> Duration {
    Duration::from_secs(3)
}

impl DeviceConfig {
    /// Creates a device entry with defaults for everything but the host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            alias: default_alias(),
            host: host.into(),
            port: default_port(),
            unit_id: default_unit_id(),
            scan_interval: default_scan_interval(),
            connect_timeout: default_timeout(),
            operation_timeout: default_timeout(),
        }
    }

    /// Builds the Modbus TCP session settings.
    pub fn to_tcp_config(&self) -> Result<ModbusTcpConfig, ModbusError> {
        ModbusTcpConfig::builder()
            .host(self.host.trim())
            .port(self.port)
            .unit_id(self.unit_id)
            .connect_timeout(self.connect_timeout)
            .operation_timeout(self.operation_timeout)
            .build()
    }
}

impl AppConfig {
    /// Creates a configuration for `host` with all defaults.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            device: DeviceConfig::new(host),
            poller: PollerConfig::default(),
        }
    }

    /// Validates every section.
    pub fn validate(&self) -> BinResult<()> {
        self.device.to_tcp_config().map_err(invalid)?;

        if self.device.scan_interval.is_zero() {
            return Err(invalid(ModbusError::configuration(
                ConfigurationError::invalid_duration(
                    "scan_interval",
                    self.device.scan_interval,
                    "must be greater than 0",
                ),
            )));
        }

        self.poller.validate().map_err(invalid)
    }
}

fn invalid(error: ModbusError) -> BinError {
    BinError::config(error.to_string())
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> BinResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some(other) => Err(BinError::config(format!(
                "Unsupported configuration format: .{other}"
            ))),
            None => Err(BinError::config(
                "Unsupported configuration format: (no extension)",
            )),
        }
    }

    fn file_format(self) -> config::FileFormat {
        match self {
            ConfigFormat::Yaml => config::FileFormat::Yaml,
            ConfigFormat::Toml => config::FileFormat::Toml,
        }
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Loads [`AppConfig`] from a file layered with environment overrides.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    env_source: Option<config::Map<String, String>>,
}

impl ConfigLoader {
    /// Creates a loader reading overrides from the process environment.
    pub fn new() -> Self {
        Self {
            env_prefix: ENV_PREFIX.to_string(),
            env_source: None,
        }
    }

    /// Reads overrides from `vars` instead of the process environment.
    pub fn with_env_source(mut self, vars: config::Map<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    /// Loads and validates configuration from a file.
    pub fn load(&self, path: impl AsRef<Path>) -> BinResult<AppConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(BinError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path)
            .map_err(|e| BinError::from(e).with_context(path.display().to_string()))?;

        self.load_from_str(&content, format)
            .map_err(|e| e.with_context(format!("Failed to load {}", path.display())))
    }

    /// Loads and validates configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> BinResult<AppConfig> {
        let environment = config::Environment::with_prefix(&self.env_prefix)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(self.env_source.clone());

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(content, format.file_format()))
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;

        debug!(
            alias = %config.device.alias,
            host = %config.device.host,
            port = config.device.port,
            scan_interval = %humantime::format_duration(config.device.scan_interval),
            "Configuration loaded"
        );

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> BinResult<AppConfig> {
    ConfigLoader::new().load(path)
}

// =============================================================================
// Tests
// =============================================================================
