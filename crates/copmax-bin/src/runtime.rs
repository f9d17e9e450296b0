// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Polling runtime.
//!
//! ```text
//! load config ──▶ build poller ──▶ initial refresh
//!                                        │
//!                     ┌──────────────────▼─────────────────┐
//!                     │ every scan_interval: try_poll_cycle │◀─┐
//!                     └──────────────────┬─────────────────┘  │
//!                                        ├── tick ────────────┘
//!                                        ▼
//!                             shutdown ──▶ disconnect
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use copmax_modbus::{ModbusPoller, ModbusTcpTransport, ModbusTransport, RegisterGroup};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, info_span, Instrument};

use crate::config::{load_config, AppConfig};
use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// PollingRuntime
// =============================================================================

/// Drives a [`ModbusPoller`] on the scan interval until shutdown.
pub struct PollingRuntime<T: ModbusTransport> {
    poller: Arc<ModbusPoller<T>>,
    alias: String,
    scan_interval: Duration,
    max_cycles: Option<u64>,
    shutdown: ShutdownCoordinator,
}

impl<T: ModbusTransport> PollingRuntime<T> {
    /// Creates a runtime around an existing poller.
    pub fn new(
        poller: Arc<ModbusPoller<T>>,
        alias: impl Into<String>,
        scan_interval: Duration,
    ) -> Self {
        Self {
            poller,
            alias: alias.into(),
            scan_interval,
            max_cycles: None,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Stops after `cycles` scheduled cycles in addition to the initial refresh.
    pub fn with_max_cycles(mut self, cycles: Option<u64>) -> Self {
        self.max_cycles = cycles;
        self
    }

    /// Uses an externally owned shutdown coordinator.
    pub fn with_shutdown(mut self, shutdown: ShutdownCoordinator) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Returns the shared poller.
    pub fn poller(&self) -> &Arc<ModbusPoller<T>> {
        &self.poller
    }

    /// Polls until shutdown is requested or the cycle limit is reached, then closes the session.
    pub async fn run(self) -> BinResult<()> {
        let span = info_span!(
            "device",
            alias = %self.alias,
            target_device = %self.poller.target()
        );

        async move {
            info!(
                scan_interval = %humantime::format_duration(self.scan_interval),
                "Polling started"
            );

            self.poller.poll_cycle().await;
            self.log_validity();

            let mut ticker = interval(self.scan_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately and the initial refresh already ran.
            ticker.tick().await;

            let mut scheduled = 0u64;
            while self.max_cycles.map_or(true, |max| scheduled < max) {
                tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        scheduled += 1;
                        match self.poller.try_poll_cycle().await {
                            Some(_) => self.log_validity(),
                            None => debug!("Previous cycle still running, tick skipped"),
                        }
                    }
                }
            }

            self.poller.disconnect().await;

            let stats = self.poller.stats().snapshot();
            info!(
                cycles = stats.cycles,
                skipped = stats.skipped_cycles,
                reads_ok = stats.reads_ok,
                reads_failed = stats.reads_failed,
                read_success_rate = self.poller.stats().read_success_rate(),
                "Polling stopped"
            );
            Ok(())
        }
        .instrument(span)
        .await
    }

    fn log_validity(&self) {
        for group in RegisterGroup::ALL {
            let snapshot = self.poller.read_group(group);
            debug!(
                group = %group,
                valid = snapshot.valid,
                registers = snapshot.values.len(),
                "Group state"
            );
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for the TCP-backed runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<AppConfig>,
    max_cycles: Option<u64>,
    shutdown: Option<ShutdownCoordinator>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Limits the number of scheduled cycles.
    pub fn max_cycles(mut self, cycles: Option<u64>) -> Self {
        self.max_cycles = cycles;
        self
    }

    /// Sets the shutdown coordinator.
    pub fn shutdown(mut self, shutdown: ShutdownCoordinator) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<PollingRuntime<ModbusTcpTransport>> {
        let config = match self.config {
            Some(cfg) => {
                cfg.validate()?;
                cfg
            }
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;
                load_config(&path)?
            }
        };

        let poller = Arc::new(build_poller(&config)?);

        Ok(
            PollingRuntime::new(poller, config.device.alias.clone(), config.device.scan_interval)
                .with_max_cycles(self.max_cycles)
                .with_shutdown(self.shutdown.unwrap_or_default()),
        )
    }
}

/// Creates a TCP poller for the configured device.
pub fn build_poller(config: &AppConfig) -> BinResult<ModbusPoller<ModbusTcpTransport>> {
    let tcp = config
        .device
        .to_tcp_config()
        .map_err(|e| BinError::config(e.to_string()))?;
    Ok(ModbusPoller::tcp(tcp, config.poller.clone()))
}

// =============================================================================
// Tests
// =============================================================================
