// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Heat-pump polling and group freshness tracking.
//!
//! # State Machine
//!
//! Each [`RegisterGroup`] moves between two states:
//!
//! ```text
//!              success                      success (replace / merge)
//!   Invalid ────────────────▶ Valid ◀──────────────┐
//!      ▲                        │ │                │
//!      │ failure                │ └────────────────┘
//!      │ (any)                  │ failure within staleness window
//!      │                        │   (values retained)
//!      └────────────────────────┘
//!         failure after staleness window
//! ```
//!
//! # Session
//!
//! One transport is shared by every group and every write. A poll cycle holds
//! the session lock from the first read to the final close, so writes issued
//! mid-cycle wait for it to finish.

mod group;
mod plan;
mod stats;

pub use group::{GroupSnapshot, RegisterGroup};
pub use plan::{plan_for, ReadStep};
pub use stats::{PollStats, PollStatsSnapshot};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::client::{ModbusTcpTransport, ModbusTransport};
use crate::codec;
use crate::error::{ModbusError, ModbusResult, ProtocolError, WriteError};
use crate::types::{ModbusTcpConfig, PollerConfig};

// =============================================================================
// GroupState
// =============================================================================

struct GroupState {
    snapshot: Arc<GroupSnapshot>,
    refreshed_at: Option<Instant>,
}

impl GroupState {
    fn empty() -> Self {
        Self {
            snapshot: Arc::new(GroupSnapshot::default()),
            refreshed_at: None,
        }
    }
}

// =============================================================================
// ModbusPoller
// =============================================================================

/// Polls the heat pump's register groups over a single Modbus session.
///
/// # Example
///
/// ```rust,ignore
/// use copmax_modbus::{ModbusPoller, ModbusTcpConfig, PollerConfig, RegisterGroup};
///
/// let config = ModbusTcpConfig::builder().host("192.168.1.50").build()?;
/// let poller = ModbusPoller::tcp(config, PollerConfig::default());
///
/// if poller.poll_cycle().await {
///     let temps = poller.read_group(RegisterGroup::Temperatures);
///     println!("supply: {:?}", temps.scaled(0, 100.0));
/// }
/// ```
pub struct ModbusPoller<T: ModbusTransport> {
    session: Mutex<T>,
    target: String,
    config: PollerConfig,
    groups: [RwLock<GroupState>; 4],
    stats: PollStats,
}

impl ModbusPoller<ModbusTcpTransport> {
    /// Creates a poller over a Modbus TCP transport.
    pub fn tcp(config: ModbusTcpConfig, poller_config: PollerConfig) -> Self {
        Self::new(ModbusTcpTransport::new(config), poller_config)
    }
}

impl<T: ModbusTransport> ModbusPoller<T> {
    /// Creates a poller over `transport`. All groups start invalid and empty.
    pub fn new(transport: T, config: PollerConfig) -> Self {
        let target = transport.display_name();
        Self {
            session: Mutex::new(transport),
            target,
            config,
            groups: std::array::from_fn(|_| RwLock::new(GroupState::empty())),
            stats: PollStats::new(),
        }
    }

    /// Returns the poller configuration.
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Returns the transport display name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the poller statistics.
    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Returns the current snapshot of `group` without touching the network.
    pub fn read_group(&self, group: RegisterGroup) -> Arc<GroupSnapshot> {
        Arc::clone(&self.groups[group.index()].read().snapshot)
    }

    /// Returns the current snapshot of every group.
    pub fn snapshot_all(&self) -> BTreeMap<RegisterGroup, Arc<GroupSnapshot>> {
        RegisterGroup::ALL
            .into_iter()
            .map(|group| (group, self.read_group(group)))
            .collect()
    }

    // =========================================================================
    // Polling
    // =========================================================================

    /// Runs one full poll cycle, waiting for any in-flight cycle or write.
    ///
    /// Returns `true` if the sequence ran without an unexpected error.
    /// Read failures are absorbed into group state and do not make this `false`.
    pub async fn poll_cycle(&self) -> bool {
        let mut session = self.session.lock().await;
        self.run_cycle(&mut session).await
    }

    /// Runs one poll cycle unless the session is busy.
    ///
    /// Returns `None` when the trigger was dropped.
    pub async fn try_poll_cycle(&self) -> Option<bool> {
        let Ok(mut session) = self.session.try_lock() else {
            self.stats.record_skipped();
            tracing::debug!(target_device = %self.target, "Poll cycle skipped, session busy");
            return None;
        };
        Some(self.run_cycle(&mut session).await)
    }

    async fn run_cycle(&self, transport: &mut T) -> bool {
        let started = Instant::now();
        let result = self.poll_groups(transport).await;

        if self.config.close_after_cycle {
            self.close_session(transport).await;
        }

        self.stats.record_cycle(result.is_ok());

        match result {
            Ok(()) => {
                tracing::debug!(
                    target_device = %self.target,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Poll cycle complete"
                );
                true
            }
            Err(e) => {
                e.log("poll cycle");
                false
            }
        }
    }

    async fn poll_groups(&self, transport: &mut T) -> ModbusResult<()> {
        for group in RegisterGroup::ALL {
            self.refresh_group(transport, group).await?;
        }
        Ok(())
    }

    async fn refresh_group(&self, transport: &mut T, group: RegisterGroup) -> ModbusResult<()> {
        for step in plan_for(group) {
            if step.merge && !self.is_valid(group) {
                tracing::debug!(
                    group = %group,
                    start = step.start,
                    "Skipping dependent range, group invalid"
                );
                break;
            }

            match self.read_range(transport, step).await {
                Some(words) => {
                    let decoded = codec::decode_words(step.start, &words, group.value_kind())?;
                    self.apply_success(group, step, decoded);
                }
                None => self.apply_failure(group, step),
            }
        }
        Ok(())
    }

    fn is_valid(&self, group: RegisterGroup) -> bool {
        self.groups[group.index()].read().snapshot.valid
    }

    fn apply_success(&self, group: RegisterGroup, step: &ReadStep, decoded: Vec<(u16, i32)>) {
        let mut state = self.groups[group.index()].write();

        let mut values = if step.merge {
            state.snapshot.values.clone()
        } else {
            BTreeMap::new()
        };
        values.extend(decoded);

        state.snapshot = Arc::new(GroupSnapshot {
            values,
            valid: true,
            last_updated: Some(Utc::now()),
        });
        state.refreshed_at = Some(Instant::now());

        tracing::debug!(
            group = %group,
            start = step.start,
            count = step.count,
            "Group updated"
        );
    }

    fn apply_failure(&self, group: RegisterGroup, step: &ReadStep) {
        let mut state = self.groups[group.index()].write();

        if !state.snapshot.valid {
            return;
        }

        let stale = state
            .refreshed_at
            .map_or(true, |at| at.elapsed() > self.config.staleness_window);

        if stale {
            let mut snapshot = GroupSnapshot::clone(&state.snapshot);
            snapshot.valid = false;
            state.snapshot = Arc::new(snapshot);

            tracing::error!(
                group = %group,
                start = step.start,
                count = step.count,
                "Invalid {group} data, last good read older than {:?}",
                self.config.staleness_window
            );
        } else {
            tracing::warn!(
                group = %group,
                start = step.start,
                count = step.count,
                "Read failed, keeping last known {group} values"
            );
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    async fn ensure_connected(&self, transport: &mut T) -> ModbusResult<()> {
        if transport.is_connected() {
            return Ok(());
        }
        transport.connect().await?;
        self.stats.record_connection();
        Ok(())
    }

    async fn pace(&self) {
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }
    }

    async fn close_session(&self, transport: &mut T) {
        if !transport.is_connected() {
            return;
        }
        if let Err(e) = transport.disconnect().await {
            e.log("close session");
        }
    }

    /// Drops the session after a transport-level failure so the next request reconnects.
    async fn reset_after(&self, transport: &mut T, error: &ModbusError) {
        if !error.is_device_rejection() {
            self.close_session(transport).await;
        }
    }

    async fn read_range(&self, transport: &mut T, step: &ReadStep) -> Option<Vec<u16>> {
        match self.try_read_range(transport, step).await {
            Ok(words) => {
                self.stats.record_read(true);
                Some(words)
            }
            Err(e) => {
                self.stats.record_read(false);
                tracing::warn!(
                    target_device = %self.target,
                    space = %step.space,
                    start = step.start,
                    count = step.count,
                    error_code = %e.error_code(),
                    error = %e,
                    "Register read failed"
                );
                self.reset_after(transport, &e).await;
                None
            }
        }
    }

    async fn try_read_range(&self, transport: &mut T, step: &ReadStep) -> ModbusResult<Vec<u16>> {
        self.ensure_connected(transport).await?;
        self.pace().await;

        let words = transport
            .read_registers(step.space, step.start, step.count)
            .await?;

        if words.len() != step.count as usize {
            return Err(ModbusError::protocol(ProtocolError::unexpected(format!(
                "expected {} registers at {}{}, got {}",
                step.count,
                step.space,
                step.start,
                words.len()
            ))));
        }

        Ok(words)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Scales `value` by `multiplier`, encodes it and writes it to holding register `address`.
    ///
    /// Returns the raw word that was written.
    ///
    /// # Errors
    ///
    /// - [`WriteError::Codec`] if the scaled value does not fit a signed 16-bit register
    /// - [`WriteError::Rejected`] if the device answered with an exception
    /// - [`WriteError::ConnectionFailed`] if the device could not be reached in time
    pub async fn write_setpoint(
        &self,
        address: u16,
        value: i32,
        multiplier: i32,
    ) -> Result<u16, WriteError> {
        let raw = codec::encode_scaled(value, multiplier)?;

        let mut session = self.session.lock().await;
        let transport = &mut *session;

        let result = self.write_register(transport, address, raw).await;

        match result {
            Ok(()) => {
                self.stats.record_write_ok();
                tracing::info!(
                    target_device = %self.target,
                    address,
                    value,
                    multiplier,
                    raw,
                    "Setpoint written"
                );
                Ok(raw)
            }
            Err(e) if e.is_device_rejection() => {
                self.stats.record_write_rejected();
                tracing::error!(
                    target_device = %self.target,
                    address,
                    raw,
                    error = %e,
                    "Device rejected setpoint"
                );
                Err(WriteError::Rejected { address, source: e })
            }
            Err(e) => {
                self.stats.record_write_unreachable();
                tracing::error!(
                    target_device = %self.target,
                    address,
                    error = %e,
                    "Could not write setpoint"
                );
                self.reset_after(transport, &e).await;
                Err(WriteError::ConnectionFailed {
                    address,
                    target: self.target.clone(),
                    source: e,
                })
            }
        }
    }

    async fn write_register(&self, transport: &mut T, address: u16, raw: u16) -> ModbusResult<()> {
        self.ensure_connected(transport).await?;
        self.pace().await;
        transport.write_single_register(address, raw).await
    }

    /// Closes the session if open. Used at shutdown.
    pub async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        self.close_session(&mut session).await;
    }
}

impl<T: ModbusTransport> std::fmt::Debug for ModbusPoller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModbusPoller")
            .field("target", &self.target)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
