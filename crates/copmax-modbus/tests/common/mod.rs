// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Common Test Utilities
//!
//! A scripted in-memory heat pump behind the [`ModbusTransport`] trait.
//!
//! - `MockTransport`: the half handed to the poller
//! - `MockDevice`: the shared half the test keeps to script faults and inspect traffic

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use copmax_modbus::client::{ModbusTransport, TransportState};
use copmax_modbus::error::{ConnectionError, ModbusError, ModbusResult};
use copmax_modbus::types::RegisterSpace;
use copmax_modbus::PollerConfig;

// =============================================================================
// Fault
// =============================================================================

/// Scripted failure for one range request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Answer with a Modbus exception.
    Exception(u8),
    /// Drop the connection mid-request.
    Closed,
    /// Return one register fewer than requested.
    Short,
}

impl Fault {
    fn into_error(self, function_code: u8) -> ModbusError {
        match self {
            Fault::Exception(code) => ModbusError::exception(function_code, code),
            Fault::Closed => ModbusError::connection(ConnectionError::closed(Some(
                "connection reset by peer".into(),
            ))),
            Fault::Short => unreachable!("short reads are answered, not failed"),
        }
    }
}

// =============================================================================
// MockDevice
// =============================================================================

/// Shared state of the simulated controller.
#[derive(Debug, Default)]
pub struct MockDevice {
    registers: Mutex<HashMap<RegisterSpace, BTreeMap<u16, u16>>>,
    faults: Mutex<HashMap<(RegisterSpace, u16), Fault>>,
    fail_all_reads: Mutex<Option<Fault>>,
    fail_connection: AtomicBool,
    reject_writes: AtomicBool,
    latency: Mutex<Duration>,

    in_flight: AtomicBool,
    overlaps: AtomicU64,
    connect_count: AtomicU64,
    disconnect_count: AtomicU64,
    read_log: Mutex<Vec<(RegisterSpace, u16, u16)>>,
    write_log: Mutex<Vec<(u16, u16)>>,
}

impl MockDevice {
    /// Sets consecutive registers starting at `start`.
    pub fn set_registers(&self, space: RegisterSpace, start: u16, words: &[u16]) {
        let mut registers = self.registers.lock();
        let bank = registers.entry(space).or_default();
        for (offset, word) in words.iter().enumerate() {
            bank.insert(start + offset as u16, *word);
        }
    }

    /// Returns the register value, defaulting to zero.
    pub fn register(&self, space: RegisterSpace, address: u16) -> u16 {
        self.registers
            .lock()
            .get(&space)
            .and_then(|bank| bank.get(&address).copied())
            .unwrap_or(0)
    }

    /// Scripts a fault for the range starting at `start`.
    pub fn fail_range(&self, space: RegisterSpace, start: u16, fault: Fault) {
        self.faults.lock().insert((space, start), fault);
    }

    /// Removes all per-range faults.
    pub fn clear_faults(&self) {
        self.faults.lock().clear();
        *self.fail_all_reads.lock() = None;
    }

    /// Fails every read with `fault`, or stops doing so with `None`.
    pub fn fail_all_reads(&self, fault: Option<Fault>) {
        *self.fail_all_reads.lock() = fault;
    }

    /// Forces connection attempts to fail.
    pub fn fail_connection(&self, fail: bool) {
        self.fail_connection.store(fail, Ordering::SeqCst);
    }

    /// Answers every write with an Illegal Data Value exception.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Sets the simulated response latency.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Requests observed while another request was in flight.
    pub fn overlap_count(&self) -> u64 {
        self.overlaps.load(Ordering::SeqCst)
    }

    /// Returns the connect count.
    pub fn connect_count(&self) -> u64 {
        self.connect_count.load(Ordering::SeqCst)
    }

    /// Returns the disconnect count.
    pub fn disconnect_count(&self) -> u64 {
        self.disconnect_count.load(Ordering::SeqCst)
    }

    /// Returns every range request in order.
    pub fn read_log(&self) -> Vec<(RegisterSpace, u16, u16)> {
        self.read_log.lock().clone()
    }

    /// Returns every `(address, raw)` write in order.
    pub fn write_log(&self) -> Vec<(u16, u16)> {
        self.write_log.lock().clone()
    }

    async fn enter(&self) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn leave(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    fn answer(&self, space: RegisterSpace, start: u16, count: u16) -> ModbusResult<Vec<u16>> {
        self.read_log.lock().push((space, start, count));

        let fault = self
            .fail_all_reads
            .lock()
            .or_else(|| self.faults.lock().get(&(space, start)).copied());

        let words: Vec<u16> = (start..start + count)
            .map(|address| self.register(space, address))
            .collect();

        match fault {
            None => Ok(words),
            Some(Fault::Short) => Ok(words[..words.len() - 1].to_vec()),
            Some(fault) => Err(fault.into_error(space.read_function_code())),
        }
    }
}

// =============================================================================
// MockTransport
// =============================================================================

/// Transport half of the simulated controller.
#[derive(Debug)]
pub struct MockTransport {
    device: Arc<MockDevice>,
    state: TransportState,
}

impl MockTransport {
    /// Creates a transport and the device handle that scripts it.
    pub fn pair() -> (Self, Arc<MockDevice>) {
        let device = Arc::new(MockDevice::default());
        let transport = Self {
            device: Arc::clone(&device),
            state: TransportState::Disconnected,
        };
        (transport, device)
    }

    async fn read(&self, space: RegisterSpace, start: u16, count: u16) -> ModbusResult<Vec<u16>> {
        if !self.state.is_connected() {
            return Err(ModbusError::not_connected());
        }
        self.device.enter().await;
        let result = self.device.answer(space, start, count);
        self.device.leave();
        result
    }
}

#[async_trait]
impl ModbusTransport for MockTransport {
    async fn connect(&mut self) -> ModbusResult<()> {
        if self.state.is_connected() {
            return Ok(());
        }
        if self.device.fail_connection.load(Ordering::SeqCst) {
            self.state = TransportState::Error;
            return Err(ModbusError::connection(ConnectionError::refused(
                "mock-heatpump",
                502,
            )));
        }
        self.device.connect_count.fetch_add(1, Ordering::SeqCst);
        self.state = TransportState::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> ModbusResult<()> {
        if self.state.is_connected() {
            self.device.disconnect_count.fetch_add(1, Ordering::SeqCst);
        }
        self.state = TransportState::Disconnected;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    fn state(&self) -> TransportState {
        self.state
    }

    async fn read_holding_registers(&self, address: u16, count: u16) -> ModbusResult<Vec<u16>> {
        self.read(RegisterSpace::Holding, address, count).await
    }

    async fn read_input_registers(&self, address: u16, count: u16) -> ModbusResult<Vec<u16>> {
        self.read(RegisterSpace::Input, address, count).await
    }

    async fn write_single_register(&self, address: u16, value: u16) -> ModbusResult<()> {
        if !self.state.is_connected() {
            return Err(ModbusError::not_connected());
        }
        self.device.enter().await;
        let result = if self.device.reject_writes.load(Ordering::SeqCst) {
            Err(ModbusError::exception(0x06, 0x03))
        } else {
            self.device.write_log.lock().push((address, value));
            self.device
                .set_registers(RegisterSpace::Holding, address, &[value]);
            Ok(())
        };
        self.device.leave();
        result
    }

    fn display_name(&self) -> String {
        "Mock heat pump (unit 1)".to_string()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Poller settings without pacing so tests do not sleep.
pub fn fast_poller_config() -> PollerConfig {
    PollerConfig::default().with_request_delay(Duration::ZERO)
}

/// Loads a plausible register image: temperatures, setpoints, status and flags.
pub fn load_heat_pump_image(device: &MockDevice) {
    // Supply 21.50, return 18.25, outdoor -3.50, tank 48.00, brine 4.10, brine out 1.00
    device.set_registers(
        RegisterSpace::Input,
        0,
        &[2150, 1825, 65186, 4800, 410, 100],
    );
    // Status 6..=20
    device.set_registers(RegisterSpace::Input, 6, &[1, 0, 1, 0, 0, 3, 40000]);
    device.set_registers(RegisterSpace::Input, 13, &[0, 1, 0, 0, 2, 0, 0, 65535]);
    // Special functions 24..=37
    device.set_registers(RegisterSpace::Holding, 24, &[0, 1, 0, 0, 1, 0]);
    device.set_registers(RegisterSpace::Holding, 30, &[0, 0, 1, 0, 0, 0, 65535, 0]);
    // User settings 38..=56
    device.set_registers(RegisterSpace::Holding, 38, &[4500, 500, 2000, 65036, 0, 1]);
    device.set_registers(RegisterSpace::Holding, 44, &[5500, 200, 0, 0, 1, 0]);
    device.set_registers(RegisterSpace::Holding, 50, &[3000, 0, 0, 1, 0, 0, 7]);
}
