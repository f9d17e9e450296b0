// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Abstract transport layer for Modbus communication.
//!
//! This module defines the [`ModbusTransport`] trait, the only contract the
//! poller needs from the network: connect, read a register range, write one
//! holding register.

use async_trait::async_trait;
use std::fmt;

use crate::error::ModbusResult;
use crate::types::RegisterSpace;

// =============================================================================
// TransportState
// =============================================================================

/// Connection state of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportState {
    /// Transport is disconnected.
    #[default]
    Disconnected,
    /// Transport is connecting.
    Connecting,
    /// Transport is connected and ready.
    Connected,
    /// The last connect attempt failed.
    Error,
}

impl TransportState {
    /// Returns `true` if the transport is connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// ModbusTransport Trait
// =============================================================================

/// Abstract transport layer for Modbus communication.
///
/// # Implementors
///
/// - [`ModbusTcpTransport`](super::tcp::ModbusTcpTransport): Modbus TCP transport
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Connection management takes
/// `&mut self`; the poller serialises all access behind one async mutex.
///
/// # Example
///
/// ```rust,ignore
/// use copmax_modbus::client::ModbusTransport;
///
/// async fn read_temps<T: ModbusTransport>(transport: &T) -> ModbusResult<Vec<u16>> {
///     transport.read_input_registers(0, 6).await
/// }
/// ```
#[async_trait]
pub trait ModbusTransport: Send + Sync {
    // =========================================================================
    // Connection Management
    // =========================================================================

    /// Establishes a connection to the Modbus device.
    ///
    /// Calling this on a connected transport is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    async fn connect(&mut self) -> ModbusResult<()>;

    /// Disconnects from the Modbus device.
    async fn disconnect(&mut self) -> ModbusResult<()>;

    /// Returns `true` if the transport is connected.
    fn is_connected(&self) -> bool;

    /// Returns the current transport state.
    fn state(&self) -> TransportState;

    // =========================================================================
    // Register Operations
    // =========================================================================

    /// Reads holding registers (FC 03).
    async fn read_holding_registers(&self, address: u16, count: u16) -> ModbusResult<Vec<u16>>;

    /// Reads input registers (FC 04).
    async fn read_input_registers(&self, address: u16, count: u16) -> ModbusResult<Vec<u16>>;

    /// Writes a single holding register (FC 06).
    async fn write_single_register(&self, address: u16, value: u16) -> ModbusResult<()>;

    /// Reads `count` registers from `space`.
    async fn read_registers(
        &self,
        space: RegisterSpace,
        address: u16,
        count: u16,
    ) -> ModbusResult<Vec<u16>> {
        match space {
            RegisterSpace::Holding => self.read_holding_registers(address, count).await,
            RegisterSpace::Input => self.read_input_registers(address, count).await,
        }
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Returns a display name for this transport.
    fn display_name(&self) -> String;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_state() {
        assert!(TransportState::Connected.is_connected());
        assert!(!TransportState::Disconnected.is_connected());
        assert!(!TransportState::Error.is_connected());
        assert_eq!(TransportState::default(), TransportState::Disconnected);
    }

    #[test]
    fn test_transport_state_display() {
        assert_eq!(TransportState::Connected.to_string(), "connected");
        assert_eq!(TransportState::Disconnected.to_string(), "disconnected");
    }
}
