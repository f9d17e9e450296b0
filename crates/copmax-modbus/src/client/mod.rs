// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus transports.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ModbusPoller                             │
//! │           (poll sequence, group state, setpoint writes)         │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
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

mod tcp;
mod transport;

pub use tcp::ModbusTcpTransport;
pub use transport::{ModbusTransport, TransportState};
