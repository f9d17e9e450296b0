// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Modbus TCP transport implementation.
//!
//! Thin wrapper over `tokio-modbus` that bounds every network call with the
//! configured timeouts and maps failures into [`ModbusError`].

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_modbus::client::{Context as ModbusContext, Reader, Writer};
use tokio_modbus::prelude::*;
use tokio_modbus::{Error as TokioModbusError, ExceptionCode};

use crate::error::{ConnectionError, ModbusError, ModbusResult, ProtocolError, TimeoutError};
use crate::types::{ModbusTcpConfig, RegisterSpace};

use super::transport::{ModbusTransport, TransportState};

// =============================================================================
// ModbusTcpTransport
// =============================================================================

/// Modbus TCP transport using tokio-modbus.
///
/// # Example
///
/// ```rust,ignore
/// use copmax_modbus::client::{ModbusTcpTransport, ModbusTransport};
/// use copmax_modbus::types::ModbusTcpConfig;
///
/// let config = ModbusTcpConfig::builder()
///     .host("192.168.1.50")
///     .build()?;
///
/// let mut transport = ModbusTcpTransport::new(config);
/// transport.connect().await?;
///
/// let temps = transport.read_input_registers(0, 6).await?;
/// ```
pub struct ModbusTcpTransport {
    config: ModbusTcpConfig,
    inner: Arc<Mutex<TcpTransportInner>>,
    state: TransportState,
}

struct TcpTransportInner {
    context: Option<ModbusContext>,
}

impl ModbusTcpTransport {
    /// Creates a new TCP transport with the given configuration.
    pub fn new(config: ModbusTcpConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(TcpTransportInner { context: None })),
            state: TransportState::Disconnected,
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &ModbusTcpConfig {
        &self.config
    }

    async fn resolve_address(&self) -> ModbusResult<SocketAddr> {
        let addr_str = self.config.socket_addr();

        if let Ok(addr) = addr_str.parse::<SocketAddr>() {
            return Ok(addr);
        }

        let mut addrs = tokio::net::lookup_host(&addr_str).await.map_err(|e| {
            ModbusError::connection(ConnectionError::DnsResolutionFailed {
                hostname: self.config.host.clone(),
                source: Some(e),
            })
        })?;

        addrs
            .next()
            .ok_or_else(|| ModbusError::connection(ConnectionError::dns_failed(&self.config.host)))
    }

    fn map_modbus_error(&self, error: TokioModbusError, operation: &str) -> ModbusError {
        match error {
            TokioModbusError::Transport(io_error) => {
                use std::io::ErrorKind;
                match io_error.kind() {
                    ErrorKind::ConnectionRefused => ModbusError::connection(
                        ConnectionError::refused(&self.config.host, self.config.port),
                    ),
                    ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof => {
                        ModbusError::connection(ConnectionError::closed(Some(io_error.to_string())))
                    }
                    ErrorKind::TimedOut => {
                        ModbusError::timeout(TimeoutError::read(self.config.operation_timeout))
                    }
                    ErrorKind::NotConnected => ModbusError::not_connected(),
                    _ => ModbusError::connection(ConnectionError::io(operation, io_error)),
                }
            }
            TokioModbusError::Protocol(protocol_error) => ModbusError::protocol(
                ProtocolError::unexpected(format!("{operation}: {protocol_error}")),
            ),
        }
    }

    fn exception_code_to_u8(code: &ExceptionCode) -> u8 {
        match code {
            ExceptionCode::IllegalFunction => 0x01,
            ExceptionCode::IllegalDataAddress => 0x02,
            ExceptionCode::IllegalDataValue => 0x03,
            ExceptionCode::ServerDeviceFailure => 0x04,
            ExceptionCode::Acknowledge => 0x05,
            ExceptionCode::ServerDeviceBusy => 0x06,
            ExceptionCode::MemoryParityError => 0x08,
            ExceptionCode::GatewayPathUnavailable => 0x0A,
            ExceptionCode::GatewayTargetDevice => 0x0B,
            _ => 0xFF,
        }
    }

    fn map_exception(function_code: u8, exception: ExceptionCode) -> ModbusError {
        ModbusError::exception(function_code, Self::exception_code_to_u8(&exception))
    }

    async fn read_space(
        &self,
        space: RegisterSpace,
        address: u16,
        count: u16,
    ) -> ModbusResult<Vec<u16>> {
        let mut inner = self.inner.lock().await;
        let ctx = inner.context.as_mut().ok_or_else(ModbusError::not_connected)?;

        let operation_timeout = self.config.operation_timeout;
        let response = match space {
            RegisterSpace::Holding => {
                timeout(operation_timeout, ctx.read_holding_registers(address, count)).await
            }
            RegisterSpace::Input => {
                timeout(operation_timeout, ctx.read_input_registers(address, count)).await
            }
        };

        let words = response
            .map_err(|_| ModbusError::timeout(TimeoutError::read(operation_timeout)))?
            .map_err(|e| self.map_modbus_error(e, "read registers"))?
            .map_err(|e| Self::map_exception(space.read_function_code(), e))?;

        tracing::debug!(
            space = %space,
            address,
            count,
            received = words.len(),
            "Read registers"
        );

        Ok(words)
    }

    async fn write_space(
        &self,
        space: RegisterSpace,
        address: u16,
        value: u16,
    ) -> ModbusResult<()> {
        let function_code = space.write_single_function_code().ok_or_else(|| {
            ModbusError::protocol(ProtocolError::unexpected(format!(
                "{} registers are read-only",
                space.short_name()
            )))
        })?;

        let mut inner = self.inner.lock().await;
        let ctx = inner.context.as_mut().ok_or_else(ModbusError::not_connected)?;

        timeout(
            self.config.operation_timeout,
            ctx.write_single_register(address, value),
        )
        .await
        .map_err(|_| ModbusError::timeout(TimeoutError::write(self.config.operation_timeout)))?
        .map_err(|e| self.map_modbus_error(e, "write_single_register"))?
        .map_err(|e| Self::map_exception(function_code, e))?;

        Ok(())
    }
}

#[async_trait]
impl ModbusTransport for ModbusTcpTransport {
    async fn connect(&mut self) -> ModbusResult<()> {
        if self.state == TransportState::Connected {
            return Ok(());
        }

        self.state = TransportState::Connecting;

        let connect_future = async {
            let socket_addr = self.resolve_address().await?;

            let stream = TcpStream::connect(socket_addr).await.map_err(|e| {
                ModbusError::connection(ConnectionError::refused_with(
                    &self.config.host,
                    self.config.port,
                    e,
                ))
            })?;

            if let Err(e) = stream.set_nodelay(self.config.tcp_nodelay) {
                tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
            }

            Ok::<_, ModbusError>(tcp::attach_slave(stream, Slave(self.config.unit_id)))
        };

        let result = timeout(self.config.connect_timeout, connect_future)
            .await
            .map_err(|_| {
                ModbusError::connection(ConnectionError::timed_out(
                    &self.config.host,
                    self.config.port,
                    self.config.connect_timeout,
                ))
            })
            .and_then(std::convert::identity);

        let ctx = match result {
            Ok(ctx) => ctx,
            Err(e) => {
                self.state = TransportState::Error;
                return Err(e);
            }
        };

        self.inner.lock().await.context = Some(ctx);

        self.state = TransportState::Connected;

        tracing::info!(
            host = %self.config.host,
            port = self.config.port,
            unit_id = self.config.unit_id,
            "Connected to Modbus TCP device"
        );

        Ok(())
    }

    async fn disconnect(&mut self) -> ModbusResult<()> {
        let mut inner = self.inner.lock().await;

        if let Some(mut ctx) = inner.context.take() {
            if let Err(e) = ctx.disconnect().await {
                tracing::warn!(error = %e, "Error disconnecting from Modbus device");
            }
        }

        drop(inner);
        self.state = TransportState::Disconnected;

        tracing::debug!(
            host = %self.config.host,
            port = self.config.port,
            "Disconnected from Modbus TCP device"
        );

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state == TransportState::Connected
    }

    fn state(&self) -> TransportState {
        self.state
    }

    async fn read_holding_registers(&self, address: u16, count: u16) -> ModbusResult<Vec<u16>> {
        self.read_space(RegisterSpace::Holding, address, count).await
    }

    async fn read_input_registers(&self, address: u16, count: u16) -> ModbusResult<Vec<u16>> {
        self.read_space(RegisterSpace::Input, address, count).await
    }

    async fn write_single_register(&self, address: u16, value: u16) -> ModbusResult<()> {
        self.write_space(RegisterSpace::Holding, address, value).await
    }

    fn display_name(&self) -> String {
        format!(
            "Modbus TCP {}:{} (unit {})",
            self.config.host, self.config.port, self.config.unit_id
        )
    }
}

impl std::fmt::Debug for ModbusTcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModbusTcpTransport")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("unit_id", &self.config.unit_id)
            .field("state", &self.state)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn local() -> ModbusTcpTransport {
        ModbusTcpTransport::new(ModbusTcpConfig::with_port("127.0.0.1", 502))
    }

    #[test]
    fn test_new_transport() {
        let transport = local();
        assert_eq!(transport.config().host, "127.0.0.1");
        assert_eq!(transport.config().port, 502);
        assert_eq!(transport.state(), TransportState::Disconnected);
    }

    #[test]
    fn test_display_name() {
        let config = ModbusTcpConfig::builder()
            .host("heatpump.local")
            .port(502)
            .unit_id(1)
            .build()
            .unwrap();
        let transport = ModbusTcpTransport::new(config);
        assert_eq!(
            transport.display_name(),
            "Modbus TCP heatpump.local:502 (unit 1)"
        );
    }

    #[test]
    fn test_exception_mapping_keeps_function_code() {
        let function_code = RegisterSpace::Holding.write_single_function_code().unwrap();
        let err = ModbusTcpTransport::map_exception(function_code, ExceptionCode::IllegalDataValue);
        match err {
            ModbusError::Protocol(ProtocolError::ExceptionResponse {
                function_code,
                exception_code,
                ..
            }) => {
                assert_eq!(function_code, 0x06);
                assert_eq!(exception_code, 0x03);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_write_input_register_is_refused() {
        let err = local()
            .write_space(RegisterSpace::Input, 0, 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Protocol(ProtocolError::UnexpectedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_write_without_connection() {
        let err = local().write_single_register(41, 450).await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Connection(ConnectionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_read_without_connection() {
        let transport = local();
        let err = transport.read_input_registers(0, 6).await.unwrap_err();
        assert!(matches!(
            err,
            ModbusError::Connection(ConnectionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_connect_refused_sets_error_state() {
        let config = ModbusTcpConfig::builder()
            .host("127.0.0.1")
            .port(1)
            .connect_timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        let mut transport = ModbusTcpTransport::new(config);

        assert!(transport.connect().await.is_err());
        assert_eq!(transport.state(), TransportState::Error);
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_debug_impl() {
        let transport = local();
        let debug_str = format!("{:?}", transport);
        assert!(debug_str.contains("127.0.0.1"));
        assert!(debug_str.contains("502"));
    }
}
