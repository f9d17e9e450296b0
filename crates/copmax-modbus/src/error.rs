// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the heat-pump Modbus core.
//!
//! ```text
//! ModbusError
//! ├── Connection    - TCP session could not be established or was lost
//! ├── Protocol      - device answered with a Modbus exception
//! ├── Timeout       - request or connect exceeded its deadline
//! ├── Configuration - invalid settings
//! └── Codec         - register value outside the 16-bit domain
//!
//! WriteError        - outcome of a rejected or undeliverable setpoint write
//! ```
//!
//! Network and protocol failures are contained at the range-read and write
//! boundaries of the poller. Only [`CodecError`] is allowed to propagate as a
//! hard failure, since it means a value that cannot come off a well-formed wire.

use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

// =============================================================================
// ModbusError - Main Error Type
// =============================================================================

/// The main error type for Modbus operations.
#[derive(Debug, Error)]
pub enum ModbusError {
    /// Connection-related errors.
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// Modbus protocol errors (exception responses, malformed replies).
    #[error("{0}")]
    Protocol(#[from] ProtocolError),

    /// Timeout errors.
    #[error("{0}")]
    Timeout(#[from] TimeoutError),

    /// Configuration errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// Register codec errors.
    #[error("{0}")]
    Codec(#[from] CodecError),
}

impl ModbusError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a connection error.
    #[inline]
    pub fn connection(error: ConnectionError) -> Self {
        Self::Connection(error)
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(error: ProtocolError) -> Self {
        Self::Protocol(error)
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(error: TimeoutError) -> Self {
        Self::Timeout(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    /// Creates a not connected error.
    pub fn not_connected() -> Self {
        Self::Connection(ConnectionError::NotConnected)
    }

    /// Creates an exception response error.
    pub fn exception(function_code: u8, exception_code: u8) -> Self {
        Self::Protocol(ProtocolError::exception_response(function_code, exception_code))
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns `true` if the device answered with a Modbus exception.
    ///
    /// Such a device is reachable; it refused the request.
    pub fn is_device_rejection(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::ExceptionResponse { .. }))
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Connection(e) => e.severity(),
            Self::Protocol(e) => e.severity(),
            Self::Timeout(_) => ErrorSeverity::Warning,
            Self::Configuration(_) => ErrorSeverity::Critical,
            Self::Codec(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Protocol(_) => "protocol",
            Self::Timeout(_) => "timeout",
            Self::Configuration(_) => "configuration",
            Self::Codec(_) => "codec",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Connection(e) => e.error_code(),
            Self::Protocol(e) => e.error_code(),
            Self::Timeout(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
            Self::Codec(e) => e.error_code(),
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        let code = self.error_code();

        match self.tracing_level() {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
        }
    }
}

// =============================================================================
// ConnectionError
// =============================================================================

/// Connection-related errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// TCP connection refused.
    #[error("Connection refused to {host}:{port}")]
    Refused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
        /// Underlying error.
        #[source]
        source: Option<io::Error>,
    },

    /// TCP connection timed out.
    #[error("Connection timed out to {host}:{port} after {duration:?}")]
    TimedOut {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
        /// Timeout duration.
        duration: Duration,
    },

    /// DNS resolution failed.
    #[error("Failed to resolve hostname '{hostname}'")]
    DnsResolutionFailed {
        /// The hostname that failed to resolve.
        hostname: String,
        /// Underlying error.
        #[source]
        source: Option<io::Error>,
    },

    /// Connection closed unexpectedly.
    #[error("Connection closed unexpectedly{}", reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Closed {
        /// Reason for closure.
        reason: Option<String>,
    },

    /// Not connected.
    #[error("Not connected to Modbus device")]
    NotConnected,

    /// Generic I/O error.
    #[error("I/O error: {message}")]
    Io {
        /// Error message.
        message: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl ConnectionError {
    /// Creates a connection refused error.
    pub fn refused(host: impl Into<String>, port: u16) -> Self {
        Self::Refused {
            host: host.into(),
            port,
            source: None,
        }
    }

    /// Creates a connection refused error with source.
    pub fn refused_with(host: impl Into<String>, port: u16, source: io::Error) -> Self {
        Self::Refused {
            host: host.into(),
            port,
            source: Some(source),
        }
    }

    /// Creates a connection timed out error.
    pub fn timed_out(host: impl Into<String>, port: u16, duration: Duration) -> Self {
        Self::TimedOut {
            host: host.into(),
            port,
            duration,
        }
    }

    /// Creates a DNS resolution failed error.
    pub fn dns_failed(hostname: impl Into<String>) -> Self {
        Self::DnsResolutionFailed {
            hostname: hostname.into(),
            source: None,
        }
    }

    /// Creates a connection closed error.
    pub fn closed(reason: Option<String>) -> Self {
        Self::Closed { reason }
    }

    /// Creates an I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotConnected | Self::TimedOut { .. } | Self::Closed { .. } => {
                ErrorSeverity::Warning
            }
            _ => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Refused { .. } => ErrorCode::new(1, 1),
            Self::TimedOut { .. } => ErrorCode::new(1, 2),
            Self::DnsResolutionFailed { .. } => ErrorCode::new(1, 3),
            Self::Closed { .. } => ErrorCode::new(1, 8),
            Self::NotConnected => ErrorCode::new(1, 9),
            Self::Io { .. } => ErrorCode::new(1, 10),
        }
    }
}

// =============================================================================
// ProtocolError
// =============================================================================

/// Modbus protocol-level errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Modbus exception response received.
    #[error("Modbus exception: function code {function_code:#04x}, exception {exception_code} ({exception_name})")]
    ExceptionResponse {
        /// The function code that caused the exception.
        function_code: u8,
        /// The exception code.
        exception_code: u8,
        /// Human-readable exception name.
        exception_name: String,
    },

    /// Unexpected response.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Error message.
        message: String,
    },
}

impl ProtocolError {
    /// Creates an exception response error.
    pub fn exception_response(function_code: u8, exception_code: u8) -> Self {
        Self::ExceptionResponse {
            function_code,
            exception_code,
            exception_name: Self::exception_name(exception_code).to_string(),
        }
    }

    /// Creates an unexpected response error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// Returns the human-readable name for an exception code.
    pub fn exception_name(code: u8) -> &'static str {
        match code {
            0x01 => "Illegal Function",
            0x02 => "Illegal Data Address",
            0x03 => "Illegal Data Value",
            0x04 => "Slave Device Failure",
            0x05 => "Acknowledge",
            0x06 => "Slave Device Busy",
            0x08 => "Memory Parity Error",
            0x0A => "Gateway Path Unavailable",
            0x0B => "Gateway Target Device Failed to Respond",
            _ => "Unknown Exception",
        }
    }

    /// Returns the severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ExceptionResponse { exception_code, .. } => match exception_code {
                0x05 | 0x06 => ErrorSeverity::Warning,
                _ => ErrorSeverity::Error,
            },
            Self::UnexpectedResponse { .. } => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ExceptionResponse { exception_code, .. } => ErrorCode::new(2, *exception_code),
            Self::UnexpectedResponse { .. } => ErrorCode::new(2, 28),
        }
    }
}

// =============================================================================
// TimeoutError
// =============================================================================

/// Timeout errors.
#[derive(Debug, Error)]
pub enum TimeoutError {
    /// Read operation timeout.
    #[error("Read operation timed out after {duration:?}")]
    Read {
        /// Timeout duration.
        duration: Duration,
    },

    /// Write operation timeout.
    #[error("Write operation timed out after {duration:?}")]
    Write {
        /// Timeout duration.
        duration: Duration,
    },
}

impl TimeoutError {
    /// Creates a read timeout.
    pub fn read(duration: Duration) -> Self {
        Self::Read { duration }
    }

    /// Creates a write timeout.
    pub fn write(duration: Duration) -> Self {
        Self::Write { duration }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::new(6, 2),
            Self::Write { .. } => ErrorCode::new(6, 3),
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Invalid unit ID.
    #[error("Invalid unit ID: {unit_id} (valid range: 1-247)")]
    InvalidUnitId {
        /// The invalid unit ID.
        unit_id: u8,
    },

    /// Invalid timeout or interval.
    #[error("Invalid duration for '{field}': {duration:?} ({reason})")]
    InvalidDuration {
        /// The offending field.
        field: String,
        /// The invalid duration.
        duration: Duration,
        /// Reason.
        reason: String,
    },

    /// Missing required field.
    #[error("Missing required configuration: {field}")]
    MissingField {
        /// The missing field.
        field: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid unit ID error.
    pub fn invalid_unit_id(unit_id: u8) -> Self {
        Self::InvalidUnitId { unit_id }
    }

    /// Creates an invalid duration error.
    pub fn invalid_duration(
        field: impl Into<String>,
        duration: Duration,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDuration {
            field: field.into(),
            duration,
            reason: reason.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidUnitId { .. } => ErrorCode::new(5, 3),
            Self::InvalidDuration { .. } => ErrorCode::new(5, 5),
            Self::MissingField { .. } => ErrorCode::new(5, 6),
        }
    }
}

// =============================================================================
// CodecError
// =============================================================================

/// A value fell outside the domain of a 16-bit register conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Value outside the accepted range.
    #[error("Value {value} out of range for {target} register ({min}..={max})")]
    OutOfRange {
        /// The offending value.
        value: i64,
        /// Conversion target.
        target: &'static str,
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
    },
}

impl CodecError {
    /// Creates an out-of-range error.
    pub fn out_of_range(value: i64, target: &'static str, min: i64, max: i64) -> Self {
        Self::OutOfRange {
            value,
            target,
            min,
            max,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::new(4, 5)
    }
}

// =============================================================================
// WriteError
// =============================================================================

/// Failure of a single setpoint write.
///
/// `Rejected` and `ConnectionFailed` stay distinct: the first means the
/// device refused the value, the second that it could not be reached.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The device answered with a Modbus exception.
    #[error("Device rejected write to holding register {address}: {source}")]
    Rejected {
        /// Target register address.
        address: u16,
        /// The exception returned by the device.
        #[source]
        source: ModbusError,
    },

    /// The session could not be established or the request did not complete.
    #[error("Could not write holding register {address} on {target}: {source}")]
    ConnectionFailed {
        /// Target register address.
        address: u16,
        /// Transport display name.
        target: String,
        /// Underlying failure.
        #[source]
        source: ModbusError,
    },

    /// The scaled value does not fit a signed 16-bit register.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl WriteError {
    /// Returns the integer sentinel used by callers that expect a numeric status.
    ///
    /// `-2` when the device rejected the value, `-1` when it could not be reached.
    /// Codec errors never reach the wire and also map to `-2`.
    pub fn sentinel(&self) -> i32 {
        match self {
            Self::Rejected { .. } | Self::Codec(_) => -2,
            Self::ConnectionFailed { .. } => -1,
        }
    }

    /// Returns `true` if the device was reached and refused the request.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Returns `true` if the device could not be reached.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Warning - action may be required.
    Warning,
    /// Error - action required, but recoverable.
    Error,
    /// Critical - immediate action required.
    Critical,
}

impl ErrorSeverity {
    /// Converts to tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Structured error code for categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category (1=connection, 2=protocol, 4=codec, 5=config, 6=timeout).
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MB-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// A Result type with ModbusError.
pub type ModbusResult<T> = Result<T, ModbusError>;

// =============================================================================
// Tests
// =============================================================================
