// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the copmax binary.

use copmax_modbus::WriteError;
use thiserror::Error;

/// Result type alias for copmax-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the copmax binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Config source error.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Setpoint write failed.
    #[error("Write failed: {0}")]
    Write(#[from] WriteError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        /// The context description.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Adds context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the exit code for this error.
    ///
    /// A refused write (`5`) and an unreachable device (`6`) get distinct codes
    /// so scripts can tell a bad value from a network problem.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Runtime(_) => 3,
            Self::Io(_) => 4,
            Self::Write(e) if e.is_connection_failure() => 6,
            Self::Write(_) => 5,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with appropriate formatting.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use copmax_modbus::{CodecError, ConnectionError, ModbusError};

    #[test]
    fn test_error_creation() {
        let err = BinError::config("test error");
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_error_with_context() {
        let err = BinError::config("inner error").with_context("outer context");
        assert_eq!(err.to_string(), "outer context: Configuration error: inner error");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::config("test").exit_code(), 1);
        assert_eq!(BinError::runtime("test").exit_code(), 3);
        assert_eq!(BinError::from(std::io::Error::other("disk")).exit_code(), 4);
    }

    #[test]
    fn test_write_exit_codes() {
        let rejected = BinError::from(WriteError::Rejected {
            address: 41,
            source: ModbusError::exception(0x06, 0x03),
        });
        assert_eq!(rejected.exit_code(), 5);

        let unreachable = BinError::from(WriteError::ConnectionFailed {
            address: 41,
            target: "10.0.0.5:502".to_string(),
            source: ModbusError::connection(ConnectionError::refused("10.0.0.5", 502)),
        });
        assert_eq!(unreachable.exit_code(), 6);

        let out_of_range = BinError::from(WriteError::from(CodecError::out_of_range(
            40_000,
            "signed 16-bit",
            -32768,
            32767,
        )));
        assert_eq!(out_of_range.exit_code(), 5);
    }
}
