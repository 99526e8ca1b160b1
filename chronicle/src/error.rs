//! Error types for chronicle.
//!
//! Every failure is a single [`Error`] value carrying a numeric code (via its
//! [`ErrorKind`]), the operation that raised it and free-form detail such as
//! the offending output line or the mismatched identifier.

use std::fmt;

use thiserror::Error;

/// Classification of a chronicle failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Settings supplied by the caller are unusable.
    InvalidSettings,

    /// Session reported disconnected at an unexpected point.
    Unknown,

    /// Session/channel setup, or a transport read/write, was rejected.
    SessionFailed,

    /// The network-level connect did not complete.
    ConnectionFailed,

    /// The device reported an error for a command.
    CommandFailed,

    /// A driver module could not be resolved or did not produce a driver.
    DeviceFactoryFailed,

    /// The device id does not match the driver.
    InvalidDeviceId,

    /// The vendor id does not match the driver.
    InvalidVendorId,

    /// The fetch was cancelled by the caller.
    Cancelled,

    /// The inventory has no record for the requested device.
    DeviceNotFound,
}

impl ErrorKind {
    /// Stable numeric code for this kind.
    pub fn code(self) -> u32 {
        match self {
            ErrorKind::InvalidSettings => 100,
            ErrorKind::Unknown => 200,
            ErrorKind::SessionFailed => 202,
            ErrorKind::ConnectionFailed => 203,
            ErrorKind::CommandFailed => 204,
            ErrorKind::Cancelled => 205,
            ErrorKind::DeviceFactoryFailed => 300,
            ErrorKind::InvalidDeviceId => 301,
            ErrorKind::InvalidVendorId => 302,
            ErrorKind::DeviceNotFound => 15003,
        }
    }

    /// Human-readable description of this kind.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::InvalidSettings => "Invalid engine settings",
            ErrorKind::Unknown => "Unknown ssh error",
            ErrorKind::SessionFailed => "Failed creating an SSH session",
            ErrorKind::ConnectionFailed => "Could not connect to host",
            ErrorKind::CommandFailed => "Command failed",
            ErrorKind::Cancelled => "Fetch cancelled",
            ErrorKind::DeviceFactoryFailed => "Error while getting device operations",
            ErrorKind::InvalidDeviceId => "Wrong device ID provided",
            ErrorKind::InvalidVendorId => "Wrong vendor ID provided",
            ErrorKind::DeviceNotFound => "Device not found in inventory",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Main error type for chronicle operations.
#[derive(Error, Debug)]
#[error("[{code}] {kind} in {operation}: {detail}", code = .kind.code())]
pub struct Error {
    kind: ErrorKind,
    operation: &'static str,
    detail: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error.
    pub fn new(kind: ErrorKind, operation: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            operation,
            detail: detail.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub(crate) fn session(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionFailed, operation, detail)
    }

    pub(crate) fn command(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::CommandFailed, operation, detail)
    }

    pub(crate) fn factory(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeviceFactoryFailed, operation, detail)
    }

    /// The failure classification.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Numeric code of the failure classification.
    pub fn code(&self) -> u32 {
        self.kind.code()
    }

    /// Name of the operation that failed.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Contextual detail (offending line, mismatched id, transport message).
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Result type alias using chronicle's Error.
pub type Result<T> = std::result::Result<T, Error>;
