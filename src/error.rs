//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and telemetry operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors while talking to a power supply
//!
//! Rendering errors are not wrapped here: every drawing call returns the
//! [`Canvas::Error`](crate::canvas::Canvas::Error) of the surface it draws on.
//!
//! ## Example
//!
//! ```
//! use psu_monitor::{Builder, BuilderError};
//!
//! // Missing address
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingAddress)));
//!
//! // Identity storage sits 8 below the device, so 0x05 cannot be valid
//! let result = Builder::new().address(0x05).build();
//! assert!(matches!(result, Err(BuilderError::InvalidAddress { address: 0x05 })));
//! ```

/// Highest register number that still fits the one-byte request (`register << 1`)
pub const MAX_REGISTER: u8 = 0x7F;

/// Highest 7-bit bus address
pub const MAX_ADDRESS: u8 = 0x7F;

/// Errors that can occur when reading a power supply
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Error {
    /// The device is not reachable
    ///
    /// Returned by the read that hit a transport failure and by every later
    /// read until [`Psu::fetch_identity`](crate::psu::Psu::fetch_identity)
    /// succeeds again. The transport is not touched while disconnected.
    Disconnected,
    /// Register cannot be encoded in a request frame
    ///
    /// The request byte is `register << 1`, so registers above
    /// [`MAX_REGISTER`] would be truncated on the wire.
    InvalidRegister {
        /// Register that was requested
        register: u8,
    },
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Device disconnected"),
            Self::InvalidRegister { register } => {
                write!(f, "Invalid register 0x{register:02X} (max 0x{MAX_REGISTER:02X})")
            }
        }
    }
}

impl core::error::Error for Error {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the session is created.
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// Address was not specified
    ///
    /// [`Builder::address()`](crate::config::Builder::address) must be called before building.
    MissingAddress,
    /// Invalid bus address provided
    ///
    /// Addresses must be 7-bit and leave room for the identity storage
    /// eight addresses below.
    InvalidAddress {
        /// Address requested
        address: u8,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingAddress => write!(f, "Address must be specified"),
            Self::InvalidAddress { address } => write!(
                f,
                "Invalid address 0x{address:02X} (must be 0x08..=0x{MAX_ADDRESS:02X})"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
