//! Hardware interface abstraction
//!
//! This module provides the [`BusInterface`] trait and the [`Interface`] struct
//! for talking to power supplies over a shared addressed bus (I2C/PMBus style).
//!
//! ## Hardware Requirements
//!
//! Each power supply exposes two bus addresses:
//! - the telemetry controller at the configured address
//! - the identity storage eight addresses below it
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::i2c::{ErrorType, I2c, Operation};
//! use psu_monitor::{BusInterface, Interface};
//! # use core::convert::Infallible;
//! # struct MockI2c;
//! # impl ErrorType for MockI2c { type Error = Infallible; }
//! # impl I2c for MockI2c {
//! #     fn transaction(
//! #         &mut self,
//! #         _address: u8,
//! #         _operations: &mut [Operation<'_>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! let mut interface = Interface::new(MockI2c);
//!
//! // Select input voltage (register 0x04) on the device at 0x58
//! let _ = interface.send(0x58, &[0x08, 0x48]);
//!
//! // Read the two response bytes
//! let mut response = [0u8; 2];
//! let _ = interface.request(0x58, &mut response);
//! ```

use core::fmt::Debug;
use embedded_hal::i2c::I2c;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Trait for the bus transport shared by all power supplies
///
/// This trait abstracts over different hardware implementations,
/// allowing a [`Psu`](crate::psu::Psu) to work with any transport that can
/// write a short frame to an address and read a fixed number of bytes back.
///
/// ## Implementing
///
/// For most cases, use the provided [`Interface`] struct over an
/// embedded-hal I2C bus. Implement this trait yourself for bit-banged
/// buses, bus multiplexers or test doubles.
pub trait BusInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Write `bytes` to the device at `address`
    ///
    /// A NACK or any non-zero end-of-transmission status must be reported
    /// as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the write was not acknowledged.
    fn send(&mut self, address: u8, bytes: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Read exactly `buffer.len()` bytes from the device at `address`
    ///
    /// A short read must be reported as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the read failed or returned fewer bytes.
    fn request(&mut self, address: u8, buffer: &mut [u8]) -> InterfaceResult<(), Self::Error>;
}

/// Hardware interface implementation over embedded-hal I2C
///
/// ## Type Parameters
///
/// * `I2C` - Bus implementing [`I2c`] with 7-bit addressing
pub struct Interface<I2C> {
    /// Shared bus
    i2c: I2C,
}

impl<I2C> Interface<I2C>
where
    I2C: I2c,
{
    /// Create a new Interface
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Release the underlying bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> BusInterface for Interface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn send(&mut self, address: u8, bytes: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.i2c.write(address, bytes)
    }

    fn request(&mut self, address: u8, buffer: &mut [u8]) -> InterfaceResult<(), Self::Error> {
        self.i2c.read(address, buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    #[derive(Debug, Clone, Copy)]
    struct MockError;

    impl embedded_hal::i2c::Error for MockError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        }
    }

    #[derive(Debug, Default)]
    struct MockI2c {
        writes: alloc::vec::Vec<(u8, alloc::vec::Vec<u8>)>,
        reads: alloc::vec::Vec<(u8, usize)>,
        nack: bool,
    }

    impl ErrorType for MockI2c {
        type Error = MockError;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.nack {
                return Err(MockError);
            }
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buffer) => {
                        self.reads.push((address, buffer.len()));
                        buffer.fill(0xA5);
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_send_writes_frame_to_address() {
        let mut interface = Interface::new(MockI2c::default());
        interface.send(0x58, &[0x08, 0x48]).unwrap();

        let i2c = interface.release();
        assert_eq!(i2c.writes, alloc::vec![(0x58, alloc::vec![0x08, 0x48])]);
    }

    #[test]
    fn test_request_fills_whole_buffer() {
        let mut interface = Interface::new(MockI2c::default());
        let mut buffer = [0u8; 5];
        interface.request(0x50, &mut buffer).unwrap();

        assert_eq!(buffer, [0xA5; 5]);
        assert_eq!(interface.release().reads, alloc::vec![(0x50, 5)]);
    }

    #[test]
    fn test_nack_is_reported() {
        let mut interface = Interface::new(MockI2c {
            nack: true,
            ..MockI2c::default()
        });
        assert!(interface.send(0x58, &[0x00]).is_err());
        assert!(interface.request(0x58, &mut [0u8; 2]).is_err());
    }
}
