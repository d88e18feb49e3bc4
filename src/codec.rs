//! Telemetry request framing and value decoding
//!
//! A register read is a two-byte write followed by a two-byte read:
//!
//! | Byte | Request                   | Response        |
//! |------|---------------------------|-----------------|
//! | 0    | `register << 1`           | value LSB       |
//! | 1    | checksum                  | value MSB       |
//!
//! The checksum is the two's complement of `(register << 1) + (address << 1)`
//! truncated to a byte, so the doubled address plus both request bytes sum
//! to zero modulo 256.
//!
//! ## Example
//!
//! ```
//! use psu_monitor::codec::{checksum, frame_is_valid, request_frame};
//!
//! let frame = request_frame(0x04, 0x58);
//! assert_eq!(frame, [0x08, checksum(0x04, 0x58)]);
//! assert!(frame_is_valid(frame, 0x58));
//! ```

/// Checksum byte for a request of `register` sent to `address`
///
/// Computed as `((0xFF - ((register << 1) + (address << 1))) + 1) mod 256`.
pub const fn checksum(register: u8, address: u8) -> u8 {
    let sum = (register << 1).wrapping_add(address << 1);
    (0xFF - sum).wrapping_add(1)
}

/// Build the two-byte request selecting `register` on the device at `address`
pub const fn request_frame(register: u8, address: u8) -> [u8; 2] {
    [register << 1, checksum(register, address)]
}

/// Validate a request frame the way the device does
pub const fn frame_is_valid(frame: [u8; 2], address: u8) -> bool {
    (address << 1).wrapping_add(frame[0]).wrapping_add(frame[1]) == 0
}

/// Assemble a signed 16-bit word from the response bytes
pub const fn assemble_16(lsb: u8, msb: u8) -> i16 {
    i16::from_le_bytes([lsb, msb])
}

/// Assemble a 32-bit value from a low and a high register word
pub const fn assemble_32(low: i16, high: i16) -> i32 {
    ((high as i32) << 16) | (low as u16 as i32)
}

/// Result of decoding a raw register value
///
/// The hardware reports failures as negative raw words. None of the polled
/// quantities can legitimately be negative, so a negative raw value is kept
/// apart as [`Reading::Invalid`] instead of being scaled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reading<T = f32> {
    /// Physical value in the quantity's unit
    Valid(T),
    /// Negative raw value reported by the device, unscaled
    Invalid(i32),
}

impl<T: Copy> Reading<T> {
    /// Physical value, if the reading is valid
    pub fn value(&self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(*value),
            Self::Invalid(_) => None,
        }
    }

    /// Whether the device reported a usable value
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Convert the physical value, keeping the error sentinel as is
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        match self {
            Self::Valid(value) => Reading::Valid(f(value)),
            Self::Invalid(raw) => Reading::Invalid(raw),
        }
    }
}

/// Convert a raw value into a [`Reading`] by dividing by `divisor`
pub fn scale(raw: i32, divisor: f32) -> Reading {
    if raw < 0 {
        return Reading::Invalid(raw);
    }
    Reading::Valid(raw as f32 / divisor)
}
