//! Power supply register map
//!
//! Telemetry registers are 16-bit words read through a checksummed request
//! (see [`codec`](crate::codec)). Each physical quantity is described by a
//! [`Quantity`]: the register, the divisor that converts the raw word into
//! the physical unit, and the unit and label used in log output.
//!
//! A negative scale marks a 32-bit quantity spread over `register` (low word)
//! and `register + 1` (high word); the divisor is then `|scale|`.
//!
//! ## Example
//!
//! ```
//! use psu_monitor::register::{self, identity_address};
//!
//! assert_eq!(register::INPUT_VOLTAGE.register, 0x04);
//! assert!(register::ENERGY_CONSUMED.is_wide());
//!
//! // Identity storage lives eight addresses below the telemetry controller
//! assert_eq!(identity_address(0x58), 0x50);
//! ```

/// Description of one telemetry quantity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantity {
    /// First (or only) register holding the raw value
    pub register: u8,
    /// Divisor to the physical unit; negative selects 32-bit assembly
    pub scale: f32,
    /// Unit suffix used in log output
    pub unit: &'static str,
    /// Human readable label used in log output
    pub label: &'static str,
}

impl Quantity {
    /// Whether the quantity spans two registers
    pub fn is_wide(&self) -> bool {
        self.scale < 0.0
    }
}

// Telemetry quantities

/// Input (mains) voltage, 1/32 V per LSB
pub const INPUT_VOLTAGE: Quantity = Quantity {
    register: 0x04,
    scale: 32.0,
    unit: "V",
    label: "Input voltage",
};

/// Output voltage, 1/256 V per LSB
pub const OUTPUT_VOLTAGE: Quantity = Quantity {
    register: 0x07,
    scale: 256.0,
    unit: "V",
    label: "Output voltage",
};

/// Input current, 1/128 A per LSB
pub const INPUT_CURRENT: Quantity = Quantity {
    register: 0x05,
    scale: 128.0,
    unit: "A",
    label: "Input current",
};

/// Output current, 1/128 A per LSB
pub const OUTPUT_CURRENT: Quantity = Quantity {
    register: 0x08,
    scale: 128.0,
    unit: "A",
    label: "Output current",
};

/// Input power, 1/2 W per LSB
pub const INPUT_POWER: Quantity = Quantity {
    register: 0x06,
    scale: 2.0,
    unit: "W",
    label: "Input power",
};

/// Output power, 1/2 W per LSB
pub const OUTPUT_POWER: Quantity = Quantity {
    register: 0x09,
    scale: 2.0,
    unit: "W",
    label: "Output power",
};

/// Intake air temperature, 1/64 °C per LSB
pub const INTAKE_TEMPERATURE: Quantity = Quantity {
    register: 0x0D,
    scale: 64.0,
    unit: "°C",
    label: "Temp (intake)",
};

/// Internal temperature, 1/64 °C per LSB
pub const INTERNAL_TEMPERATURE: Quantity = Quantity {
    register: 0x0E,
    scale: 64.0,
    unit: "°C",
    label: "Temp (internal)",
};

/// Fan speed in rpm
pub const FAN_SPEED: Quantity = Quantity {
    register: 0x0F,
    scale: 1.0,
    unit: "rpm",
    label: "Fan speed",
};

/// Time since power-on, 1/2 s per LSB
pub const UPTIME: Quantity = Quantity {
    register: 0x18,
    scale: 2.0,
    unit: "s",
    label: "Seconds since startup",
};

/// Energy consumed since power-on (32-bit, registers 0x16/0x17)
///
/// The device counts in 1/4 W·s; dividing by 4 × 3600 yields Wh.
pub const ENERGY_CONSUMED: Quantity = Quantity {
    register: 0x16,
    scale: -4.0 * 3600.0,
    unit: "Wh",
    label: "Energy consumed",
};

/// All telemetry quantities in polling order
pub const TELEMETRY: [Quantity; 11] = [
    INPUT_VOLTAGE,
    OUTPUT_VOLTAGE,
    INPUT_CURRENT,
    OUTPUT_CURRENT,
    INPUT_POWER,
    OUTPUT_POWER,
    INTAKE_TEMPERATURE,
    INTERNAL_TEMPERATURE,
    FAN_SPEED,
    UPTIME,
    ENERGY_CONSUMED,
];

// Identity storage

/// Offset between the telemetry controller and its identity storage
///
/// Hardware convention: the identity EEPROM answers at `address - 8`.
pub const IDENTITY_ADDRESS_OFFSET: u8 = 8;

/// Address of the identity storage belonging to the device at `address`
pub const fn identity_address(address: u8) -> u8 {
    address.wrapping_sub(IDENTITY_ADDRESS_OFFSET)
}

/// Location of one identity string in the identity storage
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdentityField {
    /// Start offset in the storage
    pub register: u8,
    /// Length in bytes
    pub length: usize,
}

/// Manufacturer name (5 bytes at 0x2C)
pub const MANUFACTURER: IdentityField = IdentityField {
    register: 0x2C,
    length: 5,
};

/// Product name (26 bytes at 0x32)
pub const NAME: IdentityField = IdentityField {
    register: 0x32,
    length: 26,
};

/// Manufacturing date (8 bytes at 0x1D)
pub const MFG_DATE: IdentityField = IdentityField {
    register: 0x1D,
    length: 8,
};

/// CT serial number (14 bytes at 0x5B)
pub const SERIAL_CT: IdentityField = IdentityField {
    register: 0x5B,
    length: 14,
};

/// Spare part number (10 bytes at 0x12)
pub const SERIAL_SPN: IdentityField = IdentityField {
    register: 0x12,
    length: 10,
};
