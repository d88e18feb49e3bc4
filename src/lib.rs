//! Power Supply Monitor
//!
//! A driver for the telemetry controller of bus-attached server power supplies,
//! plus flicker-free text panels for showing the readings on a small display.
//!
//! ## Features
//!
//! - `no_std` compatible, no allocation
//! - `embedded-hal` v1.0 I2C support
//! - Checksummed register requests, 16- and 32-bit values, per-device link state
//! - Identity strings (manufacturer, model, date, serials) from the co-located EEPROM
//! - Text fields that repaint only what changed
//! - Summary tile and detail screen layouts
//! - `embedded-graphics` integration (with `graphics` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::i2c::{ErrorType, I2c, Operation};
//! use psu_monitor::{Builder, Interface, Psu, Reading};
//!
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
//! # let i2c = MockI2c;
//! let config = match Builder::new().address(0x58).log_readings(true).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut psu = Psu::new(Interface::new(i2c), config);
//! if psu.fetch_identity() {
//!     if let Ok(Reading::Valid(volts)) = psu.voltage_in() {
//!         let _ = volts;
//!     }
//! }
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

/// Drawing surface abstraction
pub mod canvas;
/// Request framing and value decoding
pub mod codec;
/// Panel colors
pub mod color;
/// Session configuration types and builder
pub mod config;
/// Error types for the driver
pub mod error;
/// Value formatting for panel fields
pub mod format;
/// Hardware interface abstraction
pub mod interface;
/// Polling channel combining a session and a tile
pub mod monitor;
/// Power supply session
pub mod psu;
/// Register map
pub mod register;
/// Flicker-free text fields
pub mod text;
/// Panel layouts
pub mod views;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use canvas::{Canvas, Region, TextStyle};
pub use codec::Reading;
pub use color::Color;
pub use config::{Builder, Config};
pub use error::{BuilderError, Error, MAX_ADDRESS, MAX_REGISTER};
pub use interface::{BusInterface, Interface};
pub use monitor::{Channel, detail_values, show_detail};
pub use psu::{Identity, Psu, Telemetry};
pub use register::{Quantity, identity_address};
pub use text::{FIELD_CAPACITY, TextField};
pub use views::{DETAIL_LABELS, DetailScreen, PanelState, SummaryTile, draw_banner};

#[cfg(feature = "graphics")]
pub use graphics::GraphicCanvas;
