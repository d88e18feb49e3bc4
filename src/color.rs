//! Panel colors
//!
//! Colors are stored as packed RGB565, the native format of the small TFT
//! panels this crate targets.
//!
//! | Color | R   | G   | B   | RGB565 |
//! |-------|-----|-----|-----|--------|
//! | Black | 0   | 0   | 0   | 0x0000 |
//! | Gray  | 50  | 50  | 50  | 0x3186 |
//! | Red   | 255 | 0   | 0   | 0xF800 |
//! | White | 255 | 255 | 255 | 0xFFFF |
//!
//! ## Example
//!
//! ```
//! use psu_monitor::Color;
//!
//! assert_eq!(Color::RED.raw(), 0xF800);
//! assert_eq!(Color::rgb(255, 255, 255), Color::WHITE);
//! ```

/// RGB565 color
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Color(u16);

impl Color {
    /// Black text
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Banner background
    pub const GRAY: Self = Self::rgb(50, 50, 50);
    /// Error tile background
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Tile background
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Pack 8-bit channels into RGB565, dropping the low bits
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3))
    }

    /// Create a color from a packed RGB565 value
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Packed RGB565 value
    pub const fn raw(self) -> u16 {
        self.0
    }
}

#[cfg(feature = "graphics")]
impl From<Color> for embedded_graphics_core::pixelcolor::Rgb565 {
    fn from(color: Color) -> Self {
        embedded_graphics_core::pixelcolor::raw::RawU16::new(color.raw()).into()
    }
}
