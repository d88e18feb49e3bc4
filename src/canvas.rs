//! Drawing surface abstraction
//!
//! The panel views only need a handful of primitives from the display:
//! filled rectangles, fixed-position text and text measurement. The
//! [`Canvas`] trait captures exactly those, so views can be driven by any
//! display (see [`GraphicCanvas`](crate::graphics::GraphicCanvas) for the
//! embedded-graphics backend) or by a recording double in tests.
//!
//! ## Text cells
//!
//! Text is drawn in character cells of a fixed-width font, scaled by an
//! integer text size. With a background color the whole cell is painted,
//! which lets a string of equal or greater length overwrite the previous
//! one in place. Without a background only the glyph pixels are touched.

use crate::color::Color;

type CanvasResult<E> = core::result::Result<(), E>;

/// Rectangular screen area in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    /// X coordinate of the top-left corner
    pub x: u16,
    /// Y coordinate of the top-left corner
    pub y: u16,
    /// Width in pixels
    pub w: u16,
    /// Height in pixels
    pub h: u16,
}

impl Region {
    /// Create a new region
    #[allow(clippy::many_single_char_names)]
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }
}

/// How a string is drawn
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Integer magnification of the base font (1 = native size)
    pub size: u8,
    /// Glyph color
    pub foreground: Color,
    /// Cell color; `None` leaves non-glyph pixels untouched
    pub background: Option<Color>,
}

impl TextStyle {
    /// Glyphs only, transparent cells
    pub const fn transparent(size: u8, foreground: Color) -> Self {
        Self {
            size,
            foreground,
            background: None,
        }
    }

    /// Glyphs on opaque cells
    pub const fn opaque(size: u8, foreground: Color, background: Color) -> Self {
        Self {
            size,
            foreground,
            background: Some(background),
        }
    }
}

/// Display primitive consumed by the text fields and views
pub trait Canvas {
    /// Error type for drawing operations
    type Error: core::fmt::Debug;

    /// Fill `region` with `color`, clipped to the screen
    fn fill_rect(&mut self, region: Region, color: Color) -> CanvasResult<Self::Error>;

    /// Draw `text` with its top-left corner at (`x`, `y`)
    fn draw_text(&mut self, text: &str, x: u16, y: u16, style: TextStyle)
    -> CanvasResult<Self::Error>;

    /// Width and height `text` occupies at text size `size`
    fn text_bounds(&self, text: &str, size: u8) -> (u16, u16);

    /// Screen width in pixels
    fn width(&self) -> u16;

    /// Screen height in pixels
    fn height(&self) -> u16;

    /// Whether every glyph occupies a cell of the same width
    ///
    /// In-place overwriting of text relies on this. Surfaces with
    /// proportional fonts must return `false`.
    fn is_monospace(&self) -> bool {
        true
    }
}
