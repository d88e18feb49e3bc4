//! Flicker-free text fields
//!
//! A [`TextField`] remembers the string it last drew and repaints only when
//! the text changes:
//!
//! - same text: nothing is drawn
//! - same length or longer: the new text is drawn on opaque cells, which
//!   overwrites the old glyphs in place
//! - shorter: the old text is redrawn in the background color to erase it,
//!   then the new text is drawn
//!
//! In-place overwriting requires a fixed-width font. On a canvas that reports
//! [`Canvas::is_monospace`] as `false` every change takes the erase path.
//!
//! ## Example
//!
//! ```
//! use psu_monitor::{Color, TextField};
//! # use psu_monitor::{Canvas, Region, TextStyle};
//! # struct Screen;
//! # impl Canvas for Screen {
//! #     type Error = core::convert::Infallible;
//! #     fn fill_rect(&mut self, _: Region, _: Color) -> Result<(), Self::Error> { Ok(()) }
//! #     fn draw_text(&mut self, _: &str, _: u16, _: u16, _: TextStyle) -> Result<(), Self::Error> { Ok(()) }
//! #     fn text_bounds(&self, text: &str, size: u8) -> (u16, u16) { (text.len() as u16 * 6 * size as u16, 8 * size as u16) }
//! #     fn width(&self) -> u16 { 480 }
//! #     fn height(&self) -> u16 { 320 }
//! # }
//! # let mut screen = Screen;
//! let mut field = TextField::new(10, 40, 2, Color::BLACK, Color::WHITE);
//!
//! let _ = field.set_text(&mut screen, "12.03V");
//! let _ = field.set_text(&mut screen, "12.03V"); // no-op
//! assert_eq!(field.text(), "12.03V");
//! ```

use heapless::String;

use crate::canvas::{Canvas, TextStyle};
use crate::color::Color;

/// Maximum number of bytes a field displays; longer text is truncated
pub const FIELD_CAPACITY: usize = 32;

type FieldResult<E> = core::result::Result<(), E>;

/// Single text region tracked for incremental redraw
///
/// The stored text always matches what is visible at the field's anchor,
/// provided nothing else draws over the field.
#[derive(Clone, Debug)]
pub struct TextField {
    /// Anchor X coordinate
    x: u16,
    /// Anchor Y coordinate
    y: u16,
    /// Text size
    size: u8,
    /// Glyph color
    foreground: Color,
    /// Color the field sits on
    background: Color,
    /// Text currently on screen
    last_text: String<FIELD_CAPACITY>,
}

impl TextField {
    /// Create an empty field anchored at (`x`, `y`)
    pub const fn new(x: u16, y: u16, size: u8, foreground: Color, background: Color) -> Self {
        Self {
            x,
            y,
            size,
            foreground,
            background,
            last_text: String::new(),
        }
    }

    /// Text currently displayed
    pub fn text(&self) -> &str {
        &self.last_text
    }

    /// Current anchor
    pub fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }

    /// Show `text` at the field's anchor, repainting only what changed
    pub fn set_text<C: Canvas>(&mut self, canvas: &mut C, text: &str) -> FieldResult<C::Error> {
        let text = truncate(text);
        if text == self.last_text.as_str() {
            return Ok(());
        }

        let grows = text.chars().count() >= self.last_text.chars().count();
        if grows && canvas.is_monospace() {
            let style = TextStyle::opaque(self.size, self.foreground, self.background);
            canvas.draw_text(text, self.x, self.y, style)?;
        } else {
            self.erase(canvas)?;
            self.draw(canvas, text)?;
        }

        self.store(text);
        Ok(())
    }

    /// Move the field to (`x`, `y`) and show `text` there
    ///
    /// The old text is always erased at the old anchor before the new text
    /// is drawn, even when neither text nor position changed.
    pub fn set_text_at<C: Canvas>(
        &mut self,
        canvas: &mut C,
        text: &str,
        x: u16,
        y: u16,
    ) -> FieldResult<C::Error> {
        let text = truncate(text);
        self.erase(canvas)?;
        self.x = x;
        self.y = y;
        self.draw(canvas, text)?;
        self.store(text);
        Ok(())
    }

    fn erase<C: Canvas>(&self, canvas: &mut C) -> FieldResult<C::Error> {
        if self.last_text.is_empty() {
            return Ok(());
        }
        let style = TextStyle::transparent(self.size, self.background);
        canvas.draw_text(&self.last_text, self.x, self.y, style)
    }

    fn draw<C: Canvas>(&self, canvas: &mut C, text: &str) -> FieldResult<C::Error> {
        let style = TextStyle::transparent(self.size, self.foreground);
        canvas.draw_text(text, self.x, self.y, style)
    }

    fn store(&mut self, text: &str) {
        self.last_text = String::try_from(text).unwrap_or_default();
    }
}

/// Cut `text` to at most [`FIELD_CAPACITY`] bytes on a char boundary
fn truncate(text: &str) -> &str {
    if text.len() <= FIELD_CAPACITY {
        return text;
    }
    let mut end = FIELD_CAPACITY;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
