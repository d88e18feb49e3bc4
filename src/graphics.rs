//! Graphics support via embedded-graphics
//!
//! This module provides [`GraphicCanvas`], which implements [`Canvas`] on top
//! of any embedded-graphics [`DrawTarget`] with RGB565 pixels (TFT drivers,
//! simulators, frame buffers).
//!
//! Text uses the fixed-width 6x10 ASCII font. Text size `n` magnifies every
//! font pixel to an `n`x`n` block, so each character occupies a
//! `6n`x`10n` cell and the in-place overwrite of [`TextField`](crate::TextField)
//! stays pixel exact.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::mock_display::MockDisplay;
//! use embedded_graphics::pixelcolor::Rgb565;
//! use psu_monitor::{GraphicCanvas, SummaryTile, draw_banner};
//!
//! let mut display: MockDisplay<Rgb565> = MockDisplay::new();
//! display.set_allow_overdraw(true);
//! display.set_allow_out_of_bounds_drawing(true);
//! let mut canvas = GraphicCanvas::new(display);
//!
//! let _ = draw_banner(&mut canvas, "PSU");
//!
//! let mut tile = SummaryTile::new(0, 30);
//! let _ = tile.initial_draw(&mut canvas);
//! let _ = tile.update_draw(&mut canvas, "12.10", "3.25", "31.5", "40");
//! ```

use core::fmt::Debug;

use embedded_graphics::{
    Drawable,
    mono_font::{MonoTextStyleBuilder, ascii::FONT_6X10},
    text::{Baseline, Text},
};
use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{Dimensions, Point, Size},
    pixelcolor::Rgb565,
    primitives::Rectangle,
};

use crate::canvas::{Canvas, Region, TextStyle};
use crate::color::Color;

/// [`Canvas`] backed by an embedded-graphics draw target
///
/// ## Type Parameters
///
/// * `D` - Draw target with [`Rgb565`] pixels
pub struct GraphicCanvas<D> {
    /// The underlying display
    target: D,
}

impl<D> GraphicCanvas<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Create a new GraphicCanvas
    pub fn new(target: D) -> Self {
        Self { target }
    }

    /// Access the underlying draw target
    pub fn target(&self) -> &D {
        &self.target
    }

    /// Access the underlying draw target mutably
    ///
    /// Drawing over text fields directly leaves their stored text stale;
    /// invalidate the affected views afterwards.
    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    /// Release the underlying draw target
    pub fn release(self) -> D {
        self.target
    }
}

impl<D> Canvas for GraphicCanvas<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
{
    type Error = D::Error;

    fn fill_rect(&mut self, region: Region, color: Color) -> Result<(), Self::Error> {
        let area = Rectangle::new(
            Point::new(i32::from(region.x), i32::from(region.y)),
            Size::new(u32::from(region.w), u32::from(region.h)),
        );
        self.target.fill_solid(&area, color.into())
    }

    fn draw_text(&mut self, text: &str, x: u16, y: u16, style: TextStyle) -> Result<(), Self::Error> {
        let mut builder = MonoTextStyleBuilder::new()
            .font(&FONT_6X10)
            .text_color(style.foreground.into());
        if let Some(background) = style.background {
            builder = builder.background_color(background.into());
        }

        let origin = Point::new(i32::from(x), i32::from(y));
        let mut magnified = Magnified {
            target: &mut self.target,
            origin,
            factor: i32::from(style.size.max(1)),
        };
        Text::with_baseline(text, origin, builder.build(), Baseline::Top).draw(&mut magnified)?;
        Ok(())
    }

    fn text_bounds(&self, text: &str, size: u8) -> (u16, u16) {
        let size = u32::from(size.max(1));
        let advance = FONT_6X10.character_size.width + FONT_6X10.character_spacing;
        let width = text.chars().count() as u32 * advance * size;
        let height = FONT_6X10.character_size.height * size;
        (width.min(u32::from(u16::MAX)) as u16, height as u16)
    }

    fn width(&self) -> u16 {
        self.target.bounding_box().size.width as u16
    }

    fn height(&self) -> u16 {
        self.target.bounding_box().size.height as u16
    }
}

/// Draw target adapter scaling everything around `origin` by `factor`
struct Magnified<'a, D> {
    target: &'a mut D,
    origin: Point,
    factor: i32,
}

impl<D> Dimensions for Magnified<'_, D>
where
    D: DrawTarget,
{
    fn bounding_box(&self) -> Rectangle {
        self.target.bounding_box()
    }
}

impl<D> DrawTarget for Magnified<'_, D>
where
    D: DrawTarget,
{
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let cell = Size::new_equal(self.factor as u32);
        for Pixel(point, color) in pixels {
            let top_left = self.origin + (point - self.origin) * self.factor;
            self.target.fill_solid(&Rectangle::new(top_left, cell), color)?;
        }
        Ok(())
    }
}
