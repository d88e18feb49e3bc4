//! Panel layouts built from text fields
//!
//! - [`SummaryTile`]: compact 148x60 tile per power supply with voltage,
//!   current, temperature and power, or a red "Error" tile
//! - [`DetailScreen`]: full-width two column table with all eleven
//!   telemetry values under fixed labels
//! - [`draw_banner`]: title strip across the top of the screen
//!
//! Views never hold the canvas; every drawing call borrows it.

use core::fmt::Write;

use crate::canvas::{Canvas, Region, TextStyle};
use crate::color::Color;
use crate::format::FieldText;
use crate::text::TextField;

type ViewResult<E> = core::result::Result<(), E>;

/// Summary tile width in pixels
pub const TILE_WIDTH: u16 = 148;
/// Summary tile height in pixels
pub const TILE_HEIGHT: u16 = 60;
/// Banner height in pixels
pub const BANNER_HEIGHT: u16 = 25;

const FIELD_SIZE: u8 = 2;
const ERROR_TEXT: &str = "Error";

/// What a summary tile shows
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PanelState {
    /// Live telemetry
    #[default]
    Normal,
    /// Device unreachable
    Error,
}

/// Four-value tile for one power supply
#[derive(Clone, Debug)]
pub struct SummaryTile {
    /// Top-left corner
    x: u16,
    y: u16,
    /// Current state
    state: PanelState,
    /// Whether the next `initial_draw` repaints the whole tile
    needs_initial_draw: bool,
    /// Voltage, current, temperature, power
    fields: [TextField; 4],
}

impl SummaryTile {
    /// Create a tile with its top-left corner at (`x`, `y`)
    pub fn new(x: u16, y: u16) -> Self {
        let field = |dx: u16, dy: u16| {
            TextField::new(
                x.saturating_add(dx),
                y.saturating_add(dy),
                FIELD_SIZE,
                Color::BLACK,
                Color::WHITE,
            )
        };
        Self {
            x,
            y,
            state: PanelState::Normal,
            needs_initial_draw: true,
            fields: [field(0, 5), field(80, 5), field(0, 35), field(80, 35)],
        }
    }

    /// Screen area covered by the tile
    pub fn region(&self) -> Region {
        Region::new(self.x, self.y, TILE_WIDTH, TILE_HEIGHT)
    }

    /// Current state
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Force the next [`initial_draw`](Self::initial_draw) to repaint the tile
    pub fn invalidate(&mut self) {
        self.needs_initial_draw = true;
    }

    /// Switch state, repainting the whole tile if it changed
    pub fn set_state<C: Canvas>(&mut self, canvas: &mut C, state: PanelState) -> ViewResult<C::Error> {
        if self.state == state {
            return Ok(());
        }
        self.state = state;
        self.invalidate();
        self.initial_draw(canvas)
    }

    /// Repaint the whole tile if it was invalidated
    ///
    /// In [`PanelState::Normal`] the tile is cleared to white and the fields
    /// are blanked; in [`PanelState::Error`] it is painted red with an
    /// "Error" label.
    pub fn initial_draw<C: Canvas>(&mut self, canvas: &mut C) -> ViewResult<C::Error> {
        if !self.needs_initial_draw {
            return Ok(());
        }

        match self.state {
            PanelState::Normal => {
                canvas.fill_rect(self.region(), Color::WHITE)?;
                for field in &mut self.fields {
                    field.set_text(canvas, "")?;
                }
            }
            PanelState::Error => {
                canvas.fill_rect(self.region(), Color::RED)?;
                let style = TextStyle::transparent(3, Color::WHITE);
                canvas.draw_text(
                    ERROR_TEXT,
                    self.x.saturating_add(30),
                    self.y.saturating_add(20),
                    style,
                )?;
            }
        }

        self.needs_initial_draw = false;
        Ok(())
    }

    /// Show new values; ignored unless the tile is in [`PanelState::Normal`]
    ///
    /// Values are suffixed with their unit letter (V, A, C, W).
    pub fn update_draw<C: Canvas>(
        &mut self,
        canvas: &mut C,
        voltage: &str,
        current: &str,
        temperature: &str,
        power: &str,
    ) -> ViewResult<C::Error> {
        if self.state != PanelState::Normal {
            return Ok(());
        }
        let [f_voltage, f_current, f_temperature, f_power] = &mut self.fields;
        f_voltage.set_text(canvas, &suffixed(voltage, 'V'))?;
        f_current.set_text(canvas, &suffixed(current, 'A'))?;
        f_temperature.set_text(canvas, &suffixed(temperature, 'C'))?;
        f_power.set_text(canvas, &suffixed(power, 'W'))
    }
}

fn suffixed(value: &str, unit: char) -> FieldText {
    let mut text = FieldText::new();
    let _ = write!(text, "{value}{unit}");
    text
}

/// Labels of the detail screen, column by column, six rows each
///
/// The left column has five labelled rows and an empty sixth slot.
pub const DETAIL_LABELS: [&str; 12] = [
    "V:", "A:", "W:", "Temp:", "Lufter:", "", "Out:", "Out:", "Out:", "Int:", "Laufz:", "Wh:",
];

/// Field receiving each `update_draw` value
///
/// Fields 0-4 form the left column, 5-10 the right one; values alternate
/// between the columns row by row.
const VALUE_ROUTING: [usize; 11] = [0, 5, 1, 6, 2, 7, 3, 8, 4, 9, 10];

const ROW_PITCH: u16 = 30;
const COLUMN_PITCH: u16 = 180;
const MARGIN: u16 = 5;

/// Full-screen table of all telemetry values
#[derive(Clone, Debug)]
pub struct DetailScreen {
    /// Content origin (inside the margin)
    x: u16,
    y: u16,
    /// Whether the next `initial_draw` repaints the screen
    needs_initial_draw: bool,
    fields: [TextField; 11],
}

impl DetailScreen {
    /// Create a screen whose area starts at (`x`, `y`)
    pub fn new(x: u16, y: u16) -> Self {
        let x = x.saturating_add(MARGIN);
        let y = y.saturating_add(MARGIN);
        let fields = core::array::from_fn(|i| {
            let (column_x, row) = if i < 5 { (80, i) } else { (250, i - 5) };
            TextField::new(
                x.saturating_add(column_x),
                y.saturating_add(row as u16 * ROW_PITCH),
                FIELD_SIZE,
                Color::BLACK,
                Color::WHITE,
            )
        });
        Self {
            x,
            y,
            needs_initial_draw: true,
            fields,
        }
    }

    /// Force the next [`initial_draw`](Self::initial_draw) to repaint the screen
    pub fn invalidate(&mut self) {
        self.needs_initial_draw = true;
    }

    /// Clear the screen below the origin and draw the static labels
    pub fn initial_draw<C: Canvas>(&mut self, canvas: &mut C) -> ViewResult<C::Error> {
        if !self.needs_initial_draw {
            return Ok(());
        }

        let area = Region::new(
            0,
            self.y.saturating_sub(MARGIN),
            canvas.width(),
            canvas.height(),
        );
        canvas.fill_rect(area, Color::WHITE)?;
        for field in &mut self.fields {
            field.set_text(canvas, "")?;
        }

        let style = TextStyle::transparent(FIELD_SIZE, Color::BLACK);
        let mut labels = DETAIL_LABELS.iter();
        for column in 0..2 {
            for row in 0..6 {
                if let Some(label) = labels.next() {
                    let x = self.x.saturating_add(column * COLUMN_PITCH);
                    canvas.draw_text(label, x, self.y.saturating_add(row * ROW_PITCH), style)?;
                }
            }
        }

        self.needs_initial_draw = false;
        Ok(())
    }

    /// Show eleven values, routed to the fields in interleaved order
    ///
    /// Value `n` goes to the left column for even `n` below 10 and to the
    /// right column otherwise: in/out voltage, in/out current, in/out power,
    /// intake/internal temperature, fan speed/uptime, then energy.
    pub fn update_draw<C: Canvas>(&mut self, canvas: &mut C, values: [&str; 11]) -> ViewResult<C::Error> {
        for (value, field) in values.iter().zip(VALUE_ROUTING) {
            self.fields[field].set_text(canvas, value)?;
        }
        Ok(())
    }
}

/// Draw a gray title strip with `text` centered across the top of the screen
pub fn draw_banner<C: Canvas>(canvas: &mut C, text: &str) -> ViewResult<C::Error> {
    let width = canvas.width();
    canvas.fill_rect(Region::new(0, 0, width, BANNER_HEIGHT), Color::GRAY)?;
    let (text_width, _) = canvas.text_bounds(text, 2);
    let x = width.saturating_sub(text_width) / 2;
    canvas.draw_text(text, x, 5, TextStyle::transparent(2, Color::WHITE))
}
