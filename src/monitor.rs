//! Polling channel tying one power supply to its summary tile
//!
//! A monitor loop owns one [`Channel`] per supply and calls
//! [`Channel::poll`] for each in turn. Polling is blocking and sequential;
//! there is no shared state between channels, so a failing supply never
//! affects the others.

use crate::canvas::Canvas;
use crate::format::{FieldText, format_count, format_reading};
use crate::interface::BusInterface;
use crate::psu::{Psu, Telemetry};
use crate::views::{DetailScreen, PanelState, SummaryTile};

type PollResult<T, E> = core::result::Result<T, E>;

/// One power supply and the tile that displays it
pub struct Channel<B>
where
    B: BusInterface,
{
    psu: Psu<B>,
    tile: SummaryTile,
}

impl<B> Channel<B>
where
    B: BusInterface,
{
    /// Create a new channel
    pub fn new(psu: Psu<B>, tile: SummaryTile) -> Self {
        Self { psu, tile }
    }

    /// The power supply session
    pub fn psu(&self) -> &Psu<B> {
        &self.psu
    }

    /// The power supply session, mutably
    pub fn psu_mut(&mut self) -> &mut Psu<B> {
        &mut self.psu
    }

    /// The summary tile
    pub fn tile(&self) -> &SummaryTile {
        &self.tile
    }

    /// The summary tile, mutably (e.g. to invalidate it after a screen change)
    pub fn tile_mut(&mut self) -> &mut SummaryTile {
        &mut self.tile
    }

    /// Run one poll cycle and refresh the tile
    ///
    /// A disconnected supply first gets an identity fetch. If it is
    /// connected afterwards all telemetry is read and the tile shows output
    /// voltage, output current, internal temperature and output power.
    /// Otherwise, or if any read loses the device, the tile switches to the
    /// error state.
    ///
    /// Returns the telemetry read in this cycle, if any.
    pub fn poll<C: Canvas>(&mut self, canvas: &mut C) -> PollResult<Option<Telemetry>, C::Error> {
        if !self.psu.is_connected() {
            self.psu.fetch_identity();
        }
        let telemetry = if self.psu.is_connected() {
            self.psu.telemetry().ok()
        } else {
            None
        };

        let Some(telemetry) = telemetry else {
            self.tile.set_state(canvas, PanelState::Error)?;
            return Ok(None);
        };

        self.tile.set_state(canvas, PanelState::Normal)?;
        self.tile.initial_draw(canvas)?;
        self.tile.update_draw(
            canvas,
            &format_reading(telemetry.voltage_out, 2),
            &format_reading(telemetry.current_out, 2),
            &format_reading(telemetry.temperature_internal, 1),
            &format_reading(telemetry.power_out, 0),
        )?;
        Ok(Some(telemetry))
    }
}

/// Format a telemetry snapshot in [`DetailScreen::update_draw`] order
pub fn detail_values(telemetry: &Telemetry) -> [FieldText; 11] {
    [
        format_reading(telemetry.voltage_in, 1),
        format_reading(telemetry.voltage_out, 2),
        format_reading(telemetry.current_in, 2),
        format_reading(telemetry.current_out, 2),
        format_reading(telemetry.power_in, 1),
        format_reading(telemetry.power_out, 1),
        format_reading(telemetry.temperature_intake, 1),
        format_reading(telemetry.temperature_internal, 1),
        format_reading(telemetry.fan_speed, 0),
        format_count(telemetry.uptime),
        format_reading(telemetry.energy_consumed, 2),
    ]
}

/// Show a telemetry snapshot on a detail screen
pub fn show_detail<C: Canvas>(
    screen: &mut DetailScreen,
    canvas: &mut C,
    telemetry: &Telemetry,
) -> PollResult<(), C::Error> {
    let values = detail_values(telemetry);
    screen.initial_draw(canvas)?;
    screen.update_draw(canvas, values.each_ref().map(|value| value.as_str()))
}
