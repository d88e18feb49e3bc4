//! Value formatting for panel fields

use core::fmt::Write;

use heapless::String;

use crate::codec::Reading;
use crate::text::FIELD_CAPACITY;

/// Formatted field text
pub type FieldText = String<FIELD_CAPACITY>;

/// Placeholder shown for readings the device flagged as invalid
pub const INVALID_TEXT: &str = "---";

/// Format `value` with exactly `precision` fractional digits
///
/// ```
/// use psu_monitor::format::format_precision;
///
/// assert_eq!(format_precision(12.346, 2).as_str(), "12.35");
/// assert_eq!(format_precision(1500.0, 0).as_str(), "1500");
/// ```
pub fn format_precision(value: f32, precision: usize) -> FieldText {
    let mut text = FieldText::new();
    // Overflow only drops trailing digits
    let _ = write!(text, "{:.*}", precision, value);
    text
}

/// Format a reading, or [`INVALID_TEXT`] if the device flagged it
pub fn format_reading(reading: Reading, precision: usize) -> FieldText {
    match reading {
        Reading::Valid(value) => format_precision(value, precision),
        Reading::Invalid(_) => FieldText::try_from(INVALID_TEXT).unwrap_or_default(),
    }
}

/// Format a whole-number reading such as the uptime counter
pub fn format_count(reading: Reading<u32>) -> FieldText {
    let mut text = FieldText::new();
    match reading {
        Reading::Valid(value) => {
            let _ = write!(text, "{}", value);
        }
        Reading::Invalid(_) => {
            let _ = text.push_str(INVALID_TEXT);
        }
    }
    text
}
