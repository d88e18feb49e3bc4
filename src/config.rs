//! Session configuration types and builder

pub use crate::error::{BuilderError, MAX_ADDRESS};
use crate::register::IDENTITY_ADDRESS_OFFSET;

/// Power supply session configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// 7-bit bus address of the power supply telemetry controller
    pub address: u8,
    /// Emit one `info` log line per successful telemetry read
    pub log_readings: bool,
}

/// Builder for constructing session configuration
///
/// # Example
///
/// ```
/// use psu_monitor::Builder;
///
/// let config = match Builder::new().address(0x58).log_readings(true).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.address, 0x58);
/// assert!(config.log_readings);
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    /// Bus address (required)
    address: Option<u8>,
    /// Per-read logging
    log_readings: bool,
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device bus address (required)
    pub fn address(mut self, address: u8) -> Self {
        self.address = Some(address);
        self
    }

    /// Enable or disable per-read telemetry logging
    ///
    /// Disabled by default. Failures are always logged at `warn` level.
    pub fn log_readings(mut self, enabled: bool) -> Self {
        self.log_readings = enabled;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingAddress` if no address was set, and
    /// `BuilderError::InvalidAddress` if the address is not 7-bit or has no
    /// identity storage address below it.
    pub fn build(self) -> Result<Config, BuilderError> {
        let address = self.address.ok_or(BuilderError::MissingAddress)?;
        if !(IDENTITY_ADDRESS_OFFSET..=MAX_ADDRESS).contains(&address) {
            return Err(BuilderError::InvalidAddress { address });
        }
        Ok(Config {
            address,
            log_readings: self.log_readings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_disabled_by_default() {
        let config = Builder::new().address(0x58).build().unwrap();
        assert!(!config.log_readings);
    }

    #[test]
    fn test_address_bounds() {
        assert!(Builder::new().address(0x08).build().is_ok());
        assert!(Builder::new().address(0x7F).build().is_ok());
        assert_eq!(
            Builder::new().address(0x07).build(),
            Err(BuilderError::InvalidAddress { address: 0x07 })
        );
        assert_eq!(
            Builder::new().address(0x80).build(),
            Err(BuilderError::InvalidAddress { address: 0x80 })
        );
    }
}
