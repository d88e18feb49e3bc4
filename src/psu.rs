//! Power supply session
//!
//! [`Psu`] owns one device: its bus transport, configuration, link state and
//! identity strings. Every telemetry accessor performs a fresh register read;
//! nothing is cached between polls.
//!
//! ## Link state
//!
//! A session starts disconnected. [`Psu::fetch_identity`] is the only way to
//! (re)connect: the first identity string read successfully marks the device
//! connected. Any transport failure during a telemetry read marks it
//! disconnected again, and from then on every read returns
//! [`Error::Disconnected`] without touching the bus.

use heapless::Vec;

use crate::codec::{Reading, assemble_16, assemble_32, request_frame};
use crate::config::Config;
use crate::error::{Error, MAX_REGISTER};
use crate::interface::BusInterface;
use crate::register::{
    self, ENERGY_CONSUMED, FAN_SPEED, INPUT_CURRENT, INPUT_POWER, INPUT_VOLTAGE,
    INTAKE_TEMPERATURE, INTERNAL_TEMPERATURE, IdentityField, OUTPUT_CURRENT, OUTPUT_POWER,
    OUTPUT_VOLTAGE, Quantity, UPTIME, identity_address,
};

type ReadResult<T = Reading> = core::result::Result<T, Error>;

/// Descriptive strings read from the identity storage
///
/// Each field is empty until fetched and keeps its last successfully read
/// value afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Identity {
    /// Manufacturer name
    pub manufacturer: Vec<u8, 5>,
    /// Product name
    pub name: Vec<u8, 26>,
    /// Manufacturing date
    pub mfg_date: Vec<u8, 8>,
    /// CT serial number
    pub serial_ct: Vec<u8, 14>,
    /// Spare part number
    pub serial_spn: Vec<u8, 10>,
}

impl Identity {
    /// Interpret an identity field as text
    ///
    /// Trailing NUL and space padding is dropped. Returns an empty string if
    /// the bytes are not valid UTF-8.
    pub fn text(field: &[u8]) -> &str {
        core::str::from_utf8(field)
            .map(|s| s.trim_end_matches(['\0', ' ']))
            .unwrap_or("")
    }
}

/// One poll's worth of telemetry, in polling order
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Telemetry {
    /// Input voltage in V
    pub voltage_in: Reading,
    /// Output voltage in V
    pub voltage_out: Reading,
    /// Input current in A
    pub current_in: Reading,
    /// Output current in A
    pub current_out: Reading,
    /// Input power in W
    pub power_in: Reading,
    /// Output power in W
    pub power_out: Reading,
    /// Intake temperature in °C
    pub temperature_intake: Reading,
    /// Internal temperature in °C
    pub temperature_internal: Reading,
    /// Fan speed in rpm
    pub fan_speed: Reading,
    /// Seconds since power-on
    pub uptime: Reading<u32>,
    /// Energy consumed in Wh
    pub energy_consumed: Reading,
}

/// Telemetry session for a single power supply
pub struct Psu<B>
where
    B: BusInterface,
{
    /// Bus transport
    bus: B,
    /// Session configuration
    config: Config,
    /// Outcome of the last transport operation
    connected: bool,
    /// Identity strings
    identity: Identity,
}

impl<B> Psu<B>
where
    B: BusInterface,
{
    /// Create a new session; the device starts disconnected
    pub fn new(bus: B, config: Config) -> Self {
        Self {
            bus,
            config,
            connected: false,
            identity: Identity::default(),
        }
    }

    /// Release the bus transport
    pub fn release(self) -> B {
        self.bus
    }

    /// Bus address of the telemetry controller
    pub fn address(&self) -> u8 {
        self.config.address
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Session configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the last transport operation succeeded
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Identity strings fetched so far
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Read the five identity strings
    ///
    /// Reads manufacturer, name, date, CT serial and spare part number, in
    /// that order. Fields whose read fails keep their previous value. Returns
    /// the link state afterwards.
    pub fn fetch_identity(&mut self) -> bool {
        if let Some(value) = self.read_identity(register::MANUFACTURER) {
            self.identity.manufacturer = value;
        }
        if let Some(value) = self.read_identity(register::NAME) {
            self.identity.name = value;
        }
        if let Some(value) = self.read_identity(register::MFG_DATE) {
            self.identity.mfg_date = value;
        }
        if let Some(value) = self.read_identity(register::SERIAL_CT) {
            self.identity.serial_ct = value;
        }
        if let Some(value) = self.read_identity(register::SERIAL_SPN) {
            self.identity.serial_spn = value;
        }
        self.connected
    }

    /// Read one identity string, returning an empty string on failure
    ///
    /// At most `N` bytes are read. A successful read marks the device
    /// connected; a failed one leaves the link state as it was.
    pub fn read_identity_field<const N: usize>(&mut self, field: IdentityField) -> Vec<u8, N> {
        self.read_identity(field).unwrap_or_default()
    }

    fn read_identity<const N: usize>(&mut self, field: IdentityField) -> Option<Vec<u8, N>> {
        let storage = identity_address(self.config.address);

        let mut value: Vec<u8, N> = Vec::new();
        value.resize(field.length.min(N), 0).ok()?;

        let result = self
            .bus
            .send(storage, &[field.register])
            .and_then(|()| self.bus.request(storage, &mut value));
        if let Err(err) = result {
            log::warn!(
                "{:02X}: failed to read identity 0x{:02X}: {:?}",
                self.config.address,
                field.register,
                err
            );
            return None;
        }

        self.connected = true;
        log::debug!("{:02X}: {}", self.config.address, Identity::text(&value));
        Some(value)
    }

    /// Read the raw signed 16-bit word held by `register`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegister`] for registers above 0x7F and
    /// [`Error::Disconnected`] if the device is (or just became) unreachable.
    /// Failures are not retried.
    pub fn read_register(&mut self, register: u8) -> ReadResult<i16> {
        if register > MAX_REGISTER {
            return Err(Error::InvalidRegister { register });
        }
        if !self.connected {
            return Err(Error::Disconnected);
        }

        let address = self.config.address;
        let mut response = [0u8; 2];
        let result = self
            .bus
            .send(address, &request_frame(register, address))
            .and_then(|()| self.bus.request(address, &mut response));
        if let Err(err) = result {
            log::warn!(
                "{:02X}: failed to read register 0x{:02X}: {:?}",
                address,
                register,
                err
            );
            self.connected = false;
            return Err(Error::Disconnected);
        }

        Ok(assemble_16(response[0], response[1]))
    }

    /// Read `register` and convert it to a physical value
    ///
    /// A positive `scale` divides the 16-bit word. A negative `scale` reads
    /// `register` and `register + 1` as the low and high words of a 32-bit
    /// value and divides by `|scale|`. A negative raw value (the 16-bit word,
    /// or the assembled 32-bit value) is returned as [`Reading::Invalid`]
    /// without scaling.
    ///
    /// With [`Config::log_readings`] set, a valid reading is logged as
    /// `"<address>: <label>\t<value><unit>"`.
    pub fn read_scaled(&mut self, register: u8, scale: f32, unit: &str, label: &str) -> ReadResult {
        let wide = scale < 0.0;
        if register > MAX_REGISTER {
            return Err(Error::InvalidRegister { register });
        }
        if wide && register == MAX_REGISTER {
            return Err(Error::InvalidRegister {
                register: register + 1,
            });
        }

        let low = self.read_register(register)?;
        let (raw, divisor) = if wide {
            // The low word is unsigned; only the assembled sign flags an error
            let high = self.read_register(register + 1)?;
            (assemble_32(low, high), -scale)
        } else {
            (i32::from(low), scale)
        };

        let reading = crate::codec::scale(raw, divisor);
        if let Reading::Valid(value) = reading {
            if self.config.log_readings {
                log::info!("{:02X}: {}\t{}{}", self.config.address, label, value, unit);
            }
        }
        Ok(reading)
    }

    /// Read a quantity from the register map
    pub fn read_quantity(&mut self, quantity: &Quantity) -> ReadResult {
        self.read_scaled(
            quantity.register,
            quantity.scale,
            quantity.unit,
            quantity.label,
        )
    }

    /// Input voltage in V
    pub fn voltage_in(&mut self) -> ReadResult {
        self.read_quantity(&INPUT_VOLTAGE)
    }

    /// Output voltage in V
    pub fn voltage_out(&mut self) -> ReadResult {
        self.read_quantity(&OUTPUT_VOLTAGE)
    }

    /// Input current in A
    pub fn current_in(&mut self) -> ReadResult {
        self.read_quantity(&INPUT_CURRENT)
    }

    /// Output current in A
    pub fn current_out(&mut self) -> ReadResult {
        self.read_quantity(&OUTPUT_CURRENT)
    }

    /// Input power in W
    pub fn power_in(&mut self) -> ReadResult {
        self.read_quantity(&INPUT_POWER)
    }

    /// Output power in W
    pub fn power_out(&mut self) -> ReadResult {
        self.read_quantity(&OUTPUT_POWER)
    }

    /// Intake air temperature in °C
    pub fn temperature_intake(&mut self) -> ReadResult {
        self.read_quantity(&INTAKE_TEMPERATURE)
    }

    /// Internal temperature in °C
    pub fn temperature_internal(&mut self) -> ReadResult {
        self.read_quantity(&INTERNAL_TEMPERATURE)
    }

    /// Fan speed in rpm
    pub fn fan_speed(&mut self) -> ReadResult {
        self.read_quantity(&FAN_SPEED)
    }

    /// Energy consumed since power-on in Wh
    pub fn energy_consumed(&mut self) -> ReadResult {
        self.read_quantity(&ENERGY_CONSUMED)
    }

    /// Whole seconds since power-on
    pub fn seconds_since_startup(&mut self) -> ReadResult<Reading<u32>> {
        Ok(self.read_quantity(&UPTIME)?.map(|seconds| seconds as u32))
    }

    /// Read every telemetry quantity in polling order
    ///
    /// Stops at the first read that finds the device disconnected.
    pub fn telemetry(&mut self) -> ReadResult<Telemetry> {
        Ok(Telemetry {
            voltage_in: self.voltage_in()?,
            voltage_out: self.voltage_out()?,
            current_in: self.current_in()?,
            current_out: self.current_out()?,
            power_in: self.power_in()?,
            power_out: self.power_out()?,
            temperature_intake: self.temperature_intake()?,
            temperature_internal: self.temperature_internal()?,
            fan_speed: self.fan_speed()?,
            uptime: self.seconds_since_startup()?,
            energy_consumed: self.energy_consumed()?,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::codec::frame_is_valid;
    use crate::config::Builder;
    use alloc::vec::Vec as StdVec;

    pub(crate) const ADDRESS: u8 = 0x58;
    pub(crate) const STORAGE: u8 = 0x50;

    #[derive(Debug, PartialEq)]
    pub(crate) struct MockError;

    /// Bus double answering register reads from `registers` and identity
    /// reads from `storage`, recording every transfer.
    #[derive(Debug)]
    pub(crate) struct MockBus {
        pub(crate) registers: [i16; 128],
        pub(crate) storage: [u8; 256],
        pub(crate) fail_send: bool,
        pub(crate) fail_request: bool,
        pub(crate) sends: StdVec<(u8, StdVec<u8>)>,
        pub(crate) requests: StdVec<(u8, usize)>,
        selected: u8,
    }

    impl MockBus {
        pub(crate) fn new() -> Self {
            let mut storage = [0u8; 256];
            storage[0x2C..0x2C + 5].copy_from_slice(b"DELTA");
            storage[0x32..0x32 + 26].copy_from_slice(b"DPS-1200FB-1 A            ");
            storage[0x1D..0x1D + 8].copy_from_slice(b"20140512");
            storage[0x5B..0x5B + 14].copy_from_slice(b"CT00000000001A");
            storage[0x12..0x12 + 10].copy_from_slice(b"SPN0000001");
            Self {
                registers: [0; 128],
                storage,
                fail_send: false,
                fail_request: false,
                sends: StdVec::new(),
                requests: StdVec::new(),
                selected: 0,
            }
        }

        pub(crate) fn transfers(&self) -> usize {
            self.sends.len() + self.requests.len()
        }
    }

    impl BusInterface for MockBus {
        type Error = MockError;

        fn send(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            self.sends.push((address, bytes.to_vec()));
            if self.fail_send {
                return Err(MockError);
            }
            self.selected = bytes[0];
            Ok(())
        }

        fn request(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
            self.requests.push((address, buffer.len()));
            if self.fail_request {
                return Err(MockError);
            }
            if address == STORAGE {
                let start = self.selected as usize;
                buffer.copy_from_slice(&self.storage[start..start + buffer.len()]);
            } else {
                let register = (self.selected >> 1) as usize;
                buffer.copy_from_slice(&self.registers[register].to_le_bytes());
            }
            Ok(())
        }
    }

    fn session() -> Psu<MockBus> {
        let config = Builder::new().address(ADDRESS).build().unwrap();
        Psu::new(MockBus::new(), config)
    }

    fn connected_session() -> Psu<MockBus> {
        let mut psu = session();
        assert!(psu.fetch_identity());
        psu.bus.sends.clear();
        psu.bus.requests.clear();
        psu
    }

    #[test]
    fn test_new_session_is_disconnected() {
        let mut psu = session();
        assert!(!psu.is_connected());
        assert_eq!(psu.voltage_in(), Err(Error::Disconnected));
        assert_eq!(psu.bus.transfers(), 0);
    }

    #[test]
    fn test_read_register_sends_checksummed_frame() {
        let mut psu = connected_session();
        psu.bus.registers[0x04] = 3840;

        assert_eq!(psu.read_register(0x04), Ok(3840));
        assert_eq!(psu.bus.sends, alloc::vec![(ADDRESS, alloc::vec![0x08, 0x48])]);
        assert_eq!(psu.bus.requests, alloc::vec![(ADDRESS, 2)]);
        assert!(frame_is_valid([0x08, 0x48], ADDRESS));
    }

    #[test]
    fn test_voltage_in_end_to_end() {
        let mut psu = connected_session();
        psu.bus.registers[0x04] = 3840;
        assert_eq!(psu.voltage_in(), Ok(Reading::Valid(120.0)));
    }

    #[test]
    fn test_positive_scale_divides() {
        let mut psu = connected_session();
        psu.bus.registers[0x07] = 3113;
        assert_eq!(psu.voltage_out(), Ok(Reading::Valid(3113.0 / 256.0)));
    }

    #[test]
    fn test_energy_consumed_assembles_two_registers() {
        let mut psu = connected_session();
        psu.bus.registers[0x16] = 100;
        psu.bus.registers[0x17] = 2;

        let value = psu.energy_consumed().unwrap().value().unwrap();
        assert!((value - 9.109_166).abs() < 1e-4);
        assert_eq!(psu.bus.requests.len(), 2);
        assert_eq!(psu.bus.sends[0].1[0], 0x16 << 1);
        assert_eq!(psu.bus.sends[1].1[0], 0x17 << 1);
    }

    #[test]
    fn test_negative_raw_is_invalid_and_unscaled() {
        let mut psu = connected_session();
        psu.bus.registers[0x04] = -1;
        assert_eq!(psu.voltage_in(), Ok(Reading::Invalid(-1)));
        assert!(psu.is_connected());
    }

    #[test]
    fn test_low_word_top_bit_is_part_of_the_value() {
        let mut psu = connected_session();
        psu.bus.registers[0x16] = 0x8000u16 as i16;
        psu.bus.registers[0x17] = 0;

        let value = psu.energy_consumed().unwrap().value().unwrap();
        assert!((value - 32768.0 / 14400.0).abs() < 1e-4);
        assert_eq!(psu.bus.requests.len(), 2);
    }

    #[test]
    fn test_low_word_all_ones_with_high_word() {
        let mut psu = connected_session();
        psu.bus.registers[0x16] = -2;
        psu.bus.registers[0x17] = 5;
        assert_eq!(
            psu.energy_consumed(),
            Ok(Reading::Valid(((5 << 16) | 0xFFFE) as f32 / 14400.0))
        );
    }

    #[test]
    fn test_negative_high_word_is_invalid() {
        let mut psu = connected_session();
        psu.bus.registers[0x16] = 7;
        psu.bus.registers[0x17] = -1;
        assert_eq!(psu.energy_consumed(), Ok(Reading::Invalid(-65_529)));
    }

    #[test]
    fn test_uptime_truncates() {
        let mut psu = connected_session();
        psu.bus.registers[0x18] = 7;
        assert_eq!(psu.seconds_since_startup(), Ok(Reading::Valid(3)));
    }

    #[test]
    fn test_transport_failure_disconnects_without_retry() {
        let mut psu = connected_session();
        psu.bus.fail_send = true;

        assert_eq!(psu.fan_speed(), Err(Error::Disconnected));
        assert!(!psu.is_connected());
        assert_eq!(psu.bus.sends.len(), 1);

        // Later reads short-circuit, even once the bus is healthy again
        psu.bus.fail_send = false;
        let before = psu.bus.transfers();
        assert_eq!(psu.power_in(), Err(Error::Disconnected));
        assert_eq!(psu.read_register(0x04), Err(Error::Disconnected));
        assert_eq!(psu.bus.transfers(), before);
    }

    #[test]
    fn test_failed_response_read_disconnects() {
        let mut psu = connected_session();
        psu.bus.fail_request = true;
        assert_eq!(psu.current_in(), Err(Error::Disconnected));
        assert!(!psu.is_connected());
    }

    #[test]
    fn test_identity_fetch_reconnects() {
        let mut psu = connected_session();
        psu.bus.fail_send = true;
        assert!(psu.current_out().is_err());

        psu.bus.fail_send = false;
        assert!(psu.fetch_identity());
        psu.bus.registers[0x08] = 256;
        assert_eq!(psu.current_out(), Ok(Reading::Valid(2.0)));
    }

    #[test]
    fn test_fetch_identity_order_and_contents() {
        let mut psu = session();
        assert!(psu.fetch_identity());

        let registers: StdVec<(u8, StdVec<u8>)> = psu.bus.sends.clone();
        assert_eq!(
            registers,
            alloc::vec![
                (STORAGE, alloc::vec![0x2C]),
                (STORAGE, alloc::vec![0x32]),
                (STORAGE, alloc::vec![0x1D]),
                (STORAGE, alloc::vec![0x5B]),
                (STORAGE, alloc::vec![0x12]),
            ]
        );
        let lengths: StdVec<usize> = psu.bus.requests.iter().map(|(_, len)| *len).collect();
        assert_eq!(lengths, alloc::vec![5, 26, 8, 14, 10]);

        let identity = psu.identity();
        assert_eq!(identity.manufacturer.as_slice(), b"DELTA");
        assert_eq!(Identity::text(&identity.name), "DPS-1200FB-1 A");
        assert_eq!(identity.mfg_date.as_slice(), b"20140512");
        assert_eq!(identity.serial_ct.as_slice(), b"CT00000000001A");
        assert_eq!(identity.serial_spn.as_slice(), b"SPN0000001");
    }

    #[test]
    fn test_failed_identity_keeps_fields_and_link_state() {
        let mut psu = session();
        psu.bus.fail_request = true;
        assert!(!psu.fetch_identity());
        assert!(psu.identity().manufacturer.is_empty());

        psu.bus.fail_request = false;
        assert!(psu.fetch_identity());

        psu.bus.fail_request = true;
        psu.bus.storage[0x2C] = b'X';
        assert!(psu.fetch_identity());
        assert_eq!(psu.identity().manufacturer.as_slice(), b"DELTA");
    }

    #[test]
    fn test_read_identity_field_returns_empty_on_failure() {
        let mut psu = session();
        psu.bus.fail_send = true;
        let value: Vec<u8, 5> = psu.read_identity_field(register::MANUFACTURER);
        assert!(value.is_empty());
        assert!(!psu.is_connected());
    }

    #[test]
    fn test_invalid_registers_do_not_touch_bus() {
        let mut psu = connected_session();
        assert_eq!(
            psu.read_register(0x80),
            Err(Error::InvalidRegister { register: 0x80 })
        );
        assert_eq!(
            psu.read_scaled(0x7F, -2.0, "Wh", "Wide"),
            Err(Error::InvalidRegister { register: 0x80 })
        );
        assert_eq!(psu.bus.transfers(), 0);
        assert!(psu.is_connected());
    }

    #[test]
    fn test_telemetry_reads_in_fixed_order() {
        let mut psu = connected_session();
        psu.bus.registers[0x04] = 3840;
        psu.bus.registers[0x0F] = 1500;

        let telemetry = psu.telemetry().unwrap();
        assert_eq!(telemetry.voltage_in, Reading::Valid(120.0));
        assert_eq!(telemetry.fan_speed, Reading::Valid(1500.0));

        let order: StdVec<u8> = psu.bus.sends.iter().map(|(_, frame)| frame[0] >> 1).collect();
        assert_eq!(
            order,
            alloc::vec![0x04, 0x07, 0x05, 0x08, 0x06, 0x09, 0x0D, 0x0E, 0x0F, 0x18, 0x16, 0x17]
        );
    }

    mod logging {
        extern crate std;

        use super::*;
        use alloc::string::{String, ToString};
        use core::cell::RefCell;
        use log::{Level, LevelFilter, Log, Metadata, Record};

        std::thread_local! {
            static LINES: RefCell<StdVec<String>> = const { RefCell::new(StdVec::new()) };
        }

        /// Keeps `info` lines per test thread
        struct Capture;

        impl Log for Capture {
            fn enabled(&self, metadata: &Metadata<'_>) -> bool {
                metadata.level() == Level::Info
            }

            fn log(&self, record: &Record<'_>) {
                if self.enabled(record.metadata()) {
                    LINES.with(|lines| lines.borrow_mut().push(record.args().to_string()));
                }
            }

            fn flush(&self) {}
        }

        static CAPTURE: Capture = Capture;

        fn capture() {
            let _ = log::set_logger(&CAPTURE);
            log::set_max_level(LevelFilter::Trace);
            LINES.with(|lines| lines.borrow_mut().clear());
        }

        fn lines() -> StdVec<String> {
            LINES.with(|lines| lines.borrow().clone())
        }

        fn logging_session(log_readings: bool) -> Psu<MockBus> {
            let config = Builder::new()
                .address(ADDRESS)
                .log_readings(log_readings)
                .build()
                .unwrap();
            let mut psu = Psu::new(MockBus::new(), config);
            assert!(psu.fetch_identity());
            psu
        }

        #[test]
        fn test_reading_is_logged_when_enabled() {
            capture();
            let mut psu = logging_session(true);
            psu.bus.registers[0x04] = 3840;

            assert_eq!(psu.voltage_in(), Ok(Reading::Valid(120.0)));
            assert_eq!(lines(), alloc::vec!["58: Input voltage\t120V".to_string()]);
        }

        #[test]
        fn test_reading_is_not_logged_when_disabled() {
            capture();
            let mut psu = logging_session(false);
            psu.bus.registers[0x04] = 3840;

            assert!(psu.voltage_in().is_ok());
            assert!(lines().is_empty());
        }

        #[test]
        fn test_invalid_reading_is_not_logged() {
            capture();
            let mut psu = logging_session(true);
            psu.bus.registers[0x04] = -1;

            assert_eq!(psu.voltage_in(), Ok(Reading::Invalid(-1)));
            assert!(lines().is_empty());
        }
    }
}
