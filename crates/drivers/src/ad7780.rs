//! AD7780 24-bit sigma-delta ADC (PmodAD3)
//!
//! The part has no register map. Gain, output rate and power are set by
//! GPIO lines and every conversion is clocked out as four bytes: the 24-bit
//! sample followed by a status byte.
//!
//! # Control pins
//!
//! | Pin     | Low        | High       |
//! |---------|------------|------------|
//! | `PDRST` | power-down | running    |
//! | `FILTER`| 16.7 Hz    | 10 Hz      |
//! | `GAIN`  | gain 128   | gain 1     |
//!
//! `DOUT/RDY` goes low when a conversion is ready; it is sampled through a
//! separate input pin.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::error::DriverError;

/// Ready polls before [`Ad7780::wait_rdy_go_low`] gives up
pub const RDY_TIMEOUT_ITERATIONS: u32 = 0xFFFF;

/// Status byte bits
pub mod status {
    /// Conversion not yet available
    pub const RDY: u8 = 1 << 7;
    /// Output rate is 10 Hz
    pub const FILTER: u8 = 1 << 6;
    /// Result clamped or invalid
    pub const ERR: u8 = 1 << 5;
    /// Part identification, high bit
    pub const ID1: u8 = 1 << 4;
    /// Part identification, low bit (set on AD7780)
    pub const ID0: u8 = 1 << 3;
    /// Gain is 1
    pub const GAIN: u8 = 1 << 2;
    /// Status pattern, high bit
    pub const PAT1: u8 = 1 << 1;
    /// Status pattern, low bit
    pub const PAT0: u8 = 1 << 0;
}

/// Programmable gain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// Gain 1 (`GAIN` high)
    One,
    /// Gain 128 (`GAIN` low)
    OneTwentyEight,
}

impl Gain {
    /// Multiplier applied by the input amplifier
    #[must_use]
    pub const fn factor(self) -> u8 {
        match self {
            Self::One => 1,
            Self::OneTwentyEight => 128,
        }
    }
}

/// Digital filter / output data rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Filter {
    /// 16.7 Hz output rate (`FILTER` low)
    Hz16_7,
    /// 10 Hz output rate (`FILTER` high)
    Hz10,
}

/// Decoded status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u8);

impl Status {
    /// Pattern bits read `01` and ID0 is set
    #[must_use]
    pub const fn is_ad7780(self) -> bool {
        self.0 & (status::PAT1 | status::PAT0) == status::PAT0 && self.0 & status::ID0 != 0
    }

    /// The part flagged the conversion as invalid
    #[must_use]
    pub const fn has_error(self) -> bool {
        self.0 & status::ERR != 0
    }

    /// Gain the part reports it converted with
    #[must_use]
    pub const fn gain(self) -> Gain {
        if self.0 & status::GAIN != 0 {
            Gain::One
        } else {
            Gain::OneTwentyEight
        }
    }

    /// Filter the part reports it converted with
    #[must_use]
    pub const fn filter(self) -> Filter {
        if self.0 & status::FILTER != 0 {
            Filter::Hz10
        } else {
            Filter::Hz16_7
        }
    }
}

/// Convert a raw sample to millivolts.
///
/// `1000 * (raw / 2^23 - 1) * vref / gain`; midscale reads 0 mV.
#[must_use]
#[allow(clippy::cast_precision_loss)] // 24-bit samples are exact in f32
pub fn convert_to_voltage(raw: u32, vref: f32, gain: f32) -> f32 {
    1000.0 * (raw as f32 / 8_388_608.0 - 1.0) * vref / gain
}

/// AD7780 driver
pub struct Ad7780<SPI, RDY, PDRST, FILTER, GAIN> {
    spi: SPI,
    rdy: RDY,
    pdrst: PDRST,
    filter_pin: FILTER,
    gain_pin: GAIN,
    gain: Gain,
    filter: Filter,
    powered: bool,
}

impl<SPI, RDY, PDRST, FILTER, GAIN> Ad7780<SPI, RDY, PDRST, FILTER, GAIN>
where
    SPI: SpiDevice,
    RDY: InputPin,
    PDRST: OutputPin,
    FILTER: OutputPin,
    GAIN: OutputPin,
{
    /// Wrap the bus and pins. Nothing is driven until [`Ad7780::init`].
    pub fn new(spi: SPI, rdy: RDY, pdrst: PDRST, filter_pin: FILTER, gain_pin: GAIN) -> Self {
        Self {
            spi,
            rdy,
            pdrst,
            filter_pin,
            gain_pin,
            gain: Gain::One,
            filter: Filter::Hz16_7,
            powered: false,
        }
    }

    /// Power up with gain 1 and the 16.7 Hz filter, then check that the
    /// first conversion carries the AD7780 status pattern.
    pub fn init(&mut self) -> Result<Status, DriverError<SPI::Error>> {
        self.set_power(true)?;
        self.set_gain(Gain::One)?;
        self.set_filter(Filter::Hz16_7)?;

        self.wait_rdy_go_low()?;
        let (_, status) = self.read_sample()?;
        let status = Status(status);
        if !status.is_ad7780() {
            tracing::warn!(status = status.0, "AD7780 status pattern mismatch");
            return Err(DriverError::NoDevice);
        }
        tracing::debug!("AD7780 ready");
        Ok(status)
    }

    /// Poll `DOUT/RDY` until it reads low.
    pub fn wait_rdy_go_low(&mut self) -> Result<(), DriverError<SPI::Error>> {
        for _ in 0..RDY_TIMEOUT_ITERATIONS {
            if self.rdy.is_low().map_err(|_| DriverError::Pin)? {
                return Ok(());
            }
        }
        Err(DriverError::Timeout)
    }

    /// Clock out one conversion: `(24-bit sample, status byte)`.
    pub fn read_sample(&mut self) -> Result<(u32, u8), DriverError<SPI::Error>> {
        let mut buf = [0u8; 4];
        self.spi.read(&mut buf).map_err(DriverError::Bus)?;
        let [b0, b1, b2, st] = buf;
        let raw = u32::from_be_bytes([0, b0, b1, b2]);
        Ok((raw, st))
    }

    /// Wait for the next conversion and read it.
    pub fn read_when_ready(&mut self) -> Result<(u32, u8), DriverError<SPI::Error>> {
        self.wait_rdy_go_low()?;
        self.read_sample()
    }

    /// Drive the `GAIN` pin
    pub fn set_gain(&mut self, gain: Gain) -> Result<(), DriverError<SPI::Error>> {
        match gain {
            Gain::One => self.gain_pin.set_high(),
            Gain::OneTwentyEight => self.gain_pin.set_low(),
        }
        .map_err(|_| DriverError::Pin)?;
        self.gain = gain;
        Ok(())
    }

    /// Drive the `FILTER` pin
    pub fn set_filter(&mut self, filter: Filter) -> Result<(), DriverError<SPI::Error>> {
        match filter {
            Filter::Hz16_7 => self.filter_pin.set_low(),
            Filter::Hz10 => self.filter_pin.set_high(),
        }
        .map_err(|_| DriverError::Pin)?;
        self.filter = filter;
        Ok(())
    }

    /// Drive `PDRST`: high runs the converter, low powers it down
    pub fn set_power(&mut self, on: bool) -> Result<(), DriverError<SPI::Error>> {
        if on {
            self.pdrst.set_high()
        } else {
            self.pdrst.set_low()
        }
        .map_err(|_| DriverError::Pin)?;
        self.powered = on;
        Ok(())
    }

    /// Gain last driven onto the pin
    pub fn gain(&self) -> Gain {
        self.gain
    }

    /// Filter last driven onto the pin
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Whether `PDRST` is high
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Give back the bus and pins
    pub fn release(self) -> (SPI, RDY, PDRST, FILTER, GAIN) {
        (self.spi, self.rdy, self.pdrst, self.filter_pin, self.gain_pin)
    }
}
