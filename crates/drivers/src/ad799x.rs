//! AD7991 / AD7995 / AD7999 4-channel I2C ADCs (PmodAD2)
//!
//! The parts have a single write-only configuration byte. Reading two bytes
//! returns the next conversion tagged with the channel it came from.
//!
//! # I2C Address
//!
//! | Part          | Address |
//! |---------------|---------|
//! | AD7991-0 / AD7995-0 / AD7999-0 | `0x28` |
//! | AD7991-1 / AD7995-1 / AD7999-1 | `0x29` |

use embedded_hal::i2c::I2c;

use crate::error::DriverError;

/// Address of the `-0` variants
pub const ADDR_0: u8 = 0x28;
/// Address of the `-1` variants
pub const ADDR_1: u8 = 0x29;

/// Number of analog inputs
pub const CHANNELS: u8 = 4;

/// Configuration byte bits
pub mod config {
    /// Channel `n` selects bit `4 + n`
    pub const CH_SHIFT: u8 = 4;
    /// External reference on VIN3 instead of VDD
    pub const REF_SEL: u8 = 1 << 3;
    /// SDA/SCL glitch filter bypassed when set
    pub const FLTR: u8 = 1 << 2;
    /// Bit-trial delay enabled
    pub const BIT_TRIAL_DELAY: u8 = 1 << 1;
    /// Sample-interval delay enabled
    pub const SAMPLE_DELAY: u8 = 1 << 0;
}

/// Which member of the family is fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Part {
    /// 12-bit
    Ad7991,
    /// 10-bit
    Ad7995,
    /// 8-bit
    Ad7999,
}

impl Part {
    /// Resolution in bits
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Ad7991 => 12,
            Self::Ad7995 => 10,
            Self::Ad7999 => 8,
        }
    }
}

/// Configuration byte builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Channels converted in round-robin, bit `n` = channel `n`
    pub channels: u8,
    /// Use the external reference
    pub external_ref: bool,
    /// Bypass the SDA/SCL filter
    pub filter_bypass: bool,
    /// Enable the bit-trial delay
    pub bit_trial_delay: bool,
    /// Enable the sample-interval delay
    pub sample_delay: bool,
}

impl Config {
    /// Single channel, everything else off
    #[must_use]
    pub const fn channel(ch: u8) -> Self {
        Self {
            channels: 1 << (ch & 3),
            external_ref: false,
            filter_bypass: false,
            bit_trial_delay: false,
            sample_delay: false,
        }
    }

    /// Encode as the register byte
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        let mut b = (self.channels & 0x0F) << config::CH_SHIFT;
        if self.external_ref {
            b |= config::REF_SEL;
        }
        if self.filter_bypass {
            b |= config::FLTR;
        }
        if self.bit_trial_delay {
            b |= config::BIT_TRIAL_DELAY;
        }
        if self.sample_delay {
            b |= config::SAMPLE_DELAY;
        }
        b
    }

    /// Decode a register byte
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        Self {
            channels: b >> config::CH_SHIFT,
            external_ref: b & config::REF_SEL != 0,
            filter_bypass: b & config::FLTR != 0,
            bit_trial_delay: b & config::BIT_TRIAL_DELAY != 0,
            sample_delay: b & config::SAMPLE_DELAY != 0,
        }
    }
}

/// Convert a raw result to volts: `raw * vref / 2^bits`
#[must_use]
pub fn convert_to_volts(raw: u16, vref: f32, bits: u8) -> f32 {
    let full = libm::ldexpf(1.0, i32::from(bits));
    f32::from(raw) * vref / full
}

/// AD799x driver
pub struct Ad799x<I> {
    i2c: I,
    address: u8,
    part: Part,
    config: u8,
}

impl<I: I2c> Ad799x<I> {
    /// Wrap the bus. The configuration byte is assumed to be at its reset
    /// value (all channels, VDD reference).
    pub fn new(i2c: I, address: u8, part: Part) -> Self {
        Self {
            i2c,
            address,
            part,
            config: 0xF0,
        }
    }

    /// Part resolution
    pub fn bits_number(&self) -> u8 {
        self.part.bits()
    }

    /// Part fitted
    pub fn part(&self) -> Part {
        self.part
    }

    /// I2C address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Last configuration byte written
    pub fn configuration(&self) -> u8 {
        self.config
    }

    /// Write the configuration byte
    pub fn set_configuration(&mut self, config: u8) -> Result<(), DriverError<I::Error>> {
        self.i2c
            .write(self.address, &[config])
            .map_err(DriverError::Bus)?;
        self.config = config;
        tracing::trace!(config, "AD799x configuration");
        Ok(())
    }

    /// Read the next conversion: `(value, channel)`.
    ///
    /// The value is right-aligned to the part resolution.
    pub fn get_conversion_result(&mut self) -> Result<(u16, u8), DriverError<I::Error>> {
        let mut buf = [0u8; 2];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(DriverError::Bus)?;
        let [hi, lo] = buf;
        let channel = (hi >> 4) & 0x3;
        let word = (u16::from(hi & 0x0F) << 8) | u16::from(lo);
        Ok((word >> 12u8.saturating_sub(self.part.bits()), channel))
    }

    /// Convert a raw result with this part's resolution
    pub fn convert_to_volts(&self, raw: u16, vref: f32) -> f32 {
        convert_to_volts(raw, vref, self.part.bits())
    }

    /// Select `ch` alone, keeping the reference and delay settings, then
    /// read one conversion.
    pub fn read_channel(&mut self, ch: u8) -> Result<u16, DriverError<I::Error>> {
        if ch >= CHANNELS {
            return Err(DriverError::InvalidArgument);
        }
        let config = (self.config & 0x0F) | (1 << (config::CH_SHIFT + ch));
        self.set_configuration(config)?;
        let (value, _) = self.get_conversion_result()?;
        Ok(value)
    }

    /// Give back the bus
    pub fn release(self) -> I {
        self.i2c
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    #[test]
    fn zero_is_zero_volts() {
        for part in [Part::Ad7991, Part::Ad7995, Part::Ad7999] {
            assert_eq!(convert_to_volts(0, 3.3, part.bits()), 0.0);
        }
    }

    #[test]
    fn full_code_within_one_lsb_of_vref() {
        for part in [Part::Ad7991, Part::Ad7995, Part::Ad7999] {
            let bits = part.bits();
            let top = (1u16 << bits) - 1;
            let lsb = 2.5 / f32::from(1u16 << bits);
            let v = convert_to_volts(top, 2.5, bits);
            assert!(v >= 0.0 && 2.5 - v <= lsb * 1.001, "{part:?}");
        }
    }

    #[test]
    fn config_byte_layout() {
        let c = Config {
            channels: 0b0101,
            external_ref: true,
            filter_bypass: false,
            bit_trial_delay: true,
            sample_delay: false,
        };
        assert_eq!(c.to_byte(), 0b0101_1010);
        assert_eq!(Config::from_byte(0b0101_1010), c);
        assert_eq!(Config::channel(2).to_byte(), 0x40);
    }

    #[test]
    fn twelve_bit_result_and_channel() {
        let mut i2c = I2cMock::new(&[Transaction::read(ADDR_0, vec![0x2A, 0xBC])]);
        let mut adc = Ad799x::new(i2c.clone(), ADDR_0, Part::Ad7991);
        assert_eq!(adc.get_conversion_result().unwrap(), (0xABC, 2));
        i2c.done();
    }

    #[test]
    fn eight_bit_result_is_right_aligned() {
        let mut i2c = I2cMock::new(&[Transaction::read(ADDR_1, vec![0x3F, 0xF0])]);
        let mut adc = Ad799x::new(i2c.clone(), ADDR_1, Part::Ad7999);
        assert_eq!(adc.get_conversion_result().unwrap(), (0xFF, 3));
        i2c.done();
    }

    #[test]
    fn read_channel_keeps_reference_bits() {
        let mut i2c = I2cMock::new(&[
            Transaction::write(ADDR_0, vec![0x18]),
            Transaction::write(ADDR_0, vec![0x88]),
            Transaction::read(ADDR_0, vec![0x38, 0x00]),
        ]);
        let mut adc = Ad799x::new(i2c.clone(), ADDR_0, Part::Ad7991);
        adc.set_configuration(0x18).unwrap();
        assert_eq!(adc.read_channel(3).unwrap(), 0x800);
        assert_eq!(adc.configuration(), 0x88);
        i2c.done();
    }

    #[test]
    fn channel_out_of_range_touches_nothing() {
        let mut i2c = I2cMock::new(&[]);
        let mut adc = Ad799x::new(i2c.clone(), ADDR_0, Part::Ad7995);
        assert_eq!(adc.read_channel(4), Err(DriverError::InvalidArgument));
        assert_eq!(adc.bits_number(), 10);
        i2c.done();
    }
}
