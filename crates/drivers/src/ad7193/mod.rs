//! AD7193 4.8 kHz 24-bit sigma-delta ADC with PGA (PmodAD5)
//!
//! Register access goes through the communications byte (see
//! [`registers`]). Readiness is polled through the status register with the
//! same fixed iteration budget as the AD7780 driver.

pub mod registers;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Operation, SpiDevice};
use noos::util::{field_get, field_prep};

use self::registers::*;
use crate::error::DriverError;

/// Status polls before [`Ad7193::wait_rdy_go_low`] gives up
pub const RDY_TIMEOUT_ITERATIONS: u32 = 0xFFFF;

/// Input coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Offset binary, zero differential input at midscale
    Bipolar,
    /// Straight binary, zero input at code 0
    Unipolar,
}

/// PGA gain (codes 1 and 2 are reserved on the part)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// ±2.5 V input range at 2.5 V reference
    X1 = 0,
    /// ±312.5 mV
    X8 = 3,
    /// ±156.2 mV
    X16 = 4,
    /// ±78.125 mV
    X32 = 5,
    /// ±39.06 mV
    X64 = 6,
    /// ±19.53 mV
    X128 = 7,
}

impl Gain {
    /// Multiplier applied by the PGA
    #[must_use]
    pub const fn factor(self) -> u32 {
        1 << (self as u32)
    }

    /// Decode the CONF gain field
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::X1),
            3 => Some(Self::X8),
            4 => Some(Self::X16),
            5 => Some(Self::X32),
            6 => Some(Self::X64),
            7 => Some(Self::X128),
            _ => None,
        }
    }
}

/// Convert a 24-bit result to volts for the given range.
#[must_use]
#[allow(clippy::cast_precision_loss)] // 24-bit codes are exact in f32
pub fn convert_to_volts(raw: u32, vref: f32, gain: Gain, polarity: Polarity) -> f32 {
    let gain = gain.factor() as f32;
    let raw = raw as f32;
    match polarity {
        Polarity::Bipolar => (raw / 8_388_608.0 - 1.0) * vref / gain,
        Polarity::Unipolar => raw / 16_777_216.0 * vref / gain,
    }
}

/// Temperature-sensor result to °C
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn temperature_from_raw(raw: u32) -> f32 {
    (raw as f32 - 8_388_608.0) / 2815.0 - 273.0
}

/// AD7193 driver
pub struct Ad7193<SPI> {
    spi: SPI,
    gain: Gain,
    polarity: Polarity,
}

impl<SPI: SpiDevice> Ad7193<SPI> {
    /// Wrap the bus. The cached range matches the power-on configuration.
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            gain: Gain::X128,
            polarity: Polarity::Bipolar,
        }
    }

    /// Reset the serial interface and check the part ID.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), DriverError<SPI::Error>> {
        self.reset()?;
        // 500 µs before the registers are accessible again
        delay.delay_us(500);

        let id = self.get_register(Register::Id)?;
        if id & ID_MASK != ID_AD7193 {
            tracing::warn!(id, "AD7193 ID mismatch");
            return Err(DriverError::NoDevice);
        }
        self.gain = Gain::X128;
        self.polarity = Polarity::Bipolar;
        tracing::debug!("AD7193 ready");
        Ok(())
    }

    /// 40 consecutive ones on DIN reset the interface and all registers.
    pub fn reset(&mut self) -> Result<(), DriverError<SPI::Error>> {
        self.spi.write(&[0xFF; 6]).map_err(DriverError::Bus)
    }

    /// Write `value` to `reg`, most significant byte first
    pub fn set_register(&mut self, reg: Register, value: u32) -> Result<(), DriverError<SPI::Error>> {
        let size = reg.size();
        let mut buf = [0u8; 4];
        let [first, rest @ ..] = &mut buf;
        *first = comm_addr(reg.addr());
        for (dst, src) in rest.iter_mut().zip(value.to_be_bytes().iter().skip(4 - size)) {
            *dst = *src;
        }
        let frame = buf.get(..=size).ok_or(DriverError::InvalidArgument)?;
        self.spi.write(frame).map_err(DriverError::Bus)
    }

    /// Read `reg`
    pub fn get_register(&mut self, reg: Register) -> Result<u32, DriverError<SPI::Error>> {
        let size = reg.size();
        let comm = [COMM_READ | comm_addr(reg.addr())];
        let mut buf = [0u8; 3];
        let rx = buf.get_mut(..size).ok_or(DriverError::InvalidArgument)?;
        self.spi
            .transaction(&mut [Operation::Write(&comm), Operation::Read(rx)])
            .map_err(DriverError::Bus)?;
        Ok(buf
            .iter()
            .take(size)
            .fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
    }

    /// Poll the status register until RDY clears.
    pub fn wait_rdy_go_low(&mut self) -> Result<(), DriverError<SPI::Error>> {
        for _ in 0..RDY_TIMEOUT_ITERATIONS {
            if self.get_register(Register::Status)? & STAT_RDY == 0 {
                return Ok(());
            }
        }
        Err(DriverError::Timeout)
    }

    fn modify_register(
        &mut self,
        reg: Register,
        clear: u32,
        set: u32,
    ) -> Result<(), DriverError<SPI::Error>> {
        let old = self.get_register(reg)?;
        self.set_register(reg, (old & !clear) | set)
    }

    fn set_mode(&mut self, mode: OpMode) -> Result<(), DriverError<SPI::Error>> {
        self.modify_register(Register::Mode, MODE_SEL, field_prep(MODE_SEL, mode as u32))
    }

    /// Idle when `on`, power-down otherwise
    pub fn set_power(&mut self, on: bool) -> Result<(), DriverError<SPI::Error>> {
        self.set_mode(if on { OpMode::Idle } else { OpMode::PowerDown })
    }

    /// Route `channel` (0..=7, [`CH_TEMP`], [`CH_SHORT`]) to the modulator
    pub fn channel_select(&mut self, channel: u8) -> Result<(), DriverError<SPI::Error>> {
        if channel > CH_SHORT {
            return Err(DriverError::InvalidArgument);
        }
        let chan = field_prep(CONF_CHAN, 1 << channel);
        self.modify_register(Register::Conf, CONF_CHAN, chan)
    }

    /// Program input coding and PGA gain
    pub fn range_setup(
        &mut self,
        polarity: Polarity,
        gain: Gain,
    ) -> Result<(), DriverError<SPI::Error>> {
        let mut set = field_prep(CONF_GAIN, gain as u32);
        if polarity == Polarity::Unipolar {
            set |= CONF_UNIPOLAR;
        }
        self.modify_register(Register::Conf, CONF_UNIPOLAR | CONF_GAIN, set)?;
        self.polarity = polarity;
        self.gain = gain;
        Ok(())
    }

    /// Run one of the calibration modes on `channel` and wait for it to end
    pub fn calibrate(&mut self, mode: OpMode, channel: u8) -> Result<(), DriverError<SPI::Error>> {
        if (mode as u32) < OpMode::InternalZeroCal as u32 {
            return Err(DriverError::InvalidArgument);
        }
        self.channel_select(channel)?;
        self.set_mode(mode)?;
        self.wait_rdy_go_low()
    }

    fn conversion_mode(mode: OpMode) -> u32 {
        field_prep(MODE_SEL, mode as u32) | field_prep(MODE_CLKSRC, CLK_INT) | RATE_DEFAULT
    }

    /// Start a single conversion and return its result
    pub fn single_conversion(&mut self) -> Result<u32, DriverError<SPI::Error>> {
        self.set_register(Register::Mode, Self::conversion_mode(OpMode::Single))?;
        self.wait_rdy_go_low()?;
        self.get_register(Register::Data)
    }

    /// Average `samples` results of a continuous conversion
    pub fn continuous_read_avg(&mut self, samples: u32) -> Result<u32, DriverError<SPI::Error>> {
        if samples == 0 {
            return Err(DriverError::InvalidArgument);
        }
        self.set_register(Register::Mode, Self::conversion_mode(OpMode::Continuous))?;
        let mut sum = 0u64;
        for _ in 0..samples {
            self.wait_rdy_go_low()?;
            sum = sum.saturating_add(u64::from(self.get_register(Register::Data)?));
        }
        Ok(u32::try_from(sum / u64::from(samples)).unwrap_or(u32::MAX))
    }

    /// Read the on-chip temperature sensor, in °C.
    ///
    /// Leaves the part on the temperature channel, bipolar, gain 1.
    pub fn temperature_read(&mut self) -> Result<f32, DriverError<SPI::Error>> {
        self.range_setup(Polarity::Bipolar, Gain::X1)?;
        self.channel_select(CH_TEMP)?;
        let raw = self.single_conversion()?;
        Ok(temperature_from_raw(raw))
    }

    /// Convert a result using the range last set by [`Ad7193::range_setup`]
    pub fn convert_to_volts(&self, raw: u32, vref: f32) -> f32 {
        convert_to_volts(raw, vref, self.gain, self.polarity)
    }

    /// Range cached from the last [`Ad7193::range_setup`]
    pub fn range(&self) -> (Polarity, Gain) {
        (self.polarity, self.gain)
    }

    /// Gain field of a configuration word
    pub fn gain_of(conf: u32) -> Option<Gain> {
        Gain::from_code(field_get(CONF_GAIN, conf))
    }

    /// Give back the bus
    pub fn release(self) -> SPI {
        self.spi
    }
}
