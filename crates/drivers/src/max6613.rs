//! MAX6613 low-voltage analog temperature sensor
//!
//! The sensor outputs a voltage that falls linearly with temperature:
//! `Vout = 1845.5 mV - 11.23 mV/°C * T`. Any ADC channel that can report
//! millivolts is a valid front end.

use embedded_hal::i2c::I2c;

use crate::ad799x::Ad799x;
use crate::error::DriverError;

/// Output voltage at 0 °C, in millivolts
pub const OFFSET_MV: f32 = 1845.5;
/// Output slope, in millivolts per °C (negative going)
pub const SLOPE_MV_PER_C: f32 = 11.23;

/// Source of a single analog reading
pub trait AnalogInput {
    /// Error raised by the converter
    type Error;

    /// Sample the input, in millivolts
    fn read_millivolts(&mut self) -> Result<f32, Self::Error>;
}

/// Sensor output voltage to temperature
#[must_use]
pub fn voltage_to_celsius(millivolts: f32) -> f32 {
    (OFFSET_MV - millivolts) / SLOPE_MV_PER_C
}

/// Temperature to expected sensor output voltage
#[must_use]
pub fn celsius_to_voltage(celsius: f32) -> f32 {
    OFFSET_MV - SLOPE_MV_PER_C * celsius
}

/// MAX6613 behind an analog input
pub struct Max6613<A> {
    input: A,
}

impl<A: AnalogInput> Max6613<A> {
    /// Use `input` as the sensor's front end
    pub fn new(input: A) -> Self {
        Self { input }
    }

    /// Temperature in °C
    pub fn read_temperature(&mut self) -> Result<f32, A::Error> {
        let mv = self.input.read_millivolts()?;
        Ok(voltage_to_celsius(mv))
    }

    /// Give back the front end
    pub fn release(self) -> A {
        self.input
    }
}

/// One AD799x channel seen as an [`AnalogInput`]
pub struct Ad799xChannel<'a, I> {
    adc: &'a mut Ad799x<I>,
    channel: u8,
    vref: f32,
}

impl<'a, I: I2c> Ad799xChannel<'a, I> {
    /// Borrow `adc` and read `channel` against `vref` volts
    pub fn new(adc: &'a mut Ad799x<I>, channel: u8, vref: f32) -> Self {
        Self { adc, channel, vref }
    }
}

impl<I: I2c> AnalogInput for Ad799xChannel<'_, I> {
    type Error = DriverError<I::Error>;

    fn read_millivolts(&mut self) -> Result<f32, Self::Error> {
        let raw = self.adc.read_channel(self.channel)?;
        Ok(self.adc.convert_to_volts(raw, self.vref) * 1000.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::ad799x::{Part, ADDR_0};
    use noos::mocks::MockI2c;

    struct Fixed(f32);

    impl AnalogInput for Fixed {
        type Error = ();

        fn read_millivolts(&mut self) -> Result<f32, ()> {
            Ok(self.0)
        }
    }

    #[test]
    fn zero_celsius_at_offset() {
        assert!(voltage_to_celsius(OFFSET_MV).abs() < 1e-6);
    }

    #[test]
    fn room_temperature() {
        let mut s = Max6613::new(Fixed(celsius_to_voltage(25.0)));
        let t = s.read_temperature().unwrap();
        assert!((t - 25.0).abs() < 1e-3);
    }

    #[test]
    fn reads_through_ad7991() {
        let i2c = MockI2c::new();
        // 1.5 V of 3.0 V full scale on channel 1
        i2c.queue_read(ADDR_0, &[0x18, 0x00]);
        let mut adc = Ad799x::new(i2c.clone(), ADDR_0, Part::Ad7991);

        let mut sensor = Max6613::new(Ad799xChannel::new(&mut adc, 1, 3.0));
        let t = sensor.read_temperature().unwrap();

        assert!((t - voltage_to_celsius(1500.0)).abs() < 1e-3);
        assert_eq!(i2c.writes_to(ADDR_0), vec![vec![0x20]]);
    }
}
