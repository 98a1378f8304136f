//! PmodAD3 command set (AD7780)

use core::fmt::{self, Write};

use adi_drivers::ad7780::{self, Ad7780, Filter, Gain, Status};
use adi_drivers::DriverError;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::command::{param_index, report_error, Command, CommandInfo, CommandTable};
use crate::parameters::pmod_ad3::MAX_SAMPLES;

/// Number of PmodAD3 commands
pub const COMMANDS: usize = 9;

/// PmodAD3 board: an AD7780 and its reference
pub struct PmodAd3<SPI, RDY, PDRST, FILTER, GAIN> {
    adc: Ad7780<SPI, RDY, PDRST, FILTER, GAIN>,
    vref: f32,
}

impl<SPI, RDY, PDRST, FILTER, GAIN> PmodAd3<SPI, RDY, PDRST, FILTER, GAIN>
where
    SPI: SpiDevice,
    RDY: InputPin,
    PDRST: OutputPin,
    FILTER: OutputPin,
    GAIN: OutputPin,
{
    /// Board around `adc` with `vref` volts on REFIN
    pub fn new(adc: Ad7780<SPI, RDY, PDRST, FILTER, GAIN>, vref: f32) -> Self {
        Self { adc, vref }
    }

    /// Power up and identify the converter
    pub fn init(&mut self) -> Result<Status, DriverError<SPI::Error>> {
        self.adc.init()
    }

    /// The converter
    pub fn adc(&self) -> &Ad7780<SPI, RDY, PDRST, FILTER, GAIN> {
        &self.adc
    }

    /// Reference voltage
    pub fn vref(&self) -> f32 {
        self.vref
    }

    /// Wait for one conversion and return it in millivolts
    pub fn read_millivolts(&mut self) -> Result<f32, DriverError<SPI::Error>> {
        let (raw, _) = self.adc.read_when_ready()?;
        Ok(ad7780::convert_to_voltage(
            raw,
            self.vref,
            f32::from(self.adc.gain().factor()),
        ))
    }

    /// Mean of `samples` conversions in millivolts (`samples >= 1`)
    #[allow(clippy::cast_precision_loss)] // at most MAX_SAMPLES
    pub fn average_millivolts(&mut self, samples: u32) -> Result<f32, DriverError<SPI::Error>> {
        let samples = samples.max(1);
        let mut sum = 0.0f32;
        for _ in 0..samples {
            sum += self.read_millivolts()?;
        }
        Ok(sum / samples as f32)
    }

    /// Console commands for this board
    pub fn commands() -> CommandTable<Self, COMMANDS> {
        CommandTable::new([
            Command {
                info: CommandInfo {
                    name: "help?",
                    description: "Displays all available commands.",
                    accepted_value: "",
                    example: "help?",
                    min_params: 0,
                },
                handler: Self::help,
            },
            Command {
                info: CommandInfo {
                    name: "voltage?",
                    description: "Displays the voltage applied to AIN1(+) - AIN1(-) in mV.",
                    accepted_value: "",
                    example: "voltage?",
                    min_params: 0,
                },
                handler: Self::voltage,
            },
            Command {
                info: CommandInfo {
                    name: "samples?",
                    description: "Displays the average voltage of the given number of samples.",
                    accepted_value: "Accepted values: 1 .. 11024",
                    example: "samples?30",
                    min_params: 1,
                },
                handler: Self::samples,
            },
            Command {
                info: CommandInfo {
                    name: "gain=",
                    description: "Selects the PGA gain.",
                    accepted_value: "Accepted values: 0 - gain 128, 1 - gain 1",
                    example: "gain=0",
                    min_params: 1,
                },
                handler: Self::set_gain,
            },
            Command {
                info: CommandInfo {
                    name: "gain?",
                    description: "Displays the PGA gain.",
                    accepted_value: "",
                    example: "gain?",
                    min_params: 0,
                },
                handler: Self::get_gain,
            },
            Command {
                info: CommandInfo {
                    name: "filter=",
                    description: "Selects the output data rate.",
                    accepted_value: "Accepted values: 0 - 16.7 Hz, 1 - 10 Hz",
                    example: "filter=1",
                    min_params: 1,
                },
                handler: Self::set_filter,
            },
            Command {
                info: CommandInfo {
                    name: "filter?",
                    description: "Displays the output data rate.",
                    accepted_value: "",
                    example: "filter?",
                    min_params: 0,
                },
                handler: Self::get_filter,
            },
            Command {
                info: CommandInfo {
                    name: "power=",
                    description: "Powers the converter down or up.",
                    accepted_value: "Accepted values: 0 - power down, 1 - power up",
                    example: "power=1",
                    min_params: 1,
                },
                handler: Self::set_power,
            },
            Command {
                info: CommandInfo {
                    name: "status?",
                    description: "Reads one conversion and decodes its status byte.",
                    accepted_value: "",
                    example: "status?",
                    min_params: 0,
                },
                handler: Self::status,
            },
        ])
    }

    fn help(&mut self, out: &mut dyn Write, _: &[f64]) -> fmt::Result {
        Self::commands().display_cmd_list(out)
    }

    fn voltage(&mut self, out: &mut dyn Write, _: &[f64]) -> fmt::Result {
        match self.read_millivolts() {
            Ok(mv) => write!(out, "voltage={mv:.3} [mV]\r\n"),
            Err(e) => report_error(out, &e),
        }
    }

    fn samples(&mut self, out: &mut dyn Write, params: &[f64]) -> fmt::Result {
        let n = param_index(first(params), 1, MAX_SAMPLES);
        match self.average_millivolts(n) {
            Ok(mv) => write!(out, "samples={n} voltage={mv:.3} [mV]\r\n"),
            Err(e) => report_error(out, &e),
        }
    }

    fn set_gain(&mut self, out: &mut dyn Write, params: &[f64]) -> fmt::Result {
        let level = param_index(first(params), 0, u32::from(u8::MAX));
        let gain = if level == 0 {
            Gain::OneTwentyEight
        } else {
            Gain::One
        };
        if let Err(e) = self.adc.set_gain(gain) {
            return report_error(out, &e);
        }
        write!(out, "gain={level}\r\n")
    }

    fn get_gain(&mut self, out: &mut dyn Write, _: &[f64]) -> fmt::Result {
        write!(out, "gain={}\r\n", self.adc.gain().factor())
    }

    fn set_filter(&mut self, out: &mut dyn Write, params: &[f64]) -> fmt::Result {
        let level = param_index(first(params), 0, 1);
        let filter = if level == 0 {
            Filter::Hz16_7
        } else {
            Filter::Hz10
        };
        if let Err(e) = self.adc.set_filter(filter) {
            return report_error(out, &e);
        }
        write!(out, "filter={level}\r\n")
    }

    fn get_filter(&mut self, out: &mut dyn Write, _: &[f64]) -> fmt::Result {
        let filter = self.adc.filter();
        write!(
            out,
            "filter={} ({})\r\n",
            filter_level(filter),
            filter_rate(filter)
        )
    }

    fn set_power(&mut self, out: &mut dyn Write, params: &[f64]) -> fmt::Result {
        let on = param_index(first(params), 0, 1) == 1;
        if let Err(e) = self.adc.set_power(on) {
            return report_error(out, &e);
        }
        write!(out, "power={}\r\n", u8::from(on))
    }

    fn status(&mut self, out: &mut dyn Write, _: &[f64]) -> fmt::Result {
        let status = match self.adc.read_when_ready() {
            Ok((_, st)) => Status(st),
            Err(e) => return report_error(out, &e),
        };
        write!(out, "status=0x{:02X}\r\n", status.0)?;
        write!(
            out,
            "  part: {}, error: {}, gain: {}, filter: {}\r\n",
            if status.is_ad7780() { "AD7780" } else { "unknown" },
            if status.has_error() { "yes" } else { "no" },
            status.gain().factor(),
            filter_rate(status.filter()),
        )
    }
}

fn first(params: &[f64]) -> f64 {
    params.first().copied().unwrap_or(0.0)
}

fn filter_level(filter: Filter) -> u8 {
    match filter {
        Filter::Hz16_7 => 0,
        Filter::Hz10 => 1,
    }
}

fn filter_rate(filter: Filter) -> &'static str {
    match filter {
        Filter::Hz16_7 => "16.7 Hz",
        Filter::Hz10 => "10 Hz",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use noos::mocks::{MockPin, MockSpi};

    type Board = PmodAd3<MockSpi, MockPin, MockPin, MockPin, MockPin>;

    fn board() -> (Board, MockSpi, MockPin) {
        let spi = MockSpi::new();
        let gain = MockPin::new();
        let adc = Ad7780::new(
            spi.clone(),
            MockPin::new(),
            MockPin::new(),
            MockPin::new(),
            gain.clone(),
        );
        (PmodAd3::new(adc, 2.5), spi, gain)
    }

    #[test]
    fn average_of_two_samples() {
        let (mut b, spi, _) = board();
        // midscale, then three quarters of full scale
        spi.queue_read(&[0x80, 0x00, 0x00, 0x0D, 0xC0, 0x00, 0x00, 0x0D]);
        let mv = b.average_millivolts(2).unwrap();
        assert!((mv - 625.0).abs() < 1e-3);
    }

    #[test]
    fn gain_command_prints_applied_byte() {
        let (mut b, _, gain_pin) = board();
        let mut out = String::new();
        Board::commands().dispatch(&mut b, "gain=5", &mut out).unwrap();
        assert_eq!(out, "gain=5\r\n");
        assert!(gain_pin.level());
        assert_eq!(b.adc().gain(), Gain::One);
    }

    #[test]
    fn fractional_gain_is_truncated() {
        let (mut b, _, gain_pin) = board();
        let mut out = String::new();
        Board::commands().dispatch(&mut b, "gain=0.5", &mut out).unwrap();
        assert_eq!(out, "gain=0\r\n");
        assert!(!gain_pin.level());
        assert_eq!(b.adc().gain(), Gain::OneTwentyEight);

        out.clear();
        Board::commands().dispatch(&mut b, "gain=300", &mut out).unwrap();
        assert_eq!(out, "gain=255\r\n");
        assert_eq!(b.adc().gain(), Gain::One);
    }

    #[test]
    fn help_lists_every_command() {
        let (mut b, _, _) = board();
        let mut out = String::new();
        Board::commands().dispatch(&mut b, "help?", &mut out).unwrap();
        for cmd in Board::commands().commands() {
            assert!(out.contains(cmd.info.name));
        }
    }
}
