//! PmodAD2 command set (AD7991, with a MAX6613 on one input)

use core::fmt::{self, Write};

use adi_drivers::ad799x::{Ad799x, Config};
use adi_drivers::max6613::{Ad799xChannel, Max6613};
use adi_drivers::DriverError;
use embedded_hal::i2c::I2c;

use crate::command::{param_index, report_error, Command, CommandInfo, CommandTable};
use crate::parameters::pmod_ad2::MAX_CHANNEL;

/// Number of PmodAD2 commands
pub const COMMANDS: usize = 7;

/// PmodAD2 board: an AD7991 and its two reference options
pub struct PmodAd2<I> {
    adc: Ad799x<I>,
    vdd: f32,
    ext_ref: f32,
}

impl<I: I2c> PmodAd2<I> {
    /// Board around `adc`. `vdd` is used while REF_SEL is clear,
    /// `ext_ref` once `vref=1` selects the external reference.
    pub fn new(adc: Ad799x<I>, vdd: f32, ext_ref: f32) -> Self {
        Self { adc, vdd, ext_ref }
    }

    /// Select channel 0 with the supply as reference and the I2C filter on
    pub fn init(&mut self) -> Result<(), DriverError<I::Error>> {
        self.adc.set_configuration(Config::channel(0).to_byte())
    }

    /// The converter
    pub fn adc(&self) -> &Ad799x<I> {
        &self.adc
    }

    /// Reference currently selected, in volts
    pub fn vref(&self) -> f32 {
        if self.config().external_ref {
            self.ext_ref
        } else {
            self.vdd
        }
    }

    /// Convert `channel` and return the raw result
    pub fn read_raw(&mut self, channel: u8) -> Result<u16, DriverError<I::Error>> {
        self.adc.read_channel(channel)
    }

    /// Convert `channel` and return volts
    pub fn read_volts(&mut self, channel: u8) -> Result<f32, DriverError<I::Error>> {
        let raw = self.adc.read_channel(channel)?;
        Ok(self.adc.convert_to_volts(raw, self.vref()))
    }

    /// Temperature of a MAX6613 wired to `channel`
    pub fn read_temperature(&mut self, channel: u8) -> Result<f32, DriverError<I::Error>> {
        let vref = self.vref();
        Max6613::new(Ad799xChannel::new(&mut self.adc, channel, vref)).read_temperature()
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
                    description: "Displays the voltage on the selected channel in V.",
                    accepted_value: "Accepted values: 0 .. 3",
                    example: "voltage?1",
                    min_params: 1,
                },
                handler: Self::voltage,
            },
            Command {
                info: CommandInfo {
                    name: "rawData?",
                    description: "Displays the raw conversion result of the selected channel.",
                    accepted_value: "Accepted values: 0 .. 3",
                    example: "rawData?2",
                    min_params: 1,
                },
                handler: Self::raw_data,
            },
            Command {
                info: CommandInfo {
                    name: "vref=",
                    description: "Selects the reference.",
                    accepted_value: "Accepted values: 0 - VDD, 1 - external reference",
                    example: "vref=1",
                    min_params: 1,
                },
                handler: Self::set_vref,
            },
            Command {
                info: CommandInfo {
                    name: "vref?",
                    description: "Displays the selected reference.",
                    accepted_value: "",
                    example: "vref?",
                    min_params: 0,
                },
                handler: Self::get_vref,
            },
            Command {
                info: CommandInfo {
                    name: "filter=",
                    description: "Enables or bypasses the SDA/SCL glitch filter.",
                    accepted_value: "Accepted values: 0 - filter on, 1 - filter bypassed",
                    example: "filter=0",
                    min_params: 1,
                },
                handler: Self::set_filter,
            },
            Command {
                info: CommandInfo {
                    name: "temperature?",
                    description: "Displays the temperature of a MAX6613 on the selected channel.",
                    accepted_value: "Accepted values: 0 .. 3",
                    example: "temperature?0",
                    min_params: 1,
                },
                handler: Self::temperature,
            },
        ])
    }

    fn config(&self) -> Config {
        Config::from_byte(self.adc.configuration())
    }

    fn update_config(
        &mut self,
        update: impl FnOnce(&mut Config),
    ) -> Result<(), DriverError<I::Error>> {
        let mut config = self.config();
        update(&mut config);
        self.adc.set_configuration(config.to_byte())
    }

    fn help(&mut self, out: &mut dyn Write, _: &[f64]) -> fmt::Result {
        Self::commands().display_cmd_list(out)
    }

    fn voltage(&mut self, out: &mut dyn Write, params: &[f64]) -> fmt::Result {
        let ch = channel(params);
        match self.read_volts(ch) {
            Ok(v) => write!(out, "voltage[{ch}]={v:.3} [V]\r\n"),
            Err(e) => report_error(out, &e),
        }
    }

    fn raw_data(&mut self, out: &mut dyn Write, params: &[f64]) -> fmt::Result {
        let ch = channel(params);
        match self.read_raw(ch) {
            Ok(raw) => write!(out, "rawData[{ch}]={raw}\r\n"),
            Err(e) => report_error(out, &e),
        }
    }

    fn set_vref(&mut self, out: &mut dyn Write, params: &[f64]) -> fmt::Result {
        let external = param_index(first(params), 0, 1) == 1;
        if let Err(e) = self.update_config(|c| c.external_ref = external) {
            return report_error(out, &e);
        }
        write!(out, "vref={}\r\n", u8::from(external))
    }

    fn get_vref(&mut self, out: &mut dyn Write, _: &[f64]) -> fmt::Result {
        let source = if self.config().external_ref {
            "external"
        } else {
            "VDD"
        };
        write!(out, "vref={source} ({:.3} V)\r\n", self.vref())
    }

    fn set_filter(&mut self, out: &mut dyn Write, params: &[f64]) -> fmt::Result {
        let bypass = param_index(first(params), 0, 1) == 1;
        if let Err(e) = self.update_config(|c| c.filter_bypass = bypass) {
            return report_error(out, &e);
        }
        write!(out, "filter={}\r\n", u8::from(bypass))
    }

    fn temperature(&mut self, out: &mut dyn Write, params: &[f64]) -> fmt::Result {
        let ch = channel(params);
        match self.read_temperature(ch) {
            Ok(t) => write!(out, "temperature[{ch}]={t:.2} [C]\r\n"),
            Err(e) => report_error(out, &e),
        }
    }
}

fn first(params: &[f64]) -> f64 {
    params.first().copied().unwrap_or(0.0)
}

/// Channel parameter clamped to the AD7991 inputs
fn channel(params: &[f64]) -> u8 {
    let ch = param_index(first(params), 0, MAX_CHANNEL);
    u8::try_from(ch).unwrap_or(0)
}
