//! Board parameters
//!
//! Compile-time pin, bus and reference settings for the MAX32655 FTHR
//! carrying the Pmod. Change them here and rebuild.

use noos::gpio::GpioInitParam;
use noos::peripheral::{BitOrder, I2cInitParam, SpiInitParam, SpiMode, UartInitParam};

/// Console UART
pub const UART: UartInitParam = UartInitParam::new(0, 115_200);

/// Longest console line
pub const LINE_LEN: usize = 64;

/// PmodAD3 (AD7780) wiring
pub mod pmod_ad3 {
    use super::{BitOrder, GpioInitParam, SpiInitParam, SpiMode};

    /// SPI controller and chip select
    pub const SPI: SpiInitParam = SpiInitParam {
        device_id: 1,
        max_speed_hz: 1_000_000,
        chip_select: 0,
        mode: SpiMode::Mode3,
        bit_order: BitOrder::MsbFirst,
    };

    /// DOUT/RDY, sampled while idle
    pub const GPIO_RDY: GpioInitParam = GpioInitParam::new(23);
    /// Power-down / reset
    pub const GPIO_PDRST: GpioInitParam = GpioInitParam::new(19);
    /// Output rate select
    pub const GPIO_FILTER: GpioInitParam = GpioInitParam::new(18);
    /// PGA gain select
    pub const GPIO_GAIN: GpioInitParam = GpioInitParam::new(17);

    /// Reference voltage on REFIN
    pub const VREF_VOLTS: f32 = 2.5;

    /// Largest `samples?` count
    pub const MAX_SAMPLES: u32 = 11024;
}

/// PmodAD2 (AD7991) wiring
pub mod pmod_ad2 {
    use super::I2cInitParam;

    /// I2C controller and target address
    pub const I2C: I2cInitParam = I2cInitParam {
        device_id: 1,
        max_speed_hz: 400_000,
        slave_address: adi_drivers::ad799x::ADDR_0,
    };

    /// Supply, used as the reference when REF_SEL is clear
    pub const VDD_VOLTS: f32 = 3.3;
    /// External reference on VIN3/REFIN
    pub const EXT_REF_VOLTS: f32 = 2.048;

    /// Highest channel selectable from the console
    pub const MAX_CHANNEL: u32 = 3;
}
