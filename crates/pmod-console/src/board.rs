//! Board bring-up through the platform layer
//!
//! Claims the buses and pins listed in [`crate::parameters`] from a
//! platform shim and hands back an initialised board.

use adi_drivers::ad7780::Ad7780;
use adi_drivers::ad799x::{Ad799x, Part};
use noos::gpio::{GpioDesc, GpioInitParam, GpioPlatformOps, PinState};
use noos::peripheral::{I2cDesc, I2cPlatformOps, SpiDesc, SpiPlatformOps};
use noos::Errno;

use crate::parameters::{pmod_ad2, pmod_ad3};
use crate::pmod_ad2::PmodAd2;
use crate::pmod_ad3::PmodAd3;

/// PmodAD3 as built by [`bring_up_ad3`]
pub type PlatformAd3<O> = PmodAd3<
    <O as SpiPlatformOps>::Bus,
    <O as GpioPlatformOps>::Pin,
    <O as GpioPlatformOps>::Pin,
    <O as GpioPlatformOps>::Pin,
    <O as GpioPlatformOps>::Pin,
>;

/// Bring up the PmodAD3: SPI, RDY as input, control pins as outputs,
/// then identify the AD7780.
pub fn bring_up_ad3<O>(ops: &mut O) -> Result<PlatformAd3<O>, Errno>
where
    O: SpiPlatformOps + GpioPlatformOps,
{
    let spi = SpiDesc::init(ops, &pmod_ad3::SPI)?.remove();
    let rdy = GpioDesc::get(ops, &pmod_ad3::GPIO_RDY)?.remove();
    let pdrst = output(ops, &pmod_ad3::GPIO_PDRST, PinState::Low)?;
    let filter = output(ops, &pmod_ad3::GPIO_FILTER, PinState::Low)?;
    let gain = output(ops, &pmod_ad3::GPIO_GAIN, PinState::High)?;

    let mut board = PmodAd3::new(
        Ad7780::new(spi, rdy, pdrst, filter, gain),
        pmod_ad3::VREF_VOLTS,
    );
    board.init()?;
    tracing::info!("PmodAD3 ready");
    Ok(board)
}

/// Bring up the PmodAD2 and write its initial configuration
pub fn bring_up_ad2<O>(ops: &mut O) -> Result<PmodAd2<<O as I2cPlatformOps>::Bus>, Errno>
where
    O: I2cPlatformOps,
{
    let desc = I2cDesc::init(ops, &pmod_ad2::I2C)?;
    let address = desc.address();
    let adc = Ad799x::new(desc.remove(), address, Part::Ad7991);

    let mut board = PmodAd2::new(adc, pmod_ad2::VDD_VOLTS, pmod_ad2::EXT_REF_VOLTS);
    board.init()?;
    tracing::info!(address, "PmodAD2 ready");
    Ok(board)
}

fn output<O: GpioPlatformOps>(
    ops: &mut O,
    param: &GpioInitParam,
    level: PinState,
) -> Result<O::Pin, Errno> {
    let mut desc = GpioDesc::get(ops, param)?;
    desc.direction_output(level)?;
    Ok(desc.remove())
}
