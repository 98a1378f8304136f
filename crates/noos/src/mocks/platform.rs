use std::collections::HashMap;
use std::vec::Vec;

use super::{MockI2c, MockPin, MockSpi, MockUart};
use crate::error::{Errno, Result};
use crate::gpio::{GpioInitParam, GpioPlatformOps};
use crate::irq::{IrqHandler, IrqId, IrqPlatformOps};
use crate::peripheral::{
    I2cInitParam, I2cPlatformOps, SpiInitParam, SpiPlatformOps, UartInitParam, UartPlatformOps,
};

/// Platform that hands out shared mock buses and records every request
#[derive(Default)]
pub struct MockPlatform {
    spi: MockSpi,
    i2c: MockI2c,
    uart: MockUart,
    pins: HashMap<u32, MockPin>,
    spi_inits: Vec<SpiInitParam>,
    i2c_inits: Vec<I2cInitParam>,
    handlers: HashMap<IrqId, IrqHandler>,
    enabled: Vec<IrqId>,
    fail_init: bool,
}

impl MockPlatform {
    /// Fresh platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `init`/`get` fail with `Io`
    pub fn set_fail_init(&mut self, fail: bool) {
        self.fail_init = fail;
    }

    /// Probe for the SPI bus
    pub fn spi(&self) -> MockSpi {
        self.spi.clone()
    }

    /// Probe for the I2C bus
    pub fn i2c(&self) -> MockI2c {
        self.i2c.clone()
    }

    /// Probe for the UART
    pub fn uart(&self) -> MockUart {
        self.uart.clone()
    }

    /// Probe for pin `number`, created on first use
    pub fn pin(&mut self, number: u32) -> MockPin {
        self.pins.entry(number).or_default().clone()
    }

    /// SPI init requests seen so far
    pub fn spi_inits(&self) -> &[SpiInitParam] {
        &self.spi_inits
    }

    /// I2C init requests seen so far
    pub fn i2c_inits(&self) -> &[I2cInitParam] {
        &self.i2c_inits
    }

    /// Whether `irq` has a registered handler
    pub fn has_handler(&self, irq: IrqId) -> bool {
        self.handlers.contains_key(&irq)
    }

    /// Whether `irq` is unmasked
    pub fn is_enabled(&self, irq: IrqId) -> bool {
        self.enabled.contains(&irq)
    }

    fn check(&self) -> Result<()> {
        if self.fail_init {
            Err(Errno::Io)
        } else {
            Ok(())
        }
    }
}

impl SpiPlatformOps for MockPlatform {
    type Bus = MockSpi;

    fn init(&mut self, param: &SpiInitParam) -> Result<MockSpi> {
        self.check()?;
        self.spi_inits.push(*param);
        Ok(self.spi.clone())
    }
}

impl I2cPlatformOps for MockPlatform {
    type Bus = MockI2c;

    fn init(&mut self, param: &I2cInitParam) -> Result<MockI2c> {
        self.check()?;
        self.i2c_inits.push(*param);
        Ok(self.i2c.clone())
    }
}

impl UartPlatformOps for MockPlatform {
    type Port = MockUart;

    fn init(&mut self, _param: &UartInitParam) -> Result<MockUart> {
        self.check()?;
        Ok(self.uart.clone())
    }
}

impl GpioPlatformOps for MockPlatform {
    type Pin = MockPin;

    fn get(&mut self, param: &GpioInitParam) -> Result<MockPin> {
        self.check()?;
        Ok(self.pin(param.number))
    }
}

impl IrqPlatformOps for MockPlatform {
    fn register_callback(&mut self, irq: IrqId, handler: IrqHandler) -> Result<()> {
        self.handlers.insert(irq, handler);
        Ok(())
    }

    fn unregister_callback(&mut self, irq: IrqId) -> Result<()> {
        self.handlers.remove(&irq).map(|_| ()).ok_or(Errno::InvalidArgument)
    }

    fn enable(&mut self, irq: IrqId) -> Result<()> {
        if !self.enabled.contains(&irq) {
            self.enabled.push(irq);
        }
        Ok(())
    }

    fn disable(&mut self, irq: IrqId) -> Result<()> {
        self.enabled.retain(|&i| i != irq);
        Ok(())
    }

    fn set_priority(&mut self, _irq: IrqId, _priority: u8) -> Result<()> {
        Ok(())
    }

    fn global_enable(&mut self) -> Result<()> {
        Ok(())
    }

    fn global_disable(&mut self) -> Result<()> {
        Ok(())
    }
}
