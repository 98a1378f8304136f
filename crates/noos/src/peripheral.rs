//! Peripheral descriptors (SPI, I2C, UART)
//!
//! Each bus has an init-parameter struct, a platform-ops trait that turns
//! those parameters into a concrete bus, and a descriptor that drivers hold.
//! Descriptors are generic over the bus type so no type-erased `extra`
//! pointer is needed.

use embedded_hal::i2c::I2c;
use embedded_hal::spi::{Operation, SpiDevice};
use embedded_io::{Read, ReadReady, Write};

use crate::error::{Errno, Result};

/// SPI modes (CPOL, CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiMode {
    /// Mode 0: CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    /// Equivalent `embedded-hal` mode
    pub const fn to_hal(self) -> embedded_hal::spi::Mode {
        match self {
            Self::Mode0 => embedded_hal::spi::MODE_0,
            Self::Mode1 => embedded_hal::spi::MODE_1,
            Self::Mode2 => embedded_hal::spi::MODE_2,
            Self::Mode3 => embedded_hal::spi::MODE_3,
        }
    }
}

/// Bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first
    #[default]
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// SPI init parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiInitParam {
    /// Controller index
    pub device_id: u32,
    /// Maximum clock frequency in Hz
    pub max_speed_hz: u32,
    /// Chip-select line
    pub chip_select: u8,
    /// Clock polarity and phase
    pub mode: SpiMode,
    /// Bit order
    pub bit_order: BitOrder,
}

/// One segment of an SPI message
pub type SpiMsg<'a> = Operation<'a, u8>;

/// Platform SPI vtable
pub trait SpiPlatformOps {
    /// Bus type handed out by this platform
    type Bus: SpiDevice;

    /// Bring up the controller and chip select described by `param`
    fn init(&mut self, param: &SpiInitParam) -> Result<Self::Bus>;
}

/// SPI descriptor
#[derive(Debug)]
pub struct SpiDesc<B> {
    param: SpiInitParam,
    bus: B,
}

impl<B: SpiDevice> SpiDesc<B> {
    /// Initialise through the platform. A zero clock is rejected.
    pub fn init<O>(ops: &mut O, param: &SpiInitParam) -> Result<Self>
    where
        O: SpiPlatformOps<Bus = B>,
    {
        if param.max_speed_hz == 0 {
            return Err(Errno::InvalidArgument);
        }
        let bus = ops.init(param)?;
        tracing::debug!(
            device_id = param.device_id,
            cs = param.chip_select,
            hz = param.max_speed_hz,
            "spi init"
        );
        Ok(Self { param: *param, bus })
    }

    /// Wrap an already configured bus
    pub fn from_bus(param: SpiInitParam, bus: B) -> Self {
        Self { param, bus }
    }

    /// Parameters this descriptor was created with
    pub fn param(&self) -> &SpiInitParam {
        &self.param
    }

    /// Full-duplex transfer in place: `data` is shifted out and overwritten
    /// with what was shifted in.
    pub fn write_and_read(&mut self, data: &mut [u8]) -> Result<()> {
        if data.is_empty() {
            return Err(Errno::InvalidArgument);
        }
        self.bus.transfer_in_place(data).map_err(Errno::io)
    }

    /// Run several segments under one chip-select assertion
    pub fn transfer(&mut self, msgs: &mut [SpiMsg<'_>]) -> Result<()> {
        if msgs.is_empty() {
            return Err(Errno::InvalidArgument);
        }
        self.bus.transaction(msgs).map_err(Errno::io)
    }

    /// Borrow the bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the bus
    pub fn remove(self) -> B {
        self.bus
    }
}

/// I2C init parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cInitParam {
    /// Controller index
    pub device_id: u32,
    /// Bus clock in Hz
    pub max_speed_hz: u32,
    /// 7-bit target address
    pub slave_address: u8,
}

/// Platform I2C vtable
pub trait I2cPlatformOps {
    /// Bus type handed out by this platform
    type Bus: I2c;

    /// Bring up the controller described by `param`
    fn init(&mut self, param: &I2cInitParam) -> Result<Self::Bus>;
}

/// I2C descriptor bound to one target address
#[derive(Debug)]
pub struct I2cDesc<B> {
    param: I2cInitParam,
    bus: B,
}

impl<B: I2c> I2cDesc<B> {
    /// Initialise through the platform. Addresses above 0x7F are rejected.
    pub fn init<O>(ops: &mut O, param: &I2cInitParam) -> Result<Self>
    where
        O: I2cPlatformOps<Bus = B>,
    {
        if param.slave_address > 0x7F || param.max_speed_hz == 0 {
            return Err(Errno::InvalidArgument);
        }
        let bus = ops.init(param)?;
        tracing::debug!(
            device_id = param.device_id,
            addr = param.slave_address,
            "i2c init"
        );
        Ok(Self { param: *param, bus })
    }

    /// Wrap an already configured bus
    pub fn from_bus(param: I2cInitParam, bus: B) -> Self {
        Self { param, bus }
    }

    /// Target address
    pub fn address(&self) -> u8 {
        self.param.slave_address
    }

    /// Write `data`. With `stop == false` the transaction is expected to
    /// continue with a read; `embedded-hal` has no dangling-start state, so
    /// callers that need a repeated start should use [`Self::write_read`].
    pub fn write(&mut self, data: &[u8], stop: bool) -> Result<()> {
        if !stop {
            tracing::trace!("i2c write without stop issued as a complete transaction");
        }
        self.bus
            .write(self.param.slave_address, data)
            .map_err(Errno::io)
    }

    /// Read into `buf`
    pub fn read(&mut self, buf: &mut [u8], _stop: bool) -> Result<()> {
        self.bus
            .read(self.param.slave_address, buf)
            .map_err(Errno::io)
    }

    /// Write then read with a repeated start
    pub fn write_read(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        self.bus
            .write_read(self.param.slave_address, write, read)
            .map_err(Errno::io)
    }

    /// Release the bus
    pub fn remove(self) -> B {
        self.bus
    }
}

/// Data bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    /// 5 data bits
    Five,
    /// 6 data bits
    Six,
    /// 7 data bits
    Seven,
    /// 8 data bits
    #[default]
    Eight,
}

/// Parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    /// No parity
    #[default]
    None,
    /// Mark parity
    Mark,
    /// Space parity
    Space,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    /// 1 stop bit
    #[default]
    One,
    /// 2 stop bits
    Two,
}

/// UART init parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartInitParam {
    /// Controller index
    pub device_id: u32,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits
    pub size: DataBits,
    /// Parity
    pub parity: Parity,
    /// Stop bits
    pub stop: StopBits,
}

impl UartInitParam {
    /// 8N1 at `baud_rate`
    pub const fn new(device_id: u32, baud_rate: u32) -> Self {
        Self {
            device_id,
            baud_rate,
            size: DataBits::Eight,
            parity: Parity::None,
            stop: StopBits::One,
        }
    }
}

/// Platform UART vtable
pub trait UartPlatformOps {
    /// Port type handed out by this platform
    type Port: Read + Write + ReadReady;

    /// Bring up the port described by `param`
    fn init(&mut self, param: &UartInitParam) -> Result<Self::Port>;
}

/// UART descriptor
#[derive(Debug)]
pub struct UartDesc<U> {
    param: UartInitParam,
    port: U,
}

impl<U: Read + Write + ReadReady> UartDesc<U> {
    /// Initialise through the platform. A zero baud rate is rejected.
    pub fn init<O>(ops: &mut O, param: &UartInitParam) -> Result<Self>
    where
        O: UartPlatformOps<Port = U>,
    {
        if param.baud_rate == 0 {
            return Err(Errno::InvalidArgument);
        }
        let port = ops.init(param)?;
        tracing::debug!(device_id = param.device_id, baud = param.baud_rate, "uart init");
        Ok(Self { param: *param, port })
    }

    /// Wrap an already configured port
    pub fn from_port(param: UartInitParam, port: U) -> Self {
        Self { param, port }
    }

    /// Baud rate
    pub fn baud_rate(&self) -> u32 {
        self.param.baud_rate
    }

    /// Write all of `data` and flush. Returns the byte count.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.port.write_all(data).map_err(Errno::io)?;
        self.port.flush().map_err(Errno::io)?;
        Ok(data.len())
    }

    /// Block until `buf` is full
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.port.read_exact(buf).map_err(Errno::io)?;
        Ok(buf.len())
    }

    /// Read whatever is pending, possibly nothing
    pub fn read_nonblocking(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || !self.port.read_ready().map_err(Errno::io)? {
            return Ok(0);
        }
        self.port.read(buf).map_err(Errno::io)
    }

    /// Borrow the port
    pub fn port_mut(&mut self) -> &mut U {
        &mut self.port
    }

    /// Release the port
    pub fn remove(self) -> U {
        self.port
    }
}
