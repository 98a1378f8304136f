//! Mock implementations for testing
//!
//! Recording mocks for every bus the drivers use. Each mock is a cheap
//! handle around shared state: clone it before handing it to a driver and
//! keep the clone as a probe.

#![cfg(any(test, feature = "std"))]

mod delay;
mod i2c;
mod pin;
mod platform;
mod spi;
mod uart;

pub use delay::NoopDelay;
pub use i2c::MockI2c;
pub use pin::MockPin;
pub use platform::MockPlatform;
pub use spi::MockSpi;
pub use uart::MockUart;

/// Error raised by the mocks when a fault is injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Target did not acknowledge
    Nack,
    /// Generic bus fault
    Bus,
}

impl embedded_hal::spi::Error for MockError {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}

impl embedded_hal::i2c::Error for MockError {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        match self {
            Self::Nack => embedded_hal::i2c::ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Address,
            ),
            Self::Bus => embedded_hal::i2c::ErrorKind::Bus,
        }
    }
}

impl embedded_hal::digital::Error for MockError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl embedded_io::Error for MockError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}
