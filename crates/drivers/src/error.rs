//! Driver error type

use noos::Errno;

/// Error returned by the chip drivers.
///
/// `E` is the bus error of the SPI or I2C implementation. GPIO errors are
/// collapsed into [`DriverError::Pin`] because a driver usually owns several
/// pins with unrelated error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError<E> {
    /// SPI or I2C transfer failed
    #[error("bus error: {0:?}")]
    Bus(E),
    /// A control or ready pin could not be driven or sampled
    #[error("gpio error")]
    Pin,
    /// A ready poll exhausted its iteration budget
    #[error("timed out waiting for the device")]
    Timeout,
    /// Parameter outside the range the part accepts
    #[error("invalid argument")]
    InvalidArgument,
    /// The part did not identify itself as expected
    #[error("device not found")]
    NoDevice,
}

impl<E> From<DriverError<E>> for Errno {
    fn from(err: DriverError<E>) -> Self {
        match err {
            DriverError::Bus(_) | DriverError::Pin => Errno::Io,
            DriverError::Timeout => Errno::Timeout,
            DriverError::InvalidArgument => Errno::InvalidArgument,
            DriverError::NoDevice => Errno::NoDevice,
        }
    }
}
