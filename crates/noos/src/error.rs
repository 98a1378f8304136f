//! errno-style error codes
//!
//! Every bus operation and driver entry point fails with one of these
//! variants. [`Errno::code`] yields the negative errno integer, so a
//! C-facing shim can forward it unchanged.

/// Result type for bus and driver operations
pub type Result<T> = core::result::Result<T, Errno>;

/// Negative-errno error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Errno {
    /// `-EINVAL`: a parameter is out of range or a handle is not initialised
    #[error("invalid argument")]
    InvalidArgument,
    /// `-ENOMEM`: no room left in a fixed-capacity table
    #[error("out of memory")]
    OutOfMemory,
    /// `-EBUSY`: the resource is in use (e.g. a DMA transfer is active)
    #[error("resource busy")]
    Busy,
    /// `-EIO`: the underlying bus reported an error
    #[error("bus I/O error")]
    Io,
    /// `-ETIMEDOUT`: a polling loop exhausted its iteration budget
    #[error("operation timed out")]
    Timeout,
    /// `-ENODEV`: the device did not identify itself as expected
    #[error("no such device")]
    NoDevice,
    /// `-EOPNOTSUPP`: the platform does not implement the operation
    #[error("operation not supported")]
    NotSupported,
}

impl Errno {
    /// Negative errno value
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidArgument => -22,
            Self::OutOfMemory => -12,
            Self::Busy => -16,
            Self::Io => -5,
            Self::Timeout => -110,
            Self::NoDevice => -19,
            Self::NotSupported => -95,
        }
    }

    /// Inverse of [`Errno::code`]. Unknown codes map to `None`.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -22 => Some(Self::InvalidArgument),
            -12 => Some(Self::OutOfMemory),
            -16 => Some(Self::Busy),
            -5 => Some(Self::Io),
            -110 => Some(Self::Timeout),
            -19 => Some(Self::NoDevice),
            -95 => Some(Self::NotSupported),
            _ => None,
        }
    }

    /// Collapse a bus-specific error into [`Errno::Io`].
    ///
    /// Intended for `map_err(Errno::io)` at the descriptor boundary.
    #[must_use]
    pub fn io<E>(_err: E) -> Self {
        Self::Io
    }
}
