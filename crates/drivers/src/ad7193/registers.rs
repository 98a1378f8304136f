//! AD7193 register map
//!
//! Every access starts with a write to the communications register, which
//! selects the target register and the direction of the following bytes.

use noos::util::{bit, genmask};

// Communications register
/// Write-enable bit; must be 0 for the access to proceed
pub const COMM_WEN: u8 = 1 << 7;
/// Next operation is a read
pub const COMM_READ: u8 = 1 << 6;
/// Continuous read of the data register
pub const COMM_CREAD: u8 = 1 << 2;

/// Communications byte addressing `reg`
#[must_use]
pub const fn comm_addr(reg: u8) -> u8 {
    (reg & 0x7) << 3
}

/// On-chip registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Status (read-only; shares the address of the comm register)
    Status,
    /// Mode
    Mode,
    /// Configuration
    Conf,
    /// Conversion result
    Data,
    /// Part identification
    Id,
    /// General-purpose output control
    GpoCon,
    /// Offset calibration
    Offset,
    /// Full-scale calibration
    FullScale,
}

impl Register {
    /// Register select field value
    #[must_use]
    pub const fn addr(self) -> u8 {
        match self {
            Self::Status => 0,
            Self::Mode => 1,
            Self::Conf => 2,
            Self::Data => 3,
            Self::Id => 4,
            Self::GpoCon => 5,
            Self::Offset => 6,
            Self::FullScale => 7,
        }
    }

    /// Width in bytes
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Status | Self::Id | Self::GpoCon => 1,
            Self::Mode | Self::Conf | Self::Data | Self::Offset | Self::FullScale => 3,
        }
    }
}

// Status register
/// Conversion not ready (active low)
pub const STAT_RDY: u32 = bit(7);
/// Result clamped or invalid
pub const STAT_ERR: u32 = bit(6);
/// Reference missing
pub const STAT_NOREF: u32 = bit(5);
/// Parity of the data register
pub const STAT_PARITY: u32 = bit(4);
/// Channel the result came from
pub const STAT_CHD: u32 = genmask(3, 0);

// Mode register
/// Operating mode select
pub const MODE_SEL: u32 = genmask(23, 21);
/// Append the status byte to data reads
pub const MODE_DAT_STA: u32 = bit(20);
/// Clock source select
pub const MODE_CLKSRC: u32 = genmask(19, 18);
/// Sinc3 filter
pub const MODE_SINC3: u32 = bit(15);
/// Parity check on the data register
pub const MODE_ENPAR: u32 = bit(13);
/// Single-cycle conversion
pub const MODE_SINGLE: u32 = bit(11);
/// 60 Hz rejection
pub const MODE_REJ60: u32 = bit(10);
/// Filter output data rate select
pub const MODE_RATE: u32 = genmask(9, 0);

/// Internal 4.92 MHz clock, CLK2 tristated
pub const CLK_INT: u32 = 2;
/// Filter word used for single and continuous conversions
pub const RATE_DEFAULT: u32 = 0x060;

/// Operating modes (MODE_SEL values)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpMode {
    /// Continuous conversion
    Continuous = 0,
    /// Single conversion
    Single = 1,
    /// Idle
    Idle = 2,
    /// Power-down
    PowerDown = 3,
    /// Internal zero-scale calibration
    InternalZeroCal = 4,
    /// Internal full-scale calibration
    InternalFullCal = 5,
    /// System zero-scale calibration
    SystemZeroCal = 6,
    /// System full-scale calibration
    SystemFullCal = 7,
}

// Configuration register
/// Chop enable
pub const CONF_CHOP: u32 = bit(23);
/// REFIN2 selected
pub const CONF_REFSEL: u32 = bit(20);
/// Pseudo-differential inputs
pub const CONF_PSEUDO: u32 = bit(18);
/// Channel select, one bit per channel
pub const CONF_CHAN: u32 = genmask(17, 8);
/// Burnout currents
pub const CONF_BURN: u32 = bit(7);
/// Reference detect
pub const CONF_REFDET: u32 = bit(6);
/// Input buffer
pub const CONF_BUF: u32 = bit(4);
/// Unipolar coding
pub const CONF_UNIPOLAR: u32 = bit(3);
/// PGA gain select
pub const CONF_GAIN: u32 = genmask(2, 0);

/// Temperature sensor channel
pub const CH_TEMP: u8 = 8;
/// Internal short (AIN2-AIN2)
pub const CH_SHORT: u8 = 9;

/// Low nibble of the ID register
pub const ID_MASK: u32 = 0x0F;
/// AD7193 identification
pub const ID_AD7193: u32 = 0x02;

/// Power-on value of the configuration register
pub const CONF_RESET: u32 = 0x00_0117;
