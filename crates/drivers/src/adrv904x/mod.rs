//! ADRV904X register bitfield access
//!
//! The transceiver is programmed through 32-bit addressed registers behind
//! a SPI or AHB bridge. Bitfields are described as tables of
//! [`Segment`]s: each segment is one masked register write, so a field that
//! straddles byte registers is several segments. Accessors validate every
//! argument before the first bus access.

pub mod cddc_hb_dpath;

pub use cddc_hb_dpath::{CddcHbDpath, CddcHbDpathChanAddr};

/// Masked 32-bit register access.
///
/// `value` is already aligned to `mask`; implementations only merge it into
/// the register.
pub trait Register32Access {
    /// Transport error
    type Error;

    /// `reg = (reg & !mask) | (value & mask)`
    fn write32(&mut self, addr: u32, value: u32, mask: u32) -> Result<(), Self::Error>;

    /// `reg & mask`, not shifted
    fn read32(&mut self, addr: u32, mask: u32) -> Result<u32, Self::Error>;
}

impl<T: Register32Access + ?Sized> Register32Access for &mut T {
    type Error = T::Error;

    fn write32(&mut self, addr: u32, value: u32, mask: u32) -> Result<(), Self::Error> {
        (**self).write32(addr, value, mask)
    }

    fn read32(&mut self, addr: u32, mask: u32) -> Result<u32, Self::Error> {
        (**self).read32(addr, mask)
    }
}

/// One masked register write making up part of a bitfield.
///
/// `shift` moves field bits into register position: positive shifts left,
/// negative shifts right (upper bytes of wide fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Byte offset from the block base
    pub offset: u32,
    /// Register bits this segment owns
    pub mask: u32,
    /// Field-to-register shift
    pub shift: i8,
}

impl Segment {
    /// Segment at `offset` taking field bits unshifted
    #[must_use]
    pub const fn new(offset: u32, mask: u32) -> Self {
        Self {
            offset,
            mask,
            shift: 0,
        }
    }

    /// Segment with a field-to-register shift
    #[must_use]
    pub const fn shifted(offset: u32, mask: u32, shift: i8) -> Self {
        Self {
            offset,
            mask,
            shift,
        }
    }

    /// Register value for field `value`
    #[must_use]
    pub const fn place(self, value: u32) -> u32 {
        let s = self.shift.unsigned_abs() as u32;
        if self.shift >= 0 {
            value.wrapping_shl(s)
        } else {
            value.wrapping_shr(s)
        }
    }

    /// Field bits contributed by masked register value `reg`
    #[must_use]
    pub const fn extract(self, reg: u32) -> u32 {
        let s = self.shift.unsigned_abs() as u32;
        let reg = reg & self.mask;
        if self.shift >= 0 {
            reg.wrapping_shr(s)
        } else {
            reg.wrapping_shl(s)
        }
    }
}

/// Bitfield layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Field name, for logs
    pub name: &'static str,
    /// Register writes, in bus order
    pub segments: &'static [Segment],
    /// Largest legal value
    pub max: u32,
    /// Per-channel fields repeat every `stride` bytes; 0 for block-wide fields
    pub stride: u32,
}

/// Valid channel ids for per-channel fields
pub const MAX_CHANNEL_ID: u8 = 7;

/// Register stride between per-channel copies of a field
pub const CHANNEL_STRIDE: u32 = 28;

impl BitField {
    /// Whether the field is replicated per channel
    #[must_use]
    pub const fn is_per_channel(&self) -> bool {
        self.stride != 0
    }

    /// Write `value` into the block at `base`.
    ///
    /// Checks the value, then the channel id, then writes every segment.
    pub fn write<A: Register32Access>(
        &self,
        bus: &mut A,
        base: u32,
        channel: Option<u8>,
        value: u32,
    ) -> Result<(), crate::DriverError<A::Error>> {
        if value > self.max {
            tracing::debug!(field = self.name, value, "bitfield value out of range");
            return Err(crate::DriverError::InvalidArgument);
        }
        let origin = self.origin(base, channel)?;
        for seg in self.segments {
            bus.write32(origin.wrapping_add(seg.offset), seg.place(value), seg.mask)
                .map_err(crate::DriverError::Bus)?;
        }
        Ok(())
    }

    /// Read the field from the block at `base`
    pub fn read<A: Register32Access>(
        &self,
        bus: &mut A,
        base: u32,
        channel: Option<u8>,
    ) -> Result<u32, crate::DriverError<A::Error>> {
        let origin = self.origin(base, channel)?;
        let mut value = 0;
        for seg in self.segments {
            let reg = bus
                .read32(origin.wrapping_add(seg.offset), seg.mask)
                .map_err(crate::DriverError::Bus)?;
            value |= seg.extract(reg);
        }
        Ok(value)
    }

    fn origin<E>(&self, base: u32, channel: Option<u8>) -> Result<u32, crate::DriverError<E>> {
        match (self.is_per_channel(), channel) {
            (false, None) => Ok(base),
            (true, Some(ch)) if ch <= MAX_CHANNEL_ID => {
                Ok(base.wrapping_add(u32::from(ch).wrapping_mul(self.stride)))
            }
            _ => Err(crate::DriverError::InvalidArgument),
        }
    }
}
