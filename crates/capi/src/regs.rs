//! Register access
//!
//! Drivers in this crate never dereference raw addresses directly; they go
//! through [`RegisterBlock`] so the same code runs against the silicon
//! ([`Mmio`]) or against a RAM-backed [`RegisterFile`] on the host.

use core::sync::atomic::{AtomicU32, Ordering};

/// 32-bit register block addressed by byte offset
pub trait RegisterBlock {
    /// Read the register at `offset`
    fn read(&self, offset: usize) -> u32;

    /// Write the register at `offset`
    fn write(&self, offset: usize, value: u32);

    /// Read-modify-write: clear `clear`, then set `set`
    fn modify(&self, offset: usize, clear: u32, set: u32) {
        let v = self.read(offset);
        self.write(offset, (v & !clear) | set);
    }
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for &T {
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value);
    }
}

/// Volatile memory-mapped register block
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// MAX32655 DMA controller base address
    pub const MAX32655_DMA_BASE: usize = 0x4002_8000;

    /// Wrap the block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the address of a peripheral register block that is
    /// valid for volatile 32-bit access at every offset the driver uses, and
    /// no other code may hold a conflicting handle to it.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    fn ptr(&self, offset: usize) -> *mut u32 {
        self.base.wrapping_add(offset) as *mut u32
    }
}

impl RegisterBlock for Mmio {
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `Mmio::new` requires `base + offset` to be a valid,
        // aligned peripheral register.
        unsafe { core::ptr::read_volatile(self.ptr(offset)) }
    }

    fn write(&self, offset: usize, value: u32) {
        // SAFETY: see `read`.
        unsafe { core::ptr::write_volatile(self.ptr(offset), value) }
    }
}

/// RAM-backed register file of `N` words.
///
/// Offsets past the end read as zero and ignore writes. Registers can be
/// marked write-1-to-clear with [`RegisterFile::set_w1c`]; [`RegisterFile::raise`]
/// plays the hardware side and sets bits regardless of that marking.
#[derive(Debug)]
pub struct RegisterFile<const N: usize> {
    words: [AtomicU32; N],
    w1c: [AtomicU32; N],
}

impl<const N: usize> Default for RegisterFile<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RegisterFile<N> {
    /// All registers zero, none write-1-to-clear
    pub fn new() -> Self {
        Self {
            words: core::array::from_fn(|_| AtomicU32::new(0)),
            w1c: core::array::from_fn(|_| AtomicU32::new(0)),
        }
    }

    /// Bits of the register at `offset` that clear when written with 1
    pub fn set_w1c(&self, offset: usize, mask: u32) {
        if let Some(w) = self.w1c.get(offset / 4) {
            w.store(mask, Ordering::Relaxed);
        }
    }

    /// Set bits from the hardware side
    pub fn raise(&self, offset: usize, bits: u32) {
        if let Some(w) = self.words.get(offset / 4) {
            w.fetch_or(bits, Ordering::SeqCst);
        }
    }

    /// Current value without side effects
    pub fn peek(&self, offset: usize) -> u32 {
        self.read(offset)
    }
}

impl<const N: usize> RegisterBlock for RegisterFile<N> {
    fn read(&self, offset: usize) -> u32 {
        self.words
            .get(offset / 4)
            .map_or(0, |w| w.load(Ordering::SeqCst))
    }

    fn write(&self, offset: usize, value: u32) {
        let (Some(word), Some(w1c)) = (self.words.get(offset / 4), self.w1c.get(offset / 4)) else {
            return;
        };
        let mask = w1c.load(Ordering::Relaxed);
        if mask == 0 {
            word.store(value, Ordering::SeqCst);
            return;
        }
        let old = word.load(Ordering::SeqCst);
        word.store((old & mask & !value) | (value & !mask), Ordering::SeqCst);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn plain_register_stores_value() {
        let regs = RegisterFile::<4>::new();
        regs.write(0x4, 0xDEAD_BEEF);
        assert_eq!(regs.read(0x4), 0xDEAD_BEEF);
    }

    #[test]
    fn out_of_range_offset_is_inert() {
        let regs = RegisterFile::<2>::new();
        regs.write(0x40, 1);
        assert_eq!(regs.read(0x40), 0);
    }

    #[test]
    fn w1c_bits_clear_on_one_and_others_write_through() {
        let regs = RegisterFile::<2>::new();
        regs.set_w1c(0x0, 0b0110);
        regs.raise(0x0, 0b0111);
        regs.write(0x0, 0b0100);
        assert_eq!(regs.read(0x0), 0b0010);
    }

    #[test]
    fn modify_clears_then_sets() {
        let regs = RegisterFile::<1>::new();
        regs.write(0, 0xF0);
        regs.modify(0, 0x30, 0x01);
        assert_eq!(regs.read(0), 0xC1);
    }

    #[test]
    fn reference_forwards() {
        let regs = RegisterFile::<1>::new();
        let r = &regs;
        r.write(0, 5);
        assert_eq!(regs.peek(0), 5);
    }
}
