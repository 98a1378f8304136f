//! MAX32655 DMA controller
//!
//! One controller with up to [`MAX_CHANNELS`] channels. Every channel has a
//! 0x20-byte register block at `0x100 + ch * 0x20`; the controller itself
//! has an interrupt-enable and an interrupt-flag register.
//!
//! Transfers complete in the controller ISR ([`CapiDma::isr`]), which
//! clears the channel's active flag before running the completion callback.
//! The channel accepts a new `config_xfer` once `isr` returns.
//!
//! Register map (MAX32655 UG, "Standard DMA"):
//!
//! | Offset | Register | Notes |
//! |--------|----------|-------|
//! | 0x000 | INTEN | one enable bit per channel |
//! | 0x004 | INTFL | one pending bit per channel, mirrors STATUS.IPEND |
//! | 0x100 + ch*0x20 | CTRL .. CNT_RLD | channel block |

#![allow(clippy::arithmetic_side_effects)] // offsets are bounded by MAX_CHANNELS

use alloc::boxed::Box;

use noos::util::{bit, field_prep, genmask};
use noos::{DmaBuffer, DmaBufferMut, Errno, Owned, Result};

use crate::regs::RegisterBlock;

/// Channels on the MAX32655 standard DMA controller
pub const MAX_CHANNELS: usize = 8;

/// Largest transfer the 24-bit CNT register can describe
pub const MAX_TRANSFER_LEN: usize = 0xFF_FFFF;

/// Request-select value for memory-to-memory transfers
pub const REQUEST_MEMTOMEM: u8 = 0;

// ── Controller registers ────────────────────────────────────────────────────
/// Interrupt enable, one bit per channel
pub const REG_INTEN: usize = 0x000;
/// Interrupt flags, one bit per channel
pub const REG_INTFL: usize = 0x004;

// ── Channel block ───────────────────────────────────────────────────────────
const CHAN_BASE: usize = 0x100;
const CHAN_STRIDE: usize = 0x20;

/// Channel control
pub const CH_CTRL: usize = 0x00;
/// Channel status
pub const CH_STATUS: usize = 0x04;
/// Source address
pub const CH_SRC: usize = 0x08;
/// Destination address
pub const CH_DST: usize = 0x0C;
/// Byte count
pub const CH_CNT: usize = 0x10;
/// Source reload
pub const CH_SRC_RLD: usize = 0x14;
/// Destination reload
pub const CH_DST_RLD: usize = 0x18;
/// Count reload
pub const CH_CNT_RLD: usize = 0x1C;

/// Byte offset of register `reg` in channel `ch`'s block
pub const fn chan_reg(ch: usize, reg: usize) -> usize {
    CHAN_BASE + ch * CHAN_STRIDE + reg
}

/// CTRL bits
pub mod ctrl {
    use noos::util::{bit, genmask};

    /// Channel enable
    pub const EN: u32 = bit(0);
    /// Reload enable
    pub const RLDEN: u32 = bit(1);
    /// Priority (0 = highest)
    pub const PRI: u32 = genmask(3, 2);
    /// Request select
    pub const REQUEST: u32 = genmask(9, 4);
    /// Source width
    pub const SRCWD: u32 = genmask(17, 16);
    /// Source increment
    pub const SRCINC: u32 = bit(18);
    /// Destination width
    pub const DSTWD: u32 = genmask(21, 20);
    /// Destination increment
    pub const DSTINC: u32 = bit(22);
    /// Burst size minus one, in bytes
    pub const BURST_SIZE: u32 = genmask(28, 24);
    /// Channel-disable interrupt enable
    pub const DIS_IE: u32 = bit(30);
    /// Count-to-zero interrupt enable
    pub const CTZ_IE: u32 = bit(31);
}

/// STATUS bits
pub mod status {
    use noos::util::bit;

    /// Channel running
    pub const STATUS: u32 = bit(0);
    /// Interrupt pending
    pub const IPEND: u32 = bit(1);
    /// Count reached zero
    pub const CTZ_IF: u32 = bit(2);
    /// Reload happened
    pub const RLD_IF: u32 = bit(4);
    /// AHB bus error
    pub const BUS_ERR: u32 = bit(5);
    /// Request timeout
    pub const TO_IF: u32 = bit(6);
    /// Every write-1-to-clear flag
    pub const W1C: u32 = IPEND | CTZ_IF | RLD_IF | BUS_ERR | TO_IF;
}

/// Completion callback. Captures whatever context it needs.
pub type DmaCallback = Box<dyn FnMut() + Send>;

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaDirection {
    /// Memory to memory
    MemToMem,
    /// Memory to peripheral
    MemToDev,
    /// Peripheral to memory
    DevToMem,
}

/// Per-side address behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddrMode {
    /// Address stays put (peripheral FIFO)
    Fixed,
    /// Address advances by the transfer width
    #[default]
    Increment,
}

/// Transfer width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaWidth {
    /// 8 bits
    #[default]
    Byte,
    /// 16 bits
    HalfWord,
    /// 32 bits
    Word,
}

impl DmaWidth {
    /// SRCWD/DSTWD encoding
    pub const fn code(self) -> u32 {
        match self {
            Self::Byte => 0,
            Self::HalfWord => 1,
            Self::Word => 2,
        }
    }

    /// Size in bytes
    pub const fn bytes(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::HalfWord => 2,
            Self::Word => 4,
        }
    }
}

/// Controller configuration
#[derive(Debug, Clone, Copy)]
pub struct DmaConfig<R> {
    /// Controller index (the MAX32655 has one: 0)
    pub id: u32,
    /// Register block
    pub regs: R,
    /// Channels this handle may use
    pub num_channels: usize,
}

/// Channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaChanConfig {
    /// 0 (highest) to 3 (lowest)
    pub priority: u8,
}

/// Transfer descriptor
pub struct DmaTransfer {
    /// Source bus address
    pub src: usize,
    /// Destination bus address
    pub dst: usize,
    /// Length in bytes
    pub length: usize,
    /// Direction
    pub direction: DmaDirection,
    /// Source address behaviour
    pub src_addr_mode: AddrMode,
    /// Destination address behaviour
    pub dst_addr_mode: AddrMode,
    /// Width of each beat
    pub width: DmaWidth,
    /// Request select; [`REQUEST_MEMTOMEM`] for memory-to-memory
    pub request: u8,
    /// Run once when the transfer completes
    pub callback: Option<DmaCallback>,
}

impl DmaTransfer {
    /// Byte-wide incrementing copy from `src` to `dst`.
    ///
    /// The buffers must stay untouched until the transfer completes.
    pub fn mem_to_mem<S, D>(src: &S, dst: &mut D) -> Self
    where
        S: DmaBuffer + ?Sized,
        D: DmaBufferMut + ?Sized,
    {
        Self {
            src: src.address(),
            dst: dst.as_mut_ptr() as usize,
            length: src.len().min(dst.len()),
            direction: DmaDirection::MemToMem,
            src_addr_mode: AddrMode::Increment,
            dst_addr_mode: AddrMode::Increment,
            width: DmaWidth::Byte,
            request: REQUEST_MEMTOMEM,
            callback: None,
        }
    }

    /// Attach a completion callback
    #[must_use]
    pub fn with_callback(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    fn validate(&self) -> Result<()> {
        if self.length == 0 || self.length > MAX_TRANSFER_LEN {
            return Err(Errno::InvalidArgument);
        }
        if self.length % self.width.bytes() != 0 {
            return Err(Errno::InvalidArgument);
        }
        if u32::from(self.request) > ctrl::REQUEST >> 4 {
            return Err(Errno::InvalidArgument);
        }
        let memtomem = self.request == REQUEST_MEMTOMEM;
        match self.direction {
            DmaDirection::MemToMem if memtomem => Ok(()),
            DmaDirection::MemToDev | DmaDirection::DevToMem if !memtomem => Ok(()),
            _ => Err(Errno::InvalidArgument),
        }
    }

    fn ctrl_word(&self, priority: u8) -> u32 {
        let inc = |m: AddrMode, b: u32| if m == AddrMode::Increment { b } else { 0 };
        #[allow(clippy::cast_possible_truncation)] // width is at most 4 bytes
        let burst = (self.width.bytes() - 1) as u32;
        field_prep(ctrl::PRI, u32::from(priority))
            | field_prep(ctrl::REQUEST, u32::from(self.request))
            | field_prep(ctrl::SRCWD, self.width.code())
            | field_prep(ctrl::DSTWD, self.width.code())
            | inc(self.src_addr_mode, ctrl::SRCINC)
            | inc(self.dst_addr_mode, ctrl::DSTINC)
            | field_prep(ctrl::BURST_SIZE, burst)
            | ctrl::CTZ_IE
    }
}

impl core::fmt::Debug for DmaTransfer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DmaTransfer")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("length", &self.length)
            .field("direction", &self.direction)
            .field("width", &self.width)
            .field("request", &self.request)
            .field("callback", &self.callback.is_some())
            .finish_non_exhaustive()
    }
}

/// Channel state
#[derive(Default)]
pub struct DmaChan {
    id: usize,
    priority: u8,
    request: u8,
    transfer_active: bool,
    configured: bool,
    callback: Option<DmaCallback>,
}

impl DmaChan {
    /// Channel index
    pub fn id(&self) -> usize {
        self.id
    }

    /// Priority the channel was initialised with
    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Request select of the last configured transfer
    pub fn request(&self) -> u8 {
        self.request
    }

    /// A transfer has been started and has not completed or been aborted
    pub fn transfer_active(&self) -> bool {
        self.transfer_active
    }

    /// A transfer is programmed and waiting for `xfer_start`
    pub fn configured(&self) -> bool {
        self.configured
    }
}

impl core::fmt::Debug for DmaChan {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DmaChan")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("transfer_active", &self.transfer_active)
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}

/// Controller handle.
///
/// `'c` is the lifetime of caller-provided channel storage.
pub struct DmaHandle<'c, R> {
    id: u32,
    regs: R,
    num_channels: usize,
    channels: [Option<Owned<'c, DmaChan>>; MAX_CHANNELS],
}

impl<R> core::fmt::Debug for DmaHandle<'_, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DmaHandle")
            .field("id", &self.id)
            .field("num_channels", &self.num_channels)
            .finish_non_exhaustive()
    }
}

/// `capi_dma_ops`: the DMA contract every platform implements
pub trait CapiDma<'c>: Sized {
    /// Controller configuration
    type Config;

    /// Bring up a controller. With `storage` the handle lives there and the
    /// caller keeps ownership; without it the handle is boxed.
    fn init<'h>(storage: Option<&'h mut Option<Self>>, config: Self::Config)
        -> Result<Owned<'h, Self>>;

    /// Quiesce the controller and release the handle
    fn deinit(handle: Owned<'_, Self>) -> Result<()>;

    /// Claim channel `id`
    fn init_chan(
        &mut self,
        id: usize,
        storage: Option<&'c mut Option<DmaChan>>,
        config: &DmaChanConfig,
    ) -> Result<()>;

    /// Abort and release channel `id`
    fn deinit_chan(&mut self, id: usize) -> Result<()>;

    /// Program a transfer on channel `id` without starting it
    fn config_xfer(&mut self, id: usize, xfer: DmaTransfer) -> Result<()>;

    /// Start the programmed transfer on channel `id`
    fn xfer_start(&mut self, id: usize) -> Result<()>;

    /// Stop channel `id`; its callback does not run
    fn xfer_abort(&mut self, id: usize) -> Result<()>;

    /// `true` once channel `id` has no transfer in flight
    fn chan_is_completed(&self, id: usize) -> Result<bool>;

    /// Controller interrupt service routine
    fn isr(&mut self);
}

impl<'c, R: RegisterBlock> DmaHandle<'c, R> {
    /// Controller index
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Register block
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Channels this handle manages
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// State of channel `id`, if initialised
    pub fn chan(&self, id: usize) -> Option<&DmaChan> {
        self.channels.get(id)?.as_deref()
    }

    /// Configure and start a byte-wide memory-to-memory copy.
    ///
    /// `src` and `dst` must stay untouched until the channel completes.
    pub fn mem_copy(
        &mut self,
        id: usize,
        src: &[u8],
        dst: &mut [u8],
        callback: Option<DmaCallback>,
    ) -> Result<()> {
        if src.len() != dst.len() {
            return Err(Errno::InvalidArgument);
        }
        let mut xfer = DmaTransfer::mem_to_mem(src, dst);
        xfer.callback = callback;
        self.config_xfer(id, xfer)?;
        self.xfer_start(id)
    }

    /// Bytes left in the current transfer
    pub fn remaining(&self, id: usize) -> Result<usize> {
        self.chan_ref(id)?;
        Ok((self.regs.read(chan_reg(id, CH_CNT)) & genmask(23, 0)) as usize)
    }

    fn chan_ref(&self, id: usize) -> Result<&DmaChan> {
        if id >= self.num_channels {
            return Err(Errno::InvalidArgument);
        }
        self.chan(id).ok_or(Errno::InvalidArgument)
    }

    fn chan_mut(&mut self, id: usize) -> Result<&mut DmaChan> {
        if id >= self.num_channels {
            return Err(Errno::InvalidArgument);
        }
        self.channels
            .get_mut(id)
            .and_then(Option::as_deref_mut)
            .ok_or(Errno::InvalidArgument)
    }

    fn stop_channel(&self, id: usize) {
        self.regs.modify(chan_reg(id, CH_CTRL), ctrl::EN, 0);
        #[allow(clippy::cast_possible_truncation)] // id < MAX_CHANNELS
        self.regs.modify(REG_INTEN, bit(id as u32), 0);
    }
}

impl<'c, R: RegisterBlock> CapiDma<'c> for DmaHandle<'c, R> {
    type Config = DmaConfig<R>;

    fn init<'h>(
        storage: Option<&'h mut Option<Self>>,
        config: DmaConfig<R>,
    ) -> Result<Owned<'h, Self>> {
        if config.id != 0 || config.num_channels == 0 || config.num_channels > MAX_CHANNELS {
            return Err(Errno::InvalidArgument);
        }
        let handle = Self {
            id: config.id,
            regs: config.regs,
            num_channels: config.num_channels,
            channels: Default::default(),
        };
        handle.regs.write(REG_INTEN, 0);
        for ch in 0..handle.num_channels {
            handle.regs.write(chan_reg(ch, CH_CTRL), 0);
            handle.regs.write(chan_reg(ch, CH_STATUS), status::W1C);
        }
        let owned = Owned::place(storage, handle);
        tracing::debug!(
            id = owned.id,
            channels = owned.num_channels,
            caller_owned = owned.is_caller_owned(),
            "dma init"
        );
        Ok(owned)
    }

    fn deinit(mut handle: Owned<'_, Self>) -> Result<()> {
        for ch in 0..handle.num_channels {
            handle.stop_channel(ch);
            if let Some(slot) = handle.channels.get_mut(ch) {
                *slot = None;
            }
        }
        handle.regs.write(REG_INTEN, 0);
        tracing::debug!(id = handle.id, "dma deinit");
        Ok(())
    }

    fn init_chan(
        &mut self,
        id: usize,
        storage: Option<&'c mut Option<DmaChan>>,
        config: &DmaChanConfig,
    ) -> Result<()> {
        if id >= self.num_channels || config.priority > 3 {
            return Err(Errno::InvalidArgument);
        }
        let slot = self.channels.get_mut(id).ok_or(Errno::InvalidArgument)?;
        if slot.is_some() {
            return Err(Errno::Busy);
        }
        let chan = DmaChan {
            id,
            priority: config.priority,
            ..DmaChan::default()
        };
        *slot = Some(Owned::place(storage, chan));
        self.stop_channel(id);
        tracing::trace!(id, priority = config.priority, "dma channel init");
        Ok(())
    }

    fn deinit_chan(&mut self, id: usize) -> Result<()> {
        self.chan_ref(id)?;
        self.stop_channel(id);
        if let Some(slot) = self.channels.get_mut(id) {
            *slot = None;
        }
        tracing::trace!(id, "dma channel deinit");
        Ok(())
    }

    fn config_xfer(&mut self, id: usize, mut xfer: DmaTransfer) -> Result<()> {
        let chan = self.chan_ref(id)?;
        if chan.transfer_active {
            return Err(Errno::Busy);
        }
        xfer.validate()?;
        let ctrl = xfer.ctrl_word(chan.priority);

        #[allow(clippy::cast_possible_truncation)] // MAX32655 bus addresses are 32-bit
        {
            self.regs.write(chan_reg(id, CH_SRC), xfer.src as u32);
            self.regs.write(chan_reg(id, CH_DST), xfer.dst as u32);
            self.regs.write(chan_reg(id, CH_CNT), xfer.length as u32);
        }
        self.regs.write(chan_reg(id, CH_CTRL), ctrl);

        let chan = self.chan_mut(id)?;
        chan.request = xfer.request;
        chan.callback = xfer.callback.take();
        chan.configured = true;
        tracing::trace!(id, len = xfer.length, "dma transfer configured");
        Ok(())
    }

    fn xfer_start(&mut self, id: usize) -> Result<()> {
        let chan = self.chan_mut(id)?;
        if chan.transfer_active {
            return Err(Errno::Busy);
        }
        if !chan.configured {
            return Err(Errno::InvalidArgument);
        }
        chan.transfer_active = true;
        #[allow(clippy::cast_possible_truncation)] // id < MAX_CHANNELS
        self.regs.modify(REG_INTEN, 0, bit(id as u32));
        self.regs.modify(chan_reg(id, CH_CTRL), 0, ctrl::EN);
        Ok(())
    }

    fn xfer_abort(&mut self, id: usize) -> Result<()> {
        self.chan_ref(id)?;
        self.stop_channel(id);
        let chan = self.chan_mut(id)?;
        chan.transfer_active = false;
        chan.configured = false;
        chan.callback = None;
        tracing::debug!(id, "dma transfer aborted");
        Ok(())
    }

    fn chan_is_completed(&self, id: usize) -> Result<bool> {
        Ok(!self.chan_ref(id)?.transfer_active)
    }

    fn isr(&mut self) {
        let flags = self.regs.read(REG_INTFL);
        for ch in 0..self.num_channels {
            #[allow(clippy::cast_possible_truncation)] // ch < MAX_CHANNELS
            let mask = bit(ch as u32);
            if flags & mask == 0 {
                continue;
            }
            let st = self.regs.read(chan_reg(ch, CH_STATUS));
            self.regs.write(chan_reg(ch, CH_STATUS), st & status::W1C);
            if st & status::BUS_ERR != 0 {
                tracing::warn!(ch, "dma bus error");
            }

            let Some(chan) = self.channels.get_mut(ch).and_then(Option::as_deref_mut) else {
                continue;
            };
            if !chan.transfer_active {
                continue;
            }
            chan.transfer_active = false;
            chan.configured = false;
            self.regs.modify(REG_INTEN, mask, 0);
            if let Some(mut callback) = chan.callback.take() {
                callback();
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::regs::RegisterFile;

    type Regs = RegisterFile<{ (CHAN_BASE + MAX_CHANNELS * CHAN_STRIDE) / 4 }>;

    fn config(regs: &Regs) -> DmaConfig<&Regs> {
        DmaConfig {
            id: 0,
            regs,
            num_channels: MAX_CHANNELS,
        }
    }

    #[test]
    fn init_rejects_bad_config() {
        let regs = Regs::new();
        let mut cfg = config(&regs);
        cfg.num_channels = 0;
        assert_eq!(DmaHandle::init(None, cfg).err(), Some(Errno::InvalidArgument));
        let mut cfg = config(&regs);
        cfg.num_channels = MAX_CHANNELS + 1;
        assert_eq!(DmaHandle::init(None, cfg).err(), Some(Errno::InvalidArgument));
        let mut cfg = config(&regs);
        cfg.id = 1;
        assert_eq!(DmaHandle::init(None, cfg).err(), Some(Errno::InvalidArgument));
    }

    #[test]
    fn init_chan_twice_is_busy() {
        let regs = Regs::new();
        let mut dma = DmaHandle::init(None, config(&regs)).unwrap();
        dma.init_chan(2, None, &DmaChanConfig::default()).unwrap();
        assert_eq!(
            dma.init_chan(2, None, &DmaChanConfig::default()),
            Err(Errno::Busy)
        );
        assert_eq!(
            dma.init_chan(MAX_CHANNELS, None, &DmaChanConfig::default()),
            Err(Errno::InvalidArgument)
        );
    }

    #[test]
    fn config_xfer_programs_channel_registers() {
        let regs = Regs::new();
        let mut dma = DmaHandle::init(None, config(&regs)).unwrap();
        dma.init_chan(1, None, &DmaChanConfig { priority: 2 }).unwrap();

        let xfer = DmaTransfer {
            src: 0x2000_0000,
            dst: 0x2000_1000,
            length: 64,
            direction: DmaDirection::MemToMem,
            src_addr_mode: AddrMode::Increment,
            dst_addr_mode: AddrMode::Fixed,
            width: DmaWidth::Word,
            request: REQUEST_MEMTOMEM,
            callback: None,
        };
        dma.config_xfer(1, xfer).unwrap();

        assert_eq!(regs.peek(chan_reg(1, CH_SRC)), 0x2000_0000);
        assert_eq!(regs.peek(chan_reg(1, CH_DST)), 0x2000_1000);
        assert_eq!(regs.peek(chan_reg(1, CH_CNT)), 64);
        let c = regs.peek(chan_reg(1, CH_CTRL));
        assert_eq!(c & ctrl::EN, 0);
        assert_ne!(c & ctrl::SRCINC, 0);
        assert_eq!(c & ctrl::DSTINC, 0);
        assert_eq!(noos::util::field_get(ctrl::PRI, c), 2);
        assert_eq!(noos::util::field_get(ctrl::SRCWD, c), 2);
        assert_eq!(noos::util::field_get(ctrl::BURST_SIZE, c), 3);
        assert_ne!(c & ctrl::CTZ_IE, 0);
    }

    #[test]
    fn config_xfer_validates_transfer() {
        let regs = Regs::new();
        let mut dma = DmaHandle::init(None, config(&regs)).unwrap();
        dma.init_chan(0, None, &DmaChanConfig::default()).unwrap();
        let src = [0u8; 4];
        let mut dst = [0u8; 4];

        let mut zero = DmaTransfer::mem_to_mem(&src, &mut dst);
        zero.length = 0;
        assert_eq!(dma.config_xfer(0, zero), Err(Errno::InvalidArgument));

        let mut huge = DmaTransfer::mem_to_mem(&src, &mut dst);
        huge.length = MAX_TRANSFER_LEN + 1;
        assert_eq!(dma.config_xfer(0, huge), Err(Errno::InvalidArgument));

        let mut mismatch = DmaTransfer::mem_to_mem(&src, &mut dst);
        mismatch.direction = DmaDirection::MemToDev;
        assert_eq!(dma.config_xfer(0, mismatch), Err(Errno::InvalidArgument));

        let mut odd = DmaTransfer::mem_to_mem(&src, &mut dst);
        odd.width = DmaWidth::Word;
        odd.length = 3;
        assert_eq!(dma.config_xfer(0, odd), Err(Errno::InvalidArgument));

        let unknown = DmaTransfer::mem_to_mem(&src, &mut dst);
        assert_eq!(dma.config_xfer(5, unknown), Err(Errno::InvalidArgument));
    }

    #[test]
    fn start_requires_configuration() {
        let regs = Regs::new();
        let mut dma = DmaHandle::init(None, config(&regs)).unwrap();
        dma.init_chan(0, None, &DmaChanConfig::default()).unwrap();
        assert_eq!(dma.xfer_start(0), Err(Errno::InvalidArgument));
    }

    #[test]
    fn start_sets_enable_and_interrupt_bits() {
        let regs = Regs::new();
        let mut dma = DmaHandle::init(None, config(&regs)).unwrap();
        dma.init_chan(3, None, &DmaChanConfig::default()).unwrap();
        let src = [1u8; 8];
        let mut dst = [0u8; 8];
        dma.mem_copy(3, &src, &mut dst, None).unwrap();

        assert_ne!(regs.peek(chan_reg(3, CH_CTRL)) & ctrl::EN, 0);
        assert_eq!(regs.peek(REG_INTEN), bit(3));
        assert!(!dma.chan_is_completed(3).unwrap());
        assert_eq!(dma.xfer_start(3), Err(Errno::Busy));
        assert_eq!(dma.remaining(3).unwrap(), 8);
    }

    #[test]
    fn abort_clears_state_without_callback() {
        use core::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let regs = Regs::new();
        let mut dma = DmaHandle::init(None, config(&regs)).unwrap();
        dma.init_chan(0, None, &DmaChanConfig::default()).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let src = [0u8; 4];
        let mut dst = [0u8; 4];
        let xfer = DmaTransfer::mem_to_mem(&src, &mut dst).with_callback(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        dma.config_xfer(0, xfer).unwrap();
        dma.xfer_start(0).unwrap();

        dma.xfer_abort(0).unwrap();

        assert!(dma.chan_is_completed(0).unwrap());
        assert_eq!(regs.peek(chan_reg(0, CH_CTRL)) & ctrl::EN, 0);
        assert_eq!(regs.peek(REG_INTEN), 0);
        regs.raise(REG_INTFL, bit(0));
        dma.isr();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn caller_owned_channel_lands_in_storage() {
        let regs = Regs::new();
        let mut chan_storage = None;
        let mut dma = DmaHandle::init(None, config(&regs)).unwrap();
        dma.init_chan(4, Some(&mut chan_storage), &DmaChanConfig { priority: 1 })
            .unwrap();
        assert_eq!(dma.chan(4).map(DmaChan::priority), Some(1));
        dma.deinit_chan(4).unwrap();
        assert!(dma.chan(4).is_none());
        drop(dma);
        assert_eq!(chan_storage.map(|c| c.id()), Some(4));
    }
}
