//! Interrupt dispatch
//!
//! Handlers live in a fixed-capacity map keyed by IRQ id, so at most one
//! handler exists per line.
//!
//! Configuration calls (`connect`, `enable`, `set_priority`, ...) go through
//! the NVIC-access mutex. [`IrqController::dispatch`] takes the same lock
//! only long enough to copy the handler out and then runs it unlocked, so a
//! handler may reconfigure interrupts.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::index_map::FnvIndexMap;
use noos::{Errno, IrqHandler, IrqId, IrqPlatformOps, Result};

/// External interrupt lines on the MAX32655
pub const MAX32655_IRQ_COUNT: IrqId = 200;

/// Handlers that can be connected at once
pub const IRQ_TABLE_CAPACITY: usize = 64;

/// Implemented priority bits (Cortex-M4 on MAX32655)
pub const PRIORITY_BITS: u8 = 3;

/// Lowest-urgency priority value
pub const MAX_PRIORITY: u8 = (1 << PRIORITY_BITS) - 1;

/// NVIC seam
pub trait Nvic {
    /// Unmask `irq`
    fn enable(&mut self, irq: IrqId);
    /// Mask `irq`
    fn disable(&mut self, irq: IrqId);
    /// Whether `irq` is unmasked
    fn is_enabled(&self, irq: IrqId) -> bool;
    /// Set priority, `0..=MAX_PRIORITY`
    fn set_priority(&mut self, irq: IrqId, priority: u8);
    /// Current priority
    fn priority(&self, irq: IrqId) -> u8;
    /// Unmask interrupts globally
    fn global_enable(&mut self);
    /// Mask interrupts globally
    fn global_disable(&mut self);
}

const SIM_WORDS: usize = (MAX32655_IRQ_COUNT as usize).div_ceil(32);

/// In-memory NVIC for host builds
#[derive(Debug, Clone)]
pub struct SimNvic {
    enabled: [u32; SIM_WORDS],
    priority: [u8; MAX32655_IRQ_COUNT as usize],
    global: bool,
}

impl Default for SimNvic {
    fn default() -> Self {
        Self::new()
    }
}

impl SimNvic {
    /// Everything masked, priority 0
    pub const fn new() -> Self {
        Self {
            enabled: [0; SIM_WORDS],
            priority: [0; MAX32655_IRQ_COUNT as usize],
            global: false,
        }
    }

    /// Global enable state
    pub fn globally_enabled(&self) -> bool {
        self.global
    }

    fn slot(irq: IrqId) -> (usize, u32) {
        (usize::from(irq / 32), 1u32 << (irq % 32))
    }
}

impl Nvic for SimNvic {
    fn enable(&mut self, irq: IrqId) {
        let (w, m) = Self::slot(irq);
        if let Some(word) = self.enabled.get_mut(w) {
            *word |= m;
        }
    }

    fn disable(&mut self, irq: IrqId) {
        let (w, m) = Self::slot(irq);
        if let Some(word) = self.enabled.get_mut(w) {
            *word &= !m;
        }
    }

    fn is_enabled(&self, irq: IrqId) -> bool {
        let (w, m) = Self::slot(irq);
        self.enabled.get(w).is_some_and(|word| word & m != 0)
    }

    fn set_priority(&mut self, irq: IrqId, priority: u8) {
        if let Some(p) = self.priority.get_mut(usize::from(irq)) {
            *p = priority;
        }
    }

    fn priority(&self, irq: IrqId) -> u8 {
        self.priority.get(usize::from(irq)).copied().unwrap_or(0)
    }

    fn global_enable(&mut self) {
        self.global = true;
    }

    fn global_disable(&mut self) {
        self.global = false;
    }
}

/// IRQ number wrapper for the `cortex-m` NVIC API
#[cfg(feature = "cortex-m")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Irqn(pub u16);

// SAFETY: every value handed to the NVIC is range-checked against
// MAX32655_IRQ_COUNT by IrqController before it reaches here.
#[cfg(feature = "cortex-m")]
unsafe impl cortex_m::interrupt::InterruptNumber for Irqn {
    fn number(self) -> u16 {
        self.0
    }
}

/// The Cortex-M4 NVIC
#[cfg(feature = "cortex-m")]
#[derive(Debug, Default)]
pub struct CortexMNvic;

#[cfg(feature = "cortex-m")]
impl Nvic for CortexMNvic {
    fn enable(&mut self, irq: IrqId) {
        // SAFETY: the handler table is populated before lines are unmasked;
        // an unmasked line with no handler is dispatched as a no-op.
        unsafe { cortex_m::peripheral::NVIC::unmask(Irqn(irq)) }
    }

    fn disable(&mut self, irq: IrqId) {
        cortex_m::peripheral::NVIC::mask(Irqn(irq));
    }

    fn is_enabled(&self, irq: IrqId) -> bool {
        cortex_m::peripheral::NVIC::is_enabled(Irqn(irq))
    }

    fn set_priority(&mut self, irq: IrqId, priority: u8) {
        // SAFETY: only the NVIC priority register for `irq` is touched and
        // callers hold the NVIC-access lock.
        unsafe {
            let mut p = cortex_m::Peripherals::steal();
            p.NVIC
                .set_priority(Irqn(irq), priority << (8 - PRIORITY_BITS));
        }
    }

    fn priority(&self, irq: IrqId) -> u8 {
        cortex_m::peripheral::NVIC::get_priority(Irqn(irq)) >> (8 - PRIORITY_BITS)
    }

    fn global_enable(&mut self) {
        // SAFETY: not called from within a critical section.
        unsafe { cortex_m::interrupt::enable() }
    }

    fn global_disable(&mut self) {
        cortex_m::interrupt::disable();
    }
}

struct Inner<N> {
    handlers: FnvIndexMap<IrqId, IrqHandler, IRQ_TABLE_CAPACITY>,
    nvic: N,
}

/// Handler table plus NVIC, behind the NVIC-access lock
pub struct IrqController<N> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner<N>>>,
}

impl<N: Nvic> IrqController<N> {
    /// Empty table over `nvic`. Usable in a `static`.
    pub const fn new(nvic: N) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                handlers: FnvIndexMap::new(),
                nvic,
            })),
        }
    }

    fn check(irq: IrqId) -> Result<()> {
        if irq >= MAX32655_IRQ_COUNT {
            Err(Errno::InvalidArgument)
        } else {
            Ok(())
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut Inner<N>) -> T) -> T {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Attach `handler` to `irq`, replacing any previous one
    pub fn connect(&self, irq: IrqId, handler: IrqHandler) -> Result<()> {
        Self::check(irq)?;
        self.with(|inner| {
            inner
                .handlers
                .insert(irq, handler)
                .map(|_| ())
                .map_err(|_| Errno::OutOfMemory)
        })?;
        tracing::debug!(irq, "irq handler connected");
        Ok(())
    }

    /// Mask `irq` and drop its handler
    pub fn disconnect(&self, irq: IrqId) -> Result<()> {
        Self::check(irq)?;
        self.with(|inner| {
            inner.nvic.disable(irq);
            inner.handlers.remove(&irq);
        });
        tracing::debug!(irq, "irq handler disconnected");
        Ok(())
    }

    /// Whether `irq` has a handler
    pub fn is_connected(&self, irq: IrqId) -> bool {
        self.with(|inner| inner.handlers.contains_key(&irq))
    }

    /// Unmask `irq`
    pub fn enable(&self, irq: IrqId) -> Result<()> {
        Self::check(irq)?;
        self.with(|inner| inner.nvic.enable(irq));
        Ok(())
    }

    /// Mask `irq`
    pub fn disable(&self, irq: IrqId) -> Result<()> {
        Self::check(irq)?;
        self.with(|inner| inner.nvic.disable(irq));
        Ok(())
    }

    /// Whether `irq` is unmasked
    pub fn is_enabled(&self, irq: IrqId) -> Result<bool> {
        Self::check(irq)?;
        Ok(self.with(|inner| inner.nvic.is_enabled(irq)))
    }

    /// Set the priority of `irq`; at most [`MAX_PRIORITY`]
    pub fn set_priority(&self, irq: IrqId, priority: u8) -> Result<()> {
        Self::check(irq)?;
        if priority > MAX_PRIORITY {
            return Err(Errno::InvalidArgument);
        }
        self.with(|inner| inner.nvic.set_priority(irq, priority));
        Ok(())
    }

    /// Priority of `irq`
    pub fn priority(&self, irq: IrqId) -> Result<u8> {
        Self::check(irq)?;
        Ok(self.with(|inner| inner.nvic.priority(irq)))
    }

    /// Unmask interrupts globally
    pub fn global_enable(&self) {
        self.with(|inner| inner.nvic.global_enable());
    }

    /// Mask interrupts globally
    pub fn global_disable(&self) {
        self.with(|inner| inner.nvic.global_disable());
    }

    /// Run the handler connected to `irq`. Returns `false` if none is.
    ///
    /// Called from the vector table trampoline.
    pub fn dispatch(&self, irq: IrqId) -> bool {
        let handler = self.with(|inner| inner.handlers.get(&irq).copied());
        match handler {
            Some(h) => {
                h(irq);
                true
            }
            None => false,
        }
    }

    /// Read access to the NVIC backend
    pub fn with_nvic<T>(&self, f: impl FnOnce(&N) -> T) -> T {
        self.with(|inner| f(&inner.nvic))
    }
}

impl<N: Nvic> IrqPlatformOps for &IrqController<N> {
    fn register_callback(&mut self, irq: IrqId, handler: IrqHandler) -> Result<()> {
        self.connect(irq, handler)
    }

    fn unregister_callback(&mut self, irq: IrqId) -> Result<()> {
        self.disconnect(irq)
    }

    fn enable(&mut self, irq: IrqId) -> Result<()> {
        IrqController::enable(self, irq)
    }

    fn disable(&mut self, irq: IrqId) -> Result<()> {
        IrqController::disable(self, irq)
    }

    fn set_priority(&mut self, irq: IrqId, priority: u8) -> Result<()> {
        IrqController::set_priority(self, irq, priority)
    }

    fn global_enable(&mut self) -> Result<()> {
        IrqController::global_enable(self);
        Ok(())
    }

    fn global_disable(&mut self) -> Result<()> {
        IrqController::global_disable(self);
        Ok(())
    }
}
