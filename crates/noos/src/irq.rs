//! Interrupt controller contract

use crate::error::Result;

/// Interrupt line number
pub type IrqId = u16;

/// Interrupt handler.
///
/// Handlers are `'static` and `Sync` because they run from interrupt
/// context; any per-device state goes through a static with interior
/// mutability.
pub type IrqHandler = &'static (dyn Fn(IrqId) + Sync);

/// Trigger condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqTrigger {
    /// Active while low
    LevelLow,
    /// Active while high
    LevelHigh,
    /// Falling edge
    EdgeFalling,
    /// Rising edge
    EdgeRising,
    /// Either edge
    EdgeBoth,
}

/// IRQ controller init parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqInitParam {
    /// Controller index
    pub irq_ctrl_id: u32,
}

/// Platform IRQ vtable
pub trait IrqPlatformOps {
    /// Attach `handler` to `irq`, replacing any previous handler
    fn register_callback(&mut self, irq: IrqId, handler: IrqHandler) -> Result<()>;
    /// Detach the handler of `irq`
    fn unregister_callback(&mut self, irq: IrqId) -> Result<()>;
    /// Unmask `irq`
    fn enable(&mut self, irq: IrqId) -> Result<()>;
    /// Mask `irq`
    fn disable(&mut self, irq: IrqId) -> Result<()>;
    /// Set the priority of `irq`
    fn set_priority(&mut self, irq: IrqId, priority: u8) -> Result<()>;
    /// Unmask interrupts globally
    fn global_enable(&mut self) -> Result<()>;
    /// Mask interrupts globally
    fn global_disable(&mut self) -> Result<()>;
}
