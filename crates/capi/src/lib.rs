//! MAX32655 CAPI layer
//!
//! Vendor-neutral DMA and interrupt contract over the MAX32655's
//! memory-mapped DMA controller and the Cortex-M4 NVIC.
//!
//! - [`dma`] - controller/channel handles, transfer programming, ISR
//! - [`irq`] - handler table and NVIC access
//! - [`regs`] - register access (volatile MMIO or a RAM-backed file)
//!
//! Handles are created with [`dma::CapiDma::init`] and either live in
//! storage the caller provides or are boxed by the driver; see
//! [`noos::Owned`].

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

extern crate alloc;

pub mod dma;
pub mod irq;
pub mod regs;

pub use dma::{
    AddrMode, CapiDma, DmaCallback, DmaChan, DmaChanConfig, DmaConfig, DmaDirection, DmaHandle,
    DmaTransfer, DmaWidth, MAX_CHANNELS, MAX_TRANSFER_LEN,
};
pub use irq::{IrqController, Nvic, SimNvic, MAX32655_IRQ_COUNT};
pub use regs::{Mmio, RegisterBlock, RegisterFile};

#[cfg(feature = "cortex-m")]
pub use irq::CortexMNvic;
