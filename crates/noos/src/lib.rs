//! Vendor-neutral bus contract for Analog Devices evaluation-board drivers
//!
//! This crate is the platform layer of the driver stack: every
//! platform shim (MAX32655 CAPI, Mbed, a host simulator) implements the
//! `*PlatformOps` traits, and every chip driver talks to the descriptors
//! those traits produce.
//!
//! # Architecture Layers
//!
//! ```text
//! Demo applications (pmod-console)
//!         ↓
//! Chip drivers (adi-drivers)
//!         ↓
//! Bus contract (this crate - traits + descriptors)
//!         ↓
//! Platform shims (capi, embedded-hal implementations)
//! ```
//!
//! # Contents
//!
//! - [`peripheral`] - SPI, I2C, UART descriptors and their platform ops
//! - [`gpio`] - GPIO descriptor and platform ops
//! - [`irq`] - interrupt controller contract
//! - [`dma`] - buffer traits for DMA-capable memory
//! - [`ownership`] - caller-owned vs driver-owned storage
//! - [`util`] - bitfield and byte-order helpers
//! - [`mocks`] - recording mocks (`std` feature or tests)
//!
//! # Features
//!
//! - `alloc`: driver-owned descriptors via `Box`
//! - `std` (default, implies `alloc`): host mocks
//! - `defmt`: `defmt::Format` derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod dma;
pub mod error;
pub mod gpio;
pub mod irq;
#[cfg(any(test, feature = "std"))]
pub mod mocks;
#[cfg(feature = "alloc")]
pub mod ownership;
pub mod peripheral;
pub mod util;

pub use error::{Errno, Result};

#[cfg(feature = "alloc")]
pub use ownership::Owned;

// Re-export GPIO types
pub use gpio::{
    FlexPin, GpioDesc, GpioDirection, GpioInitParam, GpioPlatformOps, PinState, PullMode,
};

// Re-export IRQ types
pub use irq::{IrqHandler, IrqId, IrqInitParam, IrqPlatformOps, IrqTrigger};

// Re-export peripheral types
pub use peripheral::{
    BitOrder, DataBits, I2cDesc, I2cInitParam, I2cPlatformOps, Parity, SpiDesc, SpiInitParam,
    SpiMode, SpiMsg, SpiPlatformOps, StopBits, UartDesc, UartInitParam, UartPlatformOps,
};

// Re-export DMA buffer traits
pub use dma::{DmaBuffer, DmaBufferMut};
