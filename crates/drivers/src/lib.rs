//! Analog Devices chip drivers
//!
//! Every driver is generic over the `embedded-hal` 1.0 traits, so it runs on
//! any platform that implements the `noos` bus contract and on the host
//! against the `noos::mocks` recorders.
//!
//! | Module | Part | Bus |
//! |--------|------|-----|
//! | [`ad7780`] | AD7780 24-bit sigma-delta ADC (PmodAD3) | SPI + 4 GPIO |
//! | [`ad799x`] | AD7991 / AD7995 / AD7999 (PmodAD2) | I2C |
//! | [`max6613`] | MAX6613 analog temperature sensor | any [`max6613::AnalogInput`] |
//! | [`ad7193`] | AD7193 4-channel sigma-delta ADC (PmodAD5) | SPI |
//! | [`adrv904x`] | ADRV904X CDDC half-band datapath bitfields | 32-bit register access |

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
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod ad7193;
pub mod ad7780;
pub mod ad799x;
pub mod adrv904x;
pub mod error;
pub mod max6613;

pub use error::DriverError;
