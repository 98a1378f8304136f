//! UART command console for the PmodAD2 and PmodAD3 demos
//!
//! A console line such as `voltage?1` or `gain=0` is matched against a
//! fixed [`CommandTable`] and runs one operation on the board. Out-of-range
//! parameters are clamped to the nearest legal value; a command missing its
//! parameter prints its usage instead.
//!
//! # Boards
//!
//! | Module | Board | Converter |
//! |--------|-------|-----------|
//! | [`pmod_ad3`] | PmodAD3 | AD7780 over SPI + GPIO |
//! | [`pmod_ad2`] | PmodAD2 | AD7991 over I2C (+ MAX6613) |
//!
//! [`board`] brings either one up through a `noos` platform, with the pins
//! and buses from [`parameters`]. With the `host` feature, [`sim`] provides
//! simulated parts and the `pmod-console` binary drives them from stdin.

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "host")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod board;
pub mod command;
pub mod console;
pub mod parameters;
pub mod pmod_ad2;
pub mod pmod_ad3;
#[cfg(any(test, feature = "host"))]
pub mod sim;

pub use command::{Command, CommandInfo, CommandTable, Dispatched};
pub use console::{Console, ConsoleError};
pub use pmod_ad2::PmodAd2;
pub use pmod_ad3::PmodAd3;
