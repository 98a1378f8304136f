//! Out-of-range parameters are clamped, never rejected

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use adi_drivers::ad7780::Ad7780;
use adi_drivers::ad799x::{Ad799x, Part, ADDR_0};
use noos::mocks::{MockI2c, MockPin, MockSpi};
use pmod_console::{PmodAd2, PmodAd3};
use proptest::prelude::*;

/// Run `line` on a fresh PmodAD2; returns the output and the bus writes
fn ad2_run(line: &str) -> (String, Vec<Vec<u8>>) {
    let i2c = MockI2c::new();
    i2c.queue_read(ADDR_0, &[0x35, 0x5A]);
    let adc = Ad799x::new(i2c.clone(), ADDR_0, Part::Ad7991);
    let mut board = PmodAd2::new(adc, 3.3, 2.048);
    let mut out = String::new();
    PmodAd2::commands()
        .dispatch(&mut board, line, &mut out)
        .unwrap();
    (out, i2c.writes_to(ADDR_0))
}

fn ad3_board() -> (PmodAd3<MockSpi, MockPin, MockPin, MockPin, MockPin>, MockSpi) {
    let spi = MockSpi::new();
    spi.set_fill(0x80);
    let adc = Ad7780::new(
        spi.clone(),
        MockPin::new(),
        MockPin::new(),
        MockPin::new(),
        MockPin::new(),
    );
    (PmodAd3::new(adc, 2.5), spi)
}

#[test]
fn voltage_9_is_voltage_3() {
    let (out9, writes9) = ad2_run("voltage?9");
    let (out3, writes3) = ad2_run("voltage?3");
    assert_eq!(out9, out3);
    assert_eq!(writes9, writes3);
    assert_eq!(writes3, vec![vec![0x80]]);
}

#[test]
fn samples_clamp_to_one() {
    let (mut board, spi) = ad3_board();
    let mut out = String::new();
    PmodAd3::commands()
        .dispatch(&mut board, "samples?0", &mut out)
        .unwrap();
    assert_eq!(spi.transactions(), 1);
    assert!(out.starts_with("samples=1 "));
}

#[test]
fn samples_clamp_to_upper_bound() {
    let (mut board, spi) = ad3_board();
    let mut out = String::new();
    PmodAd3::commands()
        .dispatch(&mut board, "samples?50000", &mut out)
        .unwrap();
    assert_eq!(spi.transactions(), 11024);
    assert!(out.starts_with("samples=11024 "));
}

#[test]
fn missing_channel_prints_usage() {
    let (out, writes) = ad2_run("voltage?");
    assert!(out.starts_with("Invalid parameter!\r\n"));
    assert!(out.ends_with("Example: voltage?1\r\n"));
    assert!(writes.is_empty());
}

proptest! {
    #[test]
    fn channels_above_range_read_channel_3(p in 3.0f64..1.0e9) {
        prop_assert_eq!(ad2_run(&format!("voltage?{p}")), ad2_run("voltage?3"));
    }

    #[test]
    fn channels_below_range_read_channel_0(p in -1.0e9f64..=0.0) {
        prop_assert_eq!(ad2_run(&format!("voltage?{p}")), ad2_run("voltage?0"));
    }

    #[test]
    fn in_range_channel_selects_its_bit(ch in 0u8..4) {
        let (_, writes) = ad2_run(&format!("rawData?{ch}"));
        prop_assert_eq!(writes, vec![vec![1u8 << (4 + ch)]]);
    }
}
