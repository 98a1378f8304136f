//! PmodAD3 console session against recorded buses

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use adi_drivers::ad7780::{Ad7780, Filter, Gain};
use noos::mocks::{MockPin, MockSpi, MockUart};
use pmod_console::{Console, PmodAd3};

struct Rig {
    board: PmodAd3<MockSpi, MockPin, MockPin, MockPin, MockPin>,
    spi: MockSpi,
    rdy: MockPin,
    pdrst: MockPin,
    filter: MockPin,
    gain: MockPin,
}

fn rig() -> Rig {
    let spi = MockSpi::new();
    let rdy = MockPin::new();
    let pdrst = MockPin::new();
    let filter = MockPin::new();
    let gain = MockPin::new();
    let adc = Ad7780::new(
        spi.clone(),
        rdy.clone(),
        pdrst.clone(),
        filter.clone(),
        gain.clone(),
    );
    Rig {
        board: PmodAd3::new(adc, 2.5),
        spi,
        rdy,
        pdrst,
        filter,
        gain,
    }
}

fn run(rig: &mut Rig, line: &str) -> String {
    let mut out = String::new();
    PmodAd3::commands()
        .dispatch(&mut rig.board, line, &mut out)
        .unwrap();
    out
}

#[test]
fn midscale_reads_zero_millivolts() {
    let mut rig = rig();
    rig.spi.queue_read(&[0x80, 0x00, 0x00, 0x0D]);
    assert_eq!(run(&mut rig, "voltage?"), "voltage=0.000 [mV]\r\n");
}

#[test]
fn gain_zero_selects_128() {
    let mut rig = rig();
    assert_eq!(run(&mut rig, "gain=0"), "gain=0\r\n");
    assert!(!rig.gain.level());
    assert_eq!(rig.board.adc().gain(), Gain::OneTwentyEight);
    assert_eq!(run(&mut rig, "gain?"), "gain=128\r\n");

    // full scale at gain 128: 2.5 V / 128
    rig.spi.queue_read(&[0xFF, 0xFF, 0xFF, 0x09]);
    let out = run(&mut rig, "voltage?");
    assert_eq!(out, "voltage=19.531 [mV]\r\n");
}

#[test]
fn filter_and_power_drive_pins() {
    let mut rig = rig();
    assert_eq!(run(&mut rig, "filter=1"), "filter=1\r\n");
    assert!(rig.filter.level());
    assert_eq!(rig.board.adc().filter(), Filter::Hz10);
    assert_eq!(run(&mut rig, "filter?"), "filter=1 (10 Hz)\r\n");

    assert_eq!(run(&mut rig, "power=1"), "power=1\r\n");
    assert!(rig.pdrst.level());
    assert_eq!(run(&mut rig, "power=0"), "power=0\r\n");
    assert_eq!(rig.pdrst.history(), vec![true, false]);
}

#[test]
fn status_is_decoded() {
    let mut rig = rig();
    rig.spi.queue_read(&[0x12, 0x34, 0x56, 0x4D]);
    assert_eq!(
        run(&mut rig, "status?"),
        "status=0x4D\r\n  part: AD7780, error: no, gain: 1, filter: 10 Hz\r\n"
    );
}

#[test]
fn stuck_rdy_reports_timeout() {
    let mut rig = rig();
    rig.rdy.set_level(true);
    let out = run(&mut rig, "voltage?");
    assert_eq!(out, "Error: timed out waiting for the device\r\n");
    assert_eq!(rig.spi.transactions(), 0);
}

#[test]
fn uart_session() {
    let mut rig = rig();
    rig.spi.queue_read(&[0x80, 0x00, 0x00, 0x0D]);
    let uart = MockUart::new();
    uart.feed(b"gain=1\r\nvoltage?\r\nvolume?\r\n");

    let mut console: Console<_> = Console::new(uart.clone());
    console.run(&PmodAd3::commands(), &mut rig.board).unwrap();

    let sent = uart.sent_string();
    let session = sent
        .split_once("status? - Reads one conversion and decodes its status byte.\r\n")
        .map(|(_, rest)| rest)
        .unwrap();
    assert_eq!(session, "gain=1\r\nvoltage=0.000 [mV]\r\nInvalid command!\r\n");
}
