//! AD7780 bus and pin sequences against strict expectation mocks

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use adi_drivers::ad7780::{status, Ad7780, Filter, Gain};
use adi_drivers::DriverError;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTx};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTx};
use embedded_hal_mock::eh1::MockError;
use std::io::ErrorKind;

fn read4(bytes: [u8; 4]) -> Vec<SpiTx<u8>> {
    vec![
        SpiTx::transaction_start(),
        SpiTx::read_vec(bytes.to_vec()),
        SpiTx::transaction_end(),
    ]
}

#[test]
fn init_sequence() {
    let mut spi = SpiMock::new(&read4([0x80, 0x00, 0x00, status::ID0 | status::GAIN | status::PAT0]));
    let mut rdy = PinMock::new(&[PinTx::get(State::High), PinTx::get(State::Low)]);
    let mut pdrst = PinMock::new(&[PinTx::set(State::High)]);
    let mut filter = PinMock::new(&[PinTx::set(State::Low)]);
    let mut gain = PinMock::new(&[PinTx::set(State::High)]);

    let mut adc = Ad7780::new(
        spi.clone(),
        rdy.clone(),
        pdrst.clone(),
        filter.clone(),
        gain.clone(),
    );
    adc.init().unwrap();
    assert_eq!(adc.gain(), Gain::One);
    assert_eq!(adc.filter(), Filter::Hz16_7);
    assert!(adc.is_powered());

    spi.done();
    rdy.done();
    pdrst.done();
    filter.done();
    gain.done();
}

#[test]
fn conversion_to_millivolts_at_gain_128() {
    let mut spi = SpiMock::new(&read4([0xC0, 0x00, 0x00, status::ID0 | status::PAT0]));
    let mut rdy = PinMock::new(&[PinTx::get(State::Low)]);
    let mut pdrst = PinMock::new(&[]);
    let mut filter = PinMock::new(&[]);
    let mut gain = PinMock::new(&[PinTx::set(State::Low)]);

    let mut adc = Ad7780::new(
        spi.clone(),
        rdy.clone(),
        pdrst.clone(),
        filter.clone(),
        gain.clone(),
    );
    adc.set_gain(Gain::OneTwentyEight).unwrap();
    let (raw, st) = adc.read_when_ready().unwrap();
    assert_eq!(raw, 0xC0_0000);
    assert_eq!(adi_drivers::ad7780::Status(st).gain(), Gain::OneTwentyEight);

    let mv = adi_drivers::ad7780::convert_to_voltage(raw, 3.3, f32::from(adc.gain().factor()));
    assert!((mv - 1650.0 / 128.0).abs() < 1e-3);

    spi.done();
    rdy.done();
    pdrst.done();
    filter.done();
    gain.done();
}

#[test]
fn pin_fault_is_reported() {
    let mut spi = SpiMock::new(&[]);
    let mut rdy = PinMock::new(&[]);
    let mut pdrst = PinMock::new(&[
        PinTx::set(State::High).with_error(MockError::Io(ErrorKind::NotConnected))
    ]);
    let mut filter = PinMock::new(&[]);
    let mut gain = PinMock::new(&[]);

    let mut adc = Ad7780::new(
        spi.clone(),
        rdy.clone(),
        pdrst.clone(),
        filter.clone(),
        gain.clone(),
    );
    assert!(matches!(adc.init(), Err(DriverError::Pin)));

    spi.done();
    rdy.done();
    pdrst.done();
    filter.done();
    gain.done();
}
