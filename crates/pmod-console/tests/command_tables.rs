//! Structural checks on the PmodAD2 / PmodAD3 command tables

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use noos::mocks::{MockI2c, MockPin, MockSpi};
use pmod_console::{CommandInfo, PmodAd2, PmodAd3};

type Ad3 = PmodAd3<MockSpi, MockPin, MockPin, MockPin, MockPin>;
type Ad2 = PmodAd2<MockI2c>;

fn check_rows(rows: &[CommandInfo]) {
    for (i, info) in rows.iter().enumerate() {
        assert!(!info.name.is_empty(), "row {i} has no name");
        assert!(
            info.name.ends_with('?') || info.name.ends_with('='),
            "{} is neither a query nor a setter",
            info.name
        );
        assert!(!info.description.is_empty(), "{} has no description", info.name);
        assert!(
            info.example.starts_with(info.name),
            "example of {} does not invoke it",
            info.name
        );
        if info.min_params > 0 {
            assert!(
                !info.accepted_value.is_empty(),
                "{} takes a parameter but lists no accepted values",
                info.name
            );
        }
    }

    for (i, a) in rows.iter().enumerate() {
        for b in rows.iter().skip(i + 1) {
            assert_ne!(a.name, b.name, "duplicate command");
            assert!(
                !b.name.starts_with(a.name),
                "{} is shadowed by {}",
                b.name,
                a.name
            );
        }
    }
}

#[test]
fn pmod_ad3_table_is_complete() {
    let table = Ad3::commands();
    let rows: Vec<CommandInfo> = table.commands().iter().map(|c| c.info).collect();
    assert_eq!(rows.len(), pmod_console::pmod_ad3::COMMANDS);
    check_rows(&rows);

    let names: Vec<&str> = rows.iter().map(|r| r.name).collect();
    assert_eq!(
        names,
        [
            "help?", "voltage?", "samples?", "gain=", "gain?", "filter=", "filter?", "power=",
            "status?"
        ]
    );
}

#[test]
fn pmod_ad2_table_is_complete() {
    let table = Ad2::commands();
    let rows: Vec<CommandInfo> = table.commands().iter().map(|c| c.info).collect();
    assert_eq!(rows.len(), pmod_console::pmod_ad2::COMMANDS);
    check_rows(&rows);

    let names: Vec<&str> = rows.iter().map(|r| r.name).collect();
    assert_eq!(
        names,
        [
            "help?",
            "voltage?",
            "rawData?",
            "vref=",
            "vref?",
            "filter=",
            "temperature?"
        ]
    );
}

#[test]
fn every_example_dispatches() {
    let table = Ad2::commands();
    let i2c = MockI2c::new();
    let mut board = PmodAd2::new(
        adi_drivers::ad799x::Ad799x::new(
            i2c,
            adi_drivers::ad799x::ADDR_0,
            adi_drivers::ad799x::Part::Ad7991,
        ),
        3.3,
        2.048,
    );
    for (index, cmd) in table.commands().iter().enumerate() {
        let mut out = String::new();
        let r = table.dispatch(&mut board, cmd.info.example, &mut out).unwrap();
        assert_eq!(r, pmod_console::Dispatched::Ran(index), "{}", cmd.info.example);
    }
}
