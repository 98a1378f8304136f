//! Property tests for the pure conversion formulas

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use adi_drivers::ad7193::{self, Gain as PgaGain, Polarity};
use adi_drivers::ad7780::convert_to_voltage;
use adi_drivers::ad799x::{convert_to_volts, Part};
use adi_drivers::max6613::{celsius_to_voltage, voltage_to_celsius};
use proptest::prelude::*;

fn part() -> impl Strategy<Value = Part> {
    prop_oneof![Just(Part::Ad7991), Just(Part::Ad7995), Just(Part::Ad7999)]
}

proptest! {
    #[test]
    fn ad7780_is_odd_around_midscale(offset in 0u32..0x80_0000, vref in 1.0f32..5.0) {
        let up = convert_to_voltage(0x80_0000 + offset, vref, 1.0);
        let down = convert_to_voltage(0x80_0000 - offset, vref, 1.0);
        prop_assert!((up + down).abs() < 1e-2);
    }

    #[test]
    fn ad7780_gain_divides(raw in 0u32..0x100_0000, vref in 1.0f32..5.0) {
        let g1 = convert_to_voltage(raw, vref, 1.0);
        let g128 = convert_to_voltage(raw, vref, 128.0);
        prop_assert!((g1 / 128.0 - g128).abs() < 1e-3);
    }

    #[test]
    fn ad799x_stays_below_vref(part in part(), raw in any::<u16>(), vref in 0.5f32..5.0) {
        let bits = part.bits();
        let raw = raw & ((1u16 << bits) - 1);
        let v = convert_to_volts(raw, vref, bits);
        prop_assert!(v >= 0.0);
        prop_assert!(v < vref);
    }

    #[test]
    fn ad799x_is_monotonic(part in part(), raw in 0u16..255) {
        let bits = part.bits();
        prop_assert!(convert_to_volts(raw + 1, 3.3, bits) > convert_to_volts(raw, 3.3, bits));
    }

    #[test]
    fn max6613_inverts(celsius in -55.0f32..130.0) {
        let back = voltage_to_celsius(celsius_to_voltage(celsius));
        prop_assert!((back - celsius).abs() < 1e-3);
    }

    #[test]
    fn ad7193_unipolar_never_negative(raw in 0u32..0x100_0000) {
        prop_assert!(ad7193::convert_to_volts(raw, 2.5, PgaGain::X1, Polarity::Unipolar) >= 0.0);
    }

    #[test]
    fn ad7193_bipolar_range(raw in 0u32..0x100_0000) {
        let v = ad7193::convert_to_volts(raw, 2.5, PgaGain::X8, Polarity::Bipolar);
        prop_assert!((-2.5 / 8.0..=2.5 / 8.0).contains(&v));
    }
}
