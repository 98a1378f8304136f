//! Bitfield and byte-order helpers

/// `1 << n`
#[must_use]
pub const fn bit(n: u32) -> u32 {
    1u32 << (n & 31)
}

/// Contiguous mask covering bits `h` down to `l` inclusive (`h >= l`, both < 32)
#[must_use]
pub const fn genmask(h: u32, l: u32) -> u32 {
    (u32::MAX >> (31 - (h & 31))) & (u32::MAX << (l & 31))
}

/// Extract the field selected by `mask` from `word`, right-aligned
#[must_use]
pub const fn field_get(mask: u32, word: u32) -> u32 {
    if mask == 0 {
        return 0;
    }
    (word & mask) >> mask.trailing_zeros()
}

/// Shift `value` into the field selected by `mask`; excess bits are dropped
#[must_use]
pub const fn field_prep(mask: u32, value: u32) -> u32 {
    if mask == 0 {
        return 0;
    }
    (value << mask.trailing_zeros()) & mask
}

/// Clamp a parameter to `[lo, hi]`
#[must_use]
pub fn clamp_param(value: f64, lo: f64, hi: f64) -> f64 {
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// Big-endian 16-bit load
#[must_use]
pub const fn get_unaligned_be16(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Big-endian 24-bit load
#[must_use]
pub const fn get_unaligned_be24(bytes: [u8; 3]) -> u32 {
    ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32
}

/// Big-endian 16-bit store
#[must_use]
pub const fn put_unaligned_be16(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Big-endian 24-bit store; bits above 23 are dropped
#[must_use]
pub const fn put_unaligned_be24(value: u32) -> [u8; 3] {
    let b = value.to_be_bytes();
    [b[1], b[2], b[3]]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn genmask_matches_bit_ranges() {
        assert_eq!(genmask(3, 0), 0xF);
        assert_eq!(genmask(9, 4), 0x3F0);
        assert_eq!(genmask(31, 0), u32::MAX);
        assert_eq!(genmask(31, 31), bit(31));
    }

    #[test]
    fn field_helpers_on_zero_mask() {
        assert_eq!(field_get(0, 0xFFFF), 0);
        assert_eq!(field_prep(0, 0xFFFF), 0);
    }

    #[test]
    fn be24_round_trip_known_value() {
        assert_eq!(get_unaligned_be24([0x12, 0x34, 0x56]), 0x12_3456);
        assert_eq!(put_unaligned_be24(0xAB12_3456), [0x12, 0x34, 0x56]);
    }

    #[test]
    fn clamp_param_bounds() {
        assert_eq!(clamp_param(9.0, 0.0, 3.0), 3.0);
        assert_eq!(clamp_param(-1.0, 0.0, 3.0), 0.0);
        assert_eq!(clamp_param(2.0, 0.0, 3.0), 2.0);
    }

    proptest! {
        #[test]
        fn field_get_inverts_field_prep(h in 0u32..32, l in 0u32..32, v: u32) {
            prop_assume!(h >= l);
            let mask = genmask(h, l);
            let width_mask = mask >> l;
            prop_assert_eq!(field_get(mask, field_prep(mask, v)), v & width_mask);
        }

        #[test]
        fn field_prep_stays_inside_mask(h in 0u32..32, l in 0u32..32, v: u32) {
            prop_assume!(h >= l);
            let mask = genmask(h, l);
            prop_assert_eq!(field_prep(mask, v) & !mask, 0);
        }

        #[test]
        fn clamp_param_result_in_range(v in -1e6f64..1e6, lo in -100f64..0.0, hi in 0f64..100.0) {
            let c = clamp_param(v, lo, hi);
            prop_assert!(c >= lo && c <= hi);
        }
    }
}
