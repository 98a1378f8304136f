//! CDDC half-band datapath accessors against a sparse register map

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use std::collections::BTreeMap;

use adi_drivers::adrv904x::cddc_hb_dpath::{carrier_gain_from_mdb, CARRIER_GAIN_UNITY};
use adi_drivers::adrv904x::{CddcHbDpath, CddcHbDpathChanAddr, Register32Access};
use adi_drivers::DriverError;

#[derive(Debug, Default)]
struct RegMap {
    regs: BTreeMap<u32, u32>,
    writes: Vec<(u32, u32, u32)>,
}

impl RegMap {
    fn reg(&self, addr: u32) -> u32 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }
}

impl Register32Access for RegMap {
    type Error = ();

    fn write32(&mut self, addr: u32, value: u32, mask: u32) -> Result<(), ()> {
        self.writes.push((addr, value, mask));
        let r = self.regs.entry(addr).or_insert(0);
        *r = (*r & !mask) | (value & mask);
        Ok(())
    }

    fn read32(&mut self, addr: u32, mask: u32) -> Result<u32, ()> {
        Ok(self.reg(addr) & mask)
    }
}

const RX2: CddcHbDpathChanAddr = CddcHbDpathChanAddr::Rx2;

fn dpath() -> CddcHbDpath<RegMap> {
    CddcHbDpath::new(RegMap::default())
}

#[test]
fn per_channel_field_uses_stride() {
    let mut d = dpath();
    d.dec_rate_set(RX2, 3, 5).unwrap();
    let bus = d.release();
    assert_eq!(bus.writes, vec![(RX2.addr() + 3 * 28, 5 << 2, 0x3C)]);
}

#[test]
fn upsampler_ratio_straddles_two_bytes() {
    let mut d = dpath();
    d.upsampler_ratio_set(RX2, 1, 0b0101).unwrap();
    let bus = d.release();
    let base = RX2.addr() + 28;
    assert_eq!(
        bus.writes,
        vec![(base, 0b0101 << 6, 0xC0), (base + 1, 0b01, 0x3)]
    );
    assert_eq!(bus.reg(base), 0x40);
    assert_eq!(bus.reg(base + 1), 0x01);
}

#[test]
fn wide_field_is_split_into_bytes() {
    let mut d = dpath();
    d.freq_khz_set(CddcHbDpathChanAddr::Rx0, 0, 0x12_3456).unwrap();
    let bus = d.release();
    let base = CddcHbDpathChanAddr::Rx0.addr();
    assert_eq!(bus.reg(base + 0x10), 0x56);
    assert_eq!(bus.reg(base + 0x11), 0x34);
    assert_eq!(bus.reg(base + 0x12), 0x12);
}

#[test]
fn neighbouring_bits_survive() {
    let mut d = dpath();
    d.band_source_set(RX2, 0, 1).unwrap();
    d.dec_rate_set(RX2, 0, 4).unwrap();
    d.upsampler_ratio_set(RX2, 0, 3).unwrap();
    let bus = d.release();
    assert_eq!(bus.reg(RX2.addr()), 0xC0 | (4 << 2) | 1);
}

#[test]
fn value_out_of_range_is_rejected_before_bus() {
    let mut d = dpath();
    assert_eq!(d.dec_rate_set(RX2, 0, 6), Err(DriverError::InvalidArgument));
    assert_eq!(d.mixer_en_set(RX2, 0, 2), Err(DriverError::InvalidArgument));
    assert_eq!(
        d.freq_khz_set(RX2, 0, 0x100_0000),
        Err(DriverError::InvalidArgument)
    );
    assert_eq!(
        d.carrier_gain_set(RX2, 0, 0x80_0000),
        Err(DriverError::InvalidArgument)
    );
    assert_eq!(
        d.interleaver_max_slot_set(RX2, 128),
        Err(DriverError::InvalidArgument)
    );
    assert!(d.release().writes.is_empty());
}

#[test]
fn channel_out_of_range_is_rejected_before_bus() {
    let mut d = dpath();
    assert_eq!(d.nco_enable_set(RX2, 8, 1), Err(DriverError::InvalidArgument));
    assert_eq!(
        d.one_ms_clocks_set(RX2, 200, 1),
        Err(DriverError::InvalidArgument)
    );
    assert_eq!(
        d.carrier_select_set(RX2, 8, 1),
        Err(DriverError::InvalidArgument)
    );
    assert!(d.release().writes.is_empty());
}

#[test]
fn raw_base_address_must_be_a_slice() {
    assert!(CddcHbDpathChanAddr::try_from(RX2.addr()).is_ok());
    assert!(CddcHbDpathChanAddr::try_from(RX2.addr() + 4).is_err());
}

#[test]
fn carrier_select_packs_two_per_byte() {
    let mut d = dpath();
    d.carrier_select_set(RX2, 4, 5).unwrap();
    d.carrier_select_set(RX2, 5, 3).unwrap();
    let bus = d.release();
    assert_eq!(bus.reg(RX2.addr() + 0x13A), 0x35);
}

#[test]
fn carrier_gain_get_reassembles() {
    let mut d = dpath();
    d.carrier_gain_set(RX2, 6, 0x7A_BCDE).unwrap();
    assert_eq!(d.carrier_gain_get(RX2, 6).unwrap(), 0x7A_BCDE);
    d.carrier_enable_set(RX2, 0xA5).unwrap();
    assert_eq!(d.carrier_enable_get(RX2).unwrap(), 0xA5);
}

#[test]
fn rx_carrier_gain_sets_every_selected_pair() {
    let mut d = dpath();
    d.rx_carrier_gain_set(0b0000_0101, 0b1000_0010, 0).unwrap();

    for rx in [CddcHbDpathChanAddr::Rx0, RX2] {
        assert_eq!(d.carrier_gain_get(rx, 1).unwrap(), CARRIER_GAIN_UNITY);
        assert_eq!(d.carrier_gain_get(rx, 7).unwrap(), CARRIER_GAIN_UNITY);
        assert_eq!(d.carrier_gain_get(rx, 0).unwrap(), 0);
    }
    assert_eq!(d.carrier_gain_get(CddcHbDpathChanAddr::Rx1, 1).unwrap(), 0);

    let bus = d.release();
    let base = RX2.addr();
    assert_eq!(bus.reg(base + 2 + 28) & 1, 1);
    assert_eq!(bus.reg(base + 2 + 7 * 28) & 1, 1);
    assert_eq!(bus.reg(base + 2) & 1, 0);
}

#[test]
fn rx_carrier_gain_round_trips_in_mdb() {
    let mut d = dpath();
    d.rx_carrier_gain_set(1 << 3, 1 << 2, -6_000).unwrap();
    let mdb = d.rx_carrier_gain_get(1 << 3, 1 << 2).unwrap();
    assert!((mdb + 6_000).abs() <= 1, "{mdb}");
    assert!(carrier_gain_from_mdb(-6_000) < CARRIER_GAIN_UNITY);
}

#[test]
fn rx_carrier_gain_rejects_bad_arguments() {
    let mut d = dpath();
    assert_eq!(d.rx_carrier_gain_set(0, 1, 0), Err(DriverError::InvalidArgument));
    assert_eq!(d.rx_carrier_gain_set(1, 0, 0), Err(DriverError::InvalidArgument));
    assert_eq!(
        d.rx_carrier_gain_set(1, 1, 36_001),
        Err(DriverError::InvalidArgument)
    );
    assert_eq!(
        d.rx_carrier_gain_set(1, 1, -90_001),
        Err(DriverError::InvalidArgument)
    );
    assert_eq!(d.rx_carrier_gain_get(0b11, 1), Err(DriverError::InvalidArgument));
    assert!(d.release().writes.is_empty());
}
