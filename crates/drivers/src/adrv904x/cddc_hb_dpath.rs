//! RX CDDC half-band datapath bitfields
//!
//! One register block per RX slice. Per-channel fields repeat every
//! [`CHANNEL_STRIDE`] bytes for channel ids 0..=7.

use super::{BitField, Register32Access, Segment, CHANNEL_STRIDE};
use crate::error::DriverError;

/// Start of the RX slice address space
pub const RX_SLICE_BASE: u32 = 0x6000_0000;
/// Distance between consecutive RX slices
pub const RX_SLICE_STRIDE: u32 = 0x0010_0000;
/// Offset of the CDDC half-band datapath block inside a slice
pub const CDDC_HB_DPATH_OFFSET: u32 = 0x0004_2000;

/// Number of RX slices
pub const RX_SLICES: u8 = 8;
/// Number of carriers per slice
pub const CARRIERS: u8 = 8;

/// Lowest accepted digital carrier gain, in mdB
pub const CARRIER_GAIN_MIN_MDB: i32 = -90_000;
/// Highest accepted digital carrier gain, in mdB
pub const CARRIER_GAIN_MAX_MDB: i32 = 36_000;
/// Register value for 0 dB (7.16 fixed point, full scale 0xFFFF)
pub const CARRIER_GAIN_UNITY: u32 = 65_535;

/// Base address of the datapath block of one RX slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CddcHbDpathChanAddr {
    /// RX0
    Rx0,
    /// RX1
    Rx1,
    /// RX2
    Rx2,
    /// RX3
    Rx3,
    /// RX4
    Rx4,
    /// RX5
    Rx5,
    /// RX6
    Rx6,
    /// RX7
    Rx7,
}

impl CddcHbDpathChanAddr {
    /// All slices in order
    pub const ALL: [Self; 8] = [
        Self::Rx0,
        Self::Rx1,
        Self::Rx2,
        Self::Rx3,
        Self::Rx4,
        Self::Rx5,
        Self::Rx6,
        Self::Rx7,
    ];

    /// Slice number
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Block base address
    #[must_use]
    pub const fn addr(self) -> u32 {
        RX_SLICE_BASE + (self as u32) * RX_SLICE_STRIDE + CDDC_HB_DPATH_OFFSET
    }

    /// Slice `index` (0..=7)
    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }
}

impl TryFrom<u32> for CddcHbDpathChanAddr {
    type Error = noos::Errno;

    fn try_from(addr: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|s| s.addr() == addr)
            .ok_or(noos::Errno::InvalidArgument)
    }
}

const fn per_channel(name: &'static str, segments: &'static [Segment], max: u32) -> BitField {
    BitField {
        name,
        segments,
        max,
        stride: CHANNEL_STRIDE,
    }
}

const fn block(name: &'static str, segments: &'static [Segment], max: u32) -> BitField {
    BitField {
        name,
        segments,
        max,
        stride: 0,
    }
}

/// Bitfield layouts
pub mod fields {
    use super::{block, per_channel, BitField, Segment};

    const fn bytes3(offset: u32, top_mask: u32) -> [Segment; 3] {
        [
            Segment::new(offset, 0xFF),
            Segment::shifted(offset + 1, 0xFF, -8),
            Segment::shifted(offset + 2, top_mask, -16),
        ]
    }

    const fn bytes4(offset: u32) -> [Segment; 4] {
        [
            Segment::new(offset, 0xFF),
            Segment::shifted(offset + 1, 0xFF, -8),
            Segment::shifted(offset + 2, 0xFF, -16),
            Segment::shifted(offset + 3, 0xFF, -24),
        ]
    }

    // two 3-bit selects per byte, even carrier in the low nibble
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    const fn nibble(carrier: u32) -> [Segment; 1] {
        let shift = 4 * (carrier % 2);
        [Segment::shifted(0x138 + carrier / 2, 0x7 << shift, shift as i8)]
    }

    const BAND_SOURCE_SEG: [Segment; 1] = [Segment::new(0x0, 0x3)];
    const CARRIER_ENABLE_SEG: [Segment; 1] = [Segment::new(0xE0, 0xFF)];
    const CARRIER_GAIN_ENABLE_SEG: [Segment; 1] = [Segment::new(0x2, 0x1)];
    const DAISY_CHAIN_EN_SEG: [Segment; 1] = [Segment::new(0x13E, 0xFF)];
    const DEC_RATE_SEG: [Segment; 1] = [Segment::shifted(0x0, 0x3C, 2)];
    const DELAY_CMP_EN_SEG: [Segment; 1] = [Segment::new(0x13C, 0xFF)];
    const DELAY_MEM_EN_SEG: [Segment; 1] = [Segment::new(0x13D, 0xFF)];
    const FREQ_KHZ_SEG: [Segment; 3] = bytes3(0x10, 0xFF);
    const INTERLEAVER_MAX_SLOT_SEG: [Segment; 1] = [Segment::new(0xFC, 0x7F)];
    const SLOT_VALID_LOWER_SEG: [Segment; 4] = bytes4(0x120);
    const SLOT_VALID_UPPER_SEG: [Segment; 4] = bytes4(0x124);
    const MIXER_EN_SEG: [Segment; 1] = [Segment::shifted(0x1, 0x4, 2)];
    const NCO_ENABLE_SEG: [Segment; 1] = [Segment::shifted(0x13, 0x4, 2)];
    const NCO_FTW_UPDATE_SEG: [Segment; 1] = [Segment::shifted(0x13, 0x8, 3)];
    const ONE_MS_CLOCKS_SEG: [Segment; 3] = bytes3(0x14, 0xFF);
    const UPSAMPLER_RATIO_SEG: [Segment; 2] = [
        Segment::shifted(0x0, 0xC0, 6),
        Segment::shifted(0x1, 0x3, -2),
    ];

    /// Band source select
    pub const BAND_SOURCE: BitField = per_channel("band_source", &BAND_SOURCE_SEG, 1);
    /// Carrier enable bitmap
    pub const CARRIER_ENABLE: BitField = block("carrier_enable", &CARRIER_ENABLE_SEG, 255);
    /// Carrier gain enable
    pub const CARRIER_GAIN_ENABLE: BitField =
        per_channel("carrier_gain_enable", &CARRIER_GAIN_ENABLE_SEG, 1);
    /// Daisy-chain enable bitmap
    pub const DAISY_CHAIN_EN: BitField = block("daisy_chain_en", &DAISY_CHAIN_EN_SEG, 255);
    /// Decimation rate
    pub const DEC_RATE: BitField = per_channel("dec_rate", &DEC_RATE_SEG, 5);
    /// Delay compensation enable bitmap
    pub const DELAY_CMP_EN: BitField = block("delay_cmp_en", &DELAY_CMP_EN_SEG, 255);
    /// Delay memory enable bitmap
    pub const DELAY_MEM_EN: BitField = block("delay_mem_en", &DELAY_MEM_EN_SEG, 255);
    /// NCO frequency in kHz (24 bit)
    pub const FREQ_KHZ: BitField = per_channel("freq_khz", &FREQ_KHZ_SEG, 0xFF_FFFF);
    /// Last interleaver slot
    pub const INTERLEAVER_MAX_SLOT: BitField =
        block("interleaver_max_slot", &INTERLEAVER_MAX_SLOT_SEG, 127);
    /// Valid slots 0..=31
    pub const INTERLEAVER_SLOT_VALID_LOWER: BitField =
        block("interleaver_slot_valid_lower", &SLOT_VALID_LOWER_SEG, u32::MAX);
    /// Valid slots 32..=63
    pub const INTERLEAVER_SLOT_VALID_UPPER: BitField =
        block("interleaver_slot_valid_upper", &SLOT_VALID_UPPER_SEG, u32::MAX);
    /// Mixer enable
    pub const MIXER_EN: BitField = per_channel("mixer_en", &MIXER_EN_SEG, 1);
    /// NCO enable
    pub const NCO_ENABLE: BitField = per_channel("nco_enable", &NCO_ENABLE_SEG, 1);
    /// NCO frequency tuning word update strobe
    pub const NCO_FTW_UPDATE: BitField = per_channel("nco_ftw_update", &NCO_FTW_UPDATE_SEG, 1);
    /// Clock cycles per millisecond (24 bit)
    pub const ONE_MS_CLOCKS: BitField =
        per_channel("one_ms_clocks", &ONE_MS_CLOCKS_SEG, 0xFF_FFFF);
    /// Upsampler ratio; bits 1:0 sit at the top of byte 0, bits 3:2 at the
    /// bottom of byte 1
    pub const UPSAMPLER_RATIO: BitField = per_channel("upsampler_ratio", &UPSAMPLER_RATIO_SEG, 5);

    macro_rules! per_carrier {
        ($table:ident, $doc:literal, $name:literal, $max:expr, $layout:ident, $len:literal;
         $($seg:ident = $n:literal),*)  => {
            $(const $seg: [Segment; $len] = $layout($n);)*
            #[doc = $doc]
            pub const $table: [BitField; 8] = [$(block($name, &$seg, $max)),*];
        };
    }

    const fn gain_layout(carrier: u32) -> [Segment; 3] {
        bytes3(0x140 + 4 * carrier, 0x7F)
    }

    per_carrier!(
        CARRIER_GAIN, "Per-carrier digital gain (23 bit, 7.16 fixed point)", "carrier_gain",
        0x7F_FFFF, gain_layout, 3;
        GAIN0 = 0, GAIN1 = 1, GAIN2 = 2, GAIN3 = 3, GAIN4 = 4, GAIN5 = 5, GAIN6 = 6, GAIN7 = 7
    );
    per_carrier!(
        CARRIER_SELECT, "Per-carrier band select (3 bit)", "carrier_select", 7, nibble, 1;
        SEL0 = 0, SEL1 = 1, SEL2 = 2, SEL3 = 3, SEL4 = 4, SEL5 = 5, SEL6 = 6, SEL7 = 7
    );
}

/// mdB gain to carrier gain register value: `10^(mdB / 20000) * 65535`
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // positive, below 2^23
pub fn carrier_gain_from_mdb(gain_mdb: i32) -> u32 {
    let linear = libm::pow(10.0, f64::from(gain_mdb) / 20_000.0);
    (linear * f64::from(CARRIER_GAIN_UNITY)) as u32
}

/// Carrier gain register value to mdB, clamped to the accepted range.
/// A zero register (carrier muted) reads as [`CARRIER_GAIN_MIN_MDB`].
#[must_use]
#[allow(clippy::cast_possible_truncation)] // clamped to the i32 gain range
pub fn carrier_gain_to_mdb(value: u32) -> i32 {
    let db = 20_000.0 * libm::log10(f64::from(value) / f64::from(CARRIER_GAIN_UNITY));
    libm::round(db).clamp(
        f64::from(CARRIER_GAIN_MIN_MDB),
        f64::from(CARRIER_GAIN_MAX_MDB),
    ) as i32
}

/// CDDC half-band datapath accessors over a register bus
pub struct CddcHbDpath<A> {
    bus: A,
}

type Res<T, A> = Result<T, DriverError<<A as Register32Access>::Error>>;

impl<A: Register32Access> CddcHbDpath<A> {
    /// Wrap the register bus
    pub fn new(bus: A) -> Self {
        Self { bus }
    }

    /// Give back the bus
    pub fn release(self) -> A {
        self.bus
    }

    fn set(
        &mut self,
        f: &BitField,
        base: CddcHbDpathChanAddr,
        ch: Option<u8>,
        v: u32,
    ) -> Res<(), A> {
        f.write(&mut self.bus, base.addr(), ch, v)
    }

    fn get(&mut self, f: &BitField, base: CddcHbDpathChanAddr, ch: Option<u8>) -> Res<u32, A> {
        f.read(&mut self.bus, base.addr(), ch)
    }

    /// Band source of `channel`
    pub fn band_source_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        channel: u8,
        value: u8,
    ) -> Res<(), A> {
        self.set(&fields::BAND_SOURCE, base, Some(channel), value.into())
    }

    /// Carrier enable bitmap
    pub fn carrier_enable_set(&mut self, base: CddcHbDpathChanAddr, value: u8) -> Res<(), A> {
        self.set(&fields::CARRIER_ENABLE, base, None, value.into())
    }

    /// Carrier enable bitmap
    pub fn carrier_enable_get(&mut self, base: CddcHbDpathChanAddr) -> Res<u8, A> {
        let v = self.get(&fields::CARRIER_ENABLE, base, None)?;
        u8::try_from(v).map_err(|_| DriverError::InvalidArgument)
    }

    /// Digital gain of `carrier` (0..=7)
    pub fn carrier_gain_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        carrier: u8,
        value: u32,
    ) -> Res<(), A> {
        let f = fields::CARRIER_GAIN
            .get(usize::from(carrier))
            .ok_or(DriverError::InvalidArgument)?;
        self.set(f, base, None, value)
    }

    /// Digital gain of `carrier` (0..=7)
    pub fn carrier_gain_get(&mut self, base: CddcHbDpathChanAddr, carrier: u8) -> Res<u32, A> {
        let f = fields::CARRIER_GAIN
            .get(usize::from(carrier))
            .ok_or(DriverError::InvalidArgument)?;
        self.get(f, base, None)
    }

    /// Gain enable of `channel`
    pub fn carrier_gain_enable_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        channel: u8,
        value: u8,
    ) -> Res<(), A> {
        self.set(&fields::CARRIER_GAIN_ENABLE, base, Some(channel), value.into())
    }

    /// Band of `carrier` (0..=7)
    pub fn carrier_select_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        carrier: u8,
        value: u8,
    ) -> Res<(), A> {
        let f = fields::CARRIER_SELECT
            .get(usize::from(carrier))
            .ok_or(DriverError::InvalidArgument)?;
        self.set(f, base, None, value.into())
    }

    /// Daisy-chain enable bitmap
    pub fn daisy_chain_en_set(&mut self, base: CddcHbDpathChanAddr, value: u8) -> Res<(), A> {
        self.set(&fields::DAISY_CHAIN_EN, base, None, value.into())
    }

    /// Decimation rate of `channel`
    pub fn dec_rate_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        channel: u8,
        value: u8,
    ) -> Res<(), A> {
        self.set(&fields::DEC_RATE, base, Some(channel), value.into())
    }

    /// Delay compensation enable bitmap
    pub fn delay_cmp_en_set(&mut self, base: CddcHbDpathChanAddr, value: u8) -> Res<(), A> {
        self.set(&fields::DELAY_CMP_EN, base, None, value.into())
    }

    /// Delay memory enable bitmap
    pub fn delay_mem_en_set(&mut self, base: CddcHbDpathChanAddr, value: u8) -> Res<(), A> {
        self.set(&fields::DELAY_MEM_EN, base, None, value.into())
    }

    /// NCO frequency of `channel`, kHz
    pub fn freq_khz_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        channel: u8,
        value: u32,
    ) -> Res<(), A> {
        self.set(&fields::FREQ_KHZ, base, Some(channel), value)
    }

    /// Last interleaver slot
    pub fn interleaver_max_slot_set(&mut self, base: CddcHbDpathChanAddr, value: u8) -> Res<(), A> {
        self.set(&fields::INTERLEAVER_MAX_SLOT, base, None, value.into())
    }

    /// Valid-slot bitmap, slots 0..=31
    pub fn interleaver_slot_valid_lower_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        value: u32,
    ) -> Res<(), A> {
        self.set(&fields::INTERLEAVER_SLOT_VALID_LOWER, base, None, value)
    }

    /// Valid-slot bitmap, slots 32..=63
    pub fn interleaver_slot_valid_upper_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        value: u32,
    ) -> Res<(), A> {
        self.set(&fields::INTERLEAVER_SLOT_VALID_UPPER, base, None, value)
    }

    /// Mixer enable of `channel`
    pub fn mixer_en_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        channel: u8,
        value: u8,
    ) -> Res<(), A> {
        self.set(&fields::MIXER_EN, base, Some(channel), value.into())
    }

    /// NCO enable of `channel`
    pub fn nco_enable_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        channel: u8,
        value: u8,
    ) -> Res<(), A> {
        self.set(&fields::NCO_ENABLE, base, Some(channel), value.into())
    }

    /// NCO tuning word update strobe of `channel`
    pub fn nco_ftw_update_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        channel: u8,
        value: u8,
    ) -> Res<(), A> {
        self.set(&fields::NCO_FTW_UPDATE, base, Some(channel), value.into())
    }

    /// Clock cycles per millisecond for `channel`
    pub fn one_ms_clocks_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        channel: u8,
        value: u32,
    ) -> Res<(), A> {
        self.set(&fields::ONE_MS_CLOCKS, base, Some(channel), value)
    }

    /// Upsampler ratio of `channel`
    pub fn upsampler_ratio_set(
        &mut self,
        base: CddcHbDpathChanAddr,
        channel: u8,
        value: u8,
    ) -> Res<(), A> {
        self.set(&fields::UPSAMPLER_RATIO, base, Some(channel), value.into())
    }

    /// Apply `gain_mdb` to every carrier in `carrier_mask` on every slice in
    /// `rx_mask`, enabling the gain stage of each.
    ///
    /// Both masks must be non-zero and the gain within
    /// [`CARRIER_GAIN_MIN_MDB`]..=[`CARRIER_GAIN_MAX_MDB`].
    pub fn rx_carrier_gain_set(
        &mut self,
        rx_mask: u8,
        carrier_mask: u8,
        gain_mdb: i32,
    ) -> Res<(), A> {
        if rx_mask == 0
            || carrier_mask == 0
            || !(CARRIER_GAIN_MIN_MDB..=CARRIER_GAIN_MAX_MDB).contains(&gain_mdb)
        {
            return Err(DriverError::InvalidArgument);
        }
        let value = carrier_gain_from_mdb(gain_mdb);
        tracing::debug!(rx_mask, carrier_mask, gain_mdb, value, "rx carrier gain");

        for rx in CddcHbDpathChanAddr::ALL {
            if rx_mask & (1 << rx.index()) == 0 {
                continue;
            }
            for carrier in 0..CARRIERS {
                if carrier_mask & (1 << carrier) == 0 {
                    continue;
                }
                self.carrier_gain_set(rx, carrier, value)?;
                // gain enable copies are indexed by carrier
                self.carrier_gain_enable_set(rx, carrier, 1)?;
            }
        }
        Ok(())
    }

    /// Gain of one carrier on one slice, in mdB. Both masks must select
    /// exactly one bit.
    #[allow(clippy::cast_possible_truncation)] // trailing_zeros of a u8
    pub fn rx_carrier_gain_get(&mut self, rx_mask: u8, carrier_mask: u8) -> Res<i32, A> {
        if !rx_mask.is_power_of_two() || !carrier_mask.is_power_of_two() {
            return Err(DriverError::InvalidArgument);
        }
        let rx = CddcHbDpathChanAddr::from_index(rx_mask.trailing_zeros() as u8)
            .ok_or(DriverError::InvalidArgument)?;
        let carrier = carrier_mask.trailing_zeros() as u8;
        let value = self.carrier_gain_get(rx, carrier)?;
        Ok(carrier_gain_to_mdb(value))
    }
}
