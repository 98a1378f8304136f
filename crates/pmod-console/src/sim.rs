//! Simulated Pmod boards for the host
//!
//! The simulators answer bus traffic the way the parts do, producing
//! conversions from an input voltage set by the caller. Control pins are
//! [`MockPin`]s, so the simulated AD7780 converts with whatever gain and
//! filter the driver last selected.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use adi_drivers::ad7780::{status, Ad7780};
use adi_drivers::ad799x::{config, Ad799x, Part, ADDR_0, CHANNELS};
use embedded_hal::digital::{self, InputPin};
use embedded_hal::i2c::{self, I2c, NoAcknowledgeSource};
use embedded_hal::spi::{self, SpiDevice};
use noos::mocks::MockPin;

use crate::pmod_ad2::PmodAd2;
use crate::pmod_ad3::PmodAd3;

/// PmodAD3 wired to a [`SimAd7780`]
pub type SimPmodAd3 = PmodAd3<SimAd7780, SimRdy, MockPin, MockPin, MockPin>;

/// PmodAD2 wired to a [`SimAd7991`]
pub type SimPmodAd2 = PmodAd2<SimAd7991>;

const AD7780_FULL_SCALE: u32 = 0x00FF_FFFF;
const AD7780_MIDSCALE: f32 = 8_388_608.0;

/// AD7780 behind an SPI device
#[derive(Debug, Clone)]
pub struct SimAd7780 {
    input_mv: Rc<RefCell<f32>>,
    vref: f32,
    pdrst: MockPin,
    filter: MockPin,
    gain: MockPin,
}

impl SimAd7780 {
    /// Part with `input_mv` across AIN(+) - AIN(-)
    pub fn new(vref: f32, input_mv: f32) -> Self {
        Self {
            input_mv: Rc::new(RefCell::new(input_mv)),
            vref,
            pdrst: MockPin::new(),
            filter: MockPin::new(),
            gain: MockPin::new(),
        }
    }

    /// Change the differential input
    pub fn set_input_mv(&self, mv: f32) {
        *self.input_mv.borrow_mut() = mv;
    }

    /// The RDY line, low whenever the part is powered
    pub fn rdy(&self) -> SimRdy {
        SimRdy {
            pdrst: self.pdrst.clone(),
        }
    }

    /// Board wired to this part
    pub fn board(&self) -> SimPmodAd3 {
        let adc = Ad7780::new(
            self.clone(),
            self.rdy(),
            self.pdrst.clone(),
            self.filter.clone(),
            self.gain.clone(),
        );
        PmodAd3::new(adc, self.vref)
    }

    /// Offset-binary code for the present input and gain
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn code(&self) -> u32 {
        let gain = if self.gain.level() { 1.0 } else { 128.0 };
        let mv = *self.input_mv.borrow();
        let code = (mv / 1000.0 * gain / self.vref + 1.0) * AD7780_MIDSCALE;
        code.clamp(0.0, AD7780_FULL_SCALE as f32) as u32
    }

    fn status(&self) -> u8 {
        let mut st = status::PAT0 | status::ID0;
        if self.gain.level() {
            st |= status::GAIN;
        }
        if self.filter.level() {
            st |= status::FILTER;
        }
        st
    }

    fn frame(&self) -> [u8; 4] {
        if !self.pdrst.level() {
            return [0xFF; 4];
        }
        let [_, b0, b1, b2] = self.code().to_be_bytes();
        [b0, b1, b2, self.status()]
    }
}

impl spi::ErrorType for SimAd7780 {
    type Error = spi::ErrorKind;
}

impl SpiDevice for SimAd7780 {
    fn transaction(
        &mut self,
        operations: &mut [spi::Operation<'_, u8>],
    ) -> Result<(), Self::Error> {
        let frame = self.frame();
        let mut out = frame.iter().copied().cycle();
        let mut next = || out.next().unwrap_or(0xFF);
        for op in operations.iter_mut() {
            match op {
                spi::Operation::Read(buf) | spi::Operation::TransferInPlace(buf) => {
                    buf.iter_mut().for_each(|b| *b = next());
                }
                spi::Operation::Transfer(read, _) => {
                    read.iter_mut().for_each(|b| *b = next());
                }
                spi::Operation::Write(_) | spi::Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}

/// AD7780 DOUT/RDY seen as an input pin
#[derive(Debug, Clone)]
pub struct SimRdy {
    pdrst: MockPin,
}

impl digital::ErrorType for SimRdy {
    type Error = Infallible;
}

impl InputPin for SimRdy {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.pdrst.level())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.pdrst.level())
    }
}

#[derive(Debug)]
struct Ad7991State {
    inputs: [f32; CHANNELS as usize],
    vdd: f32,
    ext_ref: f32,
    config: u8,
    next: u8,
}

impl Ad7991State {
    /// Next channel in the round-robin sequence
    fn select(&mut self) -> u8 {
        let mask = self.config >> config::CH_SHIFT;
        let ch = (0..CHANNELS)
            .map(|i| (self.next + i) % CHANNELS)
            .find(|ch| mask & (1 << ch) != 0)
            .unwrap_or(0);
        self.next = (ch + 1) % CHANNELS;
        ch
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn convert(&mut self) -> [u8; 2] {
        let ch = self.select();
        let vref = if self.config & config::REF_SEL != 0 {
            self.ext_ref
        } else {
            self.vdd
        };
        let vin = self.inputs.get(usize::from(ch)).copied().unwrap_or(0.0);
        let code = (vin / vref * 4096.0).clamp(0.0, 4095.0) as u16;
        ((u16::from(ch) << 12) | code).to_be_bytes()
    }
}

/// AD7991 behind an I2C bus
#[derive(Debug, Clone)]
pub struct SimAd7991 {
    state: Rc<RefCell<Ad7991State>>,
}

impl SimAd7991 {
    /// Part at [`ADDR_0`] with every input at `volts`
    pub fn new(vdd: f32, ext_ref: f32, volts: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(Ad7991State {
                inputs: [volts; CHANNELS as usize],
                vdd,
                ext_ref,
                config: 0xF0,
                next: 0,
            })),
        }
    }

    /// Change one input. Unknown channels are ignored.
    pub fn set_input(&self, channel: u8, volts: f32) {
        if let Some(v) = self
            .state
            .borrow_mut()
            .inputs
            .get_mut(usize::from(channel))
        {
            *v = volts;
        }
    }

    /// Configuration byte last written
    pub fn configuration(&self) -> u8 {
        self.state.borrow().config
    }

    /// Board wired to this part
    pub fn board(&self) -> SimPmodAd2 {
        let (vdd, ext_ref) = {
            let s = self.state.borrow();
            (s.vdd, s.ext_ref)
        };
        PmodAd2::new(Ad799x::new(self.clone(), ADDR_0, Part::Ad7991), vdd, ext_ref)
    }
}

impl i2c::ErrorType for SimAd7991 {
    type Error = i2c::ErrorKind;
}

impl I2c for SimAd7991 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != ADDR_0 {
            return Err(i2c::ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        let mut s = self.state.borrow_mut();
        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(bytes) => {
                    if let Some(&b) = bytes.last() {
                        s.config = b;
                        s.next = 0;
                    }
                }
                i2c::Operation::Read(buf) => {
                    for chunk in buf.chunks_mut(2) {
                        let word = s.convert();
                        for (dst, src) in chunk.iter_mut().zip(word) {
                            *dst = src;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
