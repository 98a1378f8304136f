//! GPIO descriptor and platform ops
//!
//! A platform hands out pins through [`GpioPlatformOps::get`]; drivers hold
//! them in a [`GpioDesc`], which tracks the current direction and maps the
//! pin's own error type to [`Errno`].

use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::{Errno, Result};

/// Pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    /// High (logic 1)
    High,
    /// Low (logic 0)
    Low,
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<PinState> for bool {
    fn from(value: PinState) -> Self {
        matches!(value, PinState::High)
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioDirection {
    /// Pin samples the line
    Input,
    /// Pin drives the line
    Output,
}

/// Pull resistor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PullMode {
    /// No pull resistor
    #[default]
    None,
    /// Pull-up
    Up,
    /// Pull-down
    Down,
}

/// GPIO init parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioInitParam {
    /// Port index (0 on single-port parts)
    pub port: u8,
    /// Pin number within the port
    pub number: u32,
    /// Pull resistor
    pub pull: PullMode,
}

impl GpioInitParam {
    /// Pin on port 0 with no pull
    pub const fn new(number: u32) -> Self {
        Self {
            port: 0,
            number,
            pull: PullMode::None,
        }
    }
}

/// A pin whose direction can change at runtime
pub trait FlexPin: InputPin + OutputPin {
    /// Switch direction
    fn set_direction(&mut self, direction: GpioDirection) -> core::result::Result<(), Self::Error>;
}

/// Platform GPIO vtable
pub trait GpioPlatformOps {
    /// Pin type handed out by this platform
    type Pin: FlexPin;

    /// Claim the pin described by `param`
    fn get(&mut self, param: &GpioInitParam) -> Result<Self::Pin>;
}

/// GPIO descriptor
#[derive(Debug)]
pub struct GpioDesc<P> {
    number: u32,
    direction: GpioDirection,
    pin: P,
}

impl<P: FlexPin> GpioDesc<P> {
    /// Claim a pin from the platform. The pin starts as an input.
    pub fn get<O>(ops: &mut O, param: &GpioInitParam) -> Result<Self>
    where
        O: GpioPlatformOps<Pin = P>,
    {
        let mut pin = ops.get(param)?;
        pin.set_direction(GpioDirection::Input).map_err(Errno::io)?;
        tracing::trace!(number = param.number, "gpio claimed");
        Ok(Self {
            number: param.number,
            direction: GpioDirection::Input,
            pin,
        })
    }

    /// Wrap a pin that is already configured as `direction`
    pub fn from_pin(number: u32, direction: GpioDirection, pin: P) -> Self {
        Self {
            number,
            direction,
            pin,
        }
    }

    /// Pin number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Make the pin an input
    pub fn direction_input(&mut self) -> Result<()> {
        self.pin
            .set_direction(GpioDirection::Input)
            .map_err(Errno::io)?;
        self.direction = GpioDirection::Input;
        Ok(())
    }

    /// Make the pin an output driving `value`.
    ///
    /// The level is latched before the direction flips so the line never
    /// glitches to the opposite state.
    pub fn direction_output(&mut self, value: PinState) -> Result<()> {
        self.write(value)?;
        self.pin
            .set_direction(GpioDirection::Output)
            .map_err(Errno::io)?;
        self.direction = GpioDirection::Output;
        Ok(())
    }

    /// Current direction
    pub fn direction(&self) -> GpioDirection {
        self.direction
    }

    /// Drive the pin. Fails with `InvalidArgument` on an input pin.
    pub fn set_value(&mut self, value: PinState) -> Result<()> {
        if self.direction != GpioDirection::Output {
            return Err(Errno::InvalidArgument);
        }
        self.write(value)
    }

    /// Sample the pin
    pub fn get_value(&mut self) -> Result<PinState> {
        self.pin.is_high().map(PinState::from).map_err(Errno::io)
    }

    /// Release the pin
    pub fn remove(self) -> P {
        self.pin
    }

    fn write(&mut self, value: PinState) -> Result<()> {
        match value {
            PinState::High => self.pin.set_high(),
            PinState::Low => self.pin.set_low(),
        }
        .map_err(Errno::io)
    }
}
