use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};

use super::MockError;
use crate::gpio::{FlexPin, GpioDirection};

#[derive(Debug)]
struct State {
    level: bool,
    direction: GpioDirection,
    script: VecDeque<bool>,
    history: Vec<bool>,
}

/// GPIO pin with a shared level.
///
/// Reads consume the scripted sequence first and fall back to the current
/// level. Every write is recorded.
#[derive(Debug, Clone)]
pub struct MockPin {
    state: Rc<RefCell<State>>,
}

impl Default for MockPin {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPin {
    /// Low input
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                level: false,
                direction: GpioDirection::Input,
                script: VecDeque::new(),
                history: Vec::new(),
            })),
        }
    }

    /// Force the level seen by readers
    pub fn set_level(&self, level: bool) {
        self.state.borrow_mut().level = level;
    }

    /// Current level
    pub fn level(&self) -> bool {
        self.state.borrow().level
    }

    /// Queue levels returned by the next reads
    pub fn script(&self, levels: impl IntoIterator<Item = bool>) {
        self.state.borrow_mut().script.extend(levels);
    }

    /// Levels written so far
    pub fn history(&self) -> Vec<bool> {
        self.state.borrow().history.clone()
    }

    /// Current direction
    pub fn direction(&self) -> GpioDirection {
        self.state.borrow().direction
    }

    fn write(&self, level: bool) {
        let mut s = self.state.borrow_mut();
        s.level = level;
        s.history.push(level);
    }
}

impl ErrorType for MockPin {
    type Error = MockError;
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let mut s = self.state.borrow_mut();
        let level = s.level;
        Ok(s.script.pop_front().unwrap_or(level))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|v| !v)
    }
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

impl StatefulOutputPin for MockPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state.borrow().level)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.state.borrow().level)
    }
}

impl FlexPin for MockPin {
    fn set_direction(&mut self, direction: GpioDirection) -> Result<(), Self::Error> {
        self.state.borrow_mut().direction = direction;
        Ok(())
    }
}
