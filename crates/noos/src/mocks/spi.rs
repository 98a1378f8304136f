use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::spi::{ErrorType, Operation, SpiDevice};

use super::MockError;

#[derive(Debug, Default)]
struct State {
    rx: VecDeque<u8>,
    fill: u8,
    written: Vec<u8>,
    transactions: usize,
    fail: bool,
}

/// Recording SPI device.
///
/// Bytes shifted out are appended to a log; bytes shifted in come from a
/// queue, then from a fill byte once the queue is empty.
#[derive(Debug, Clone, Default)]
pub struct MockSpi {
    state: Rc<RefCell<State>>,
}

impl MockSpi {
    /// Empty queue, fill byte 0x00
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes to the receive queue
    pub fn queue_read(&self, bytes: &[u8]) {
        self.state.borrow_mut().rx.extend(bytes.iter().copied());
    }

    /// Byte returned when the queue is empty
    pub fn set_fill(&self, fill: u8) {
        self.state.borrow_mut().fill = fill;
    }

    /// Make every following transaction fail
    pub fn set_fail(&self, fail: bool) {
        self.state.borrow_mut().fail = fail;
    }

    /// Everything shifted out so far
    pub fn written(&self) -> Vec<u8> {
        self.state.borrow().written.clone()
    }

    /// Number of chip-select assertions
    pub fn transactions(&self) -> usize {
        self.state.borrow().transactions
    }

    /// Bytes still waiting in the receive queue
    pub fn pending(&self) -> usize {
        self.state.borrow().rx.len()
    }
}

impl State {
    fn next(&mut self) -> u8 {
        let fill = self.fill;
        self.rx.pop_front().unwrap_or(fill)
    }
}

impl ErrorType for MockSpi {
    type Error = MockError;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut s = self.state.borrow_mut();
        if s.fail {
            return Err(MockError::Bus);
        }
        s.transactions += 1;
        for op in operations.iter_mut() {
            match op {
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = s.next();
                    }
                }
                Operation::Write(data) => s.written.extend_from_slice(data),
                Operation::Transfer(read, write) => {
                    s.written.extend_from_slice(write);
                    for b in read.iter_mut() {
                        *b = s.next();
                    }
                }
                Operation::TransferInPlace(buf) => {
                    s.written.extend_from_slice(buf);
                    for b in buf.iter_mut() {
                        *b = s.next();
                    }
                }
                Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}
