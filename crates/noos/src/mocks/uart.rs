use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_io::{ErrorType, Read, ReadReady, Write};

use super::MockError;

#[derive(Debug, Default)]
struct State {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

/// UART with an rx queue and a tx log.
///
/// An empty rx queue reads as end-of-stream.
#[derive(Debug, Clone, Default)]
pub struct MockUart {
    state: Rc<RefCell<State>>,
}

impl MockUart {
    /// Nothing pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Make bytes available to the reader
    pub fn feed(&self, bytes: &[u8]) {
        self.state.borrow_mut().rx.extend(bytes.iter().copied());
    }

    /// Everything written so far
    pub fn sent(&self) -> Vec<u8> {
        self.state.borrow().tx.clone()
    }

    /// Written bytes as text
    pub fn sent_string(&self) -> std::string::String {
        std::string::String::from_utf8_lossy(&self.state.borrow().tx).into_owned()
    }

    /// Forget what was written
    pub fn clear_sent(&self) {
        self.state.borrow_mut().tx.clear();
    }
}

impl ErrorType for MockUart {
    type Error = MockError;
}

impl Read for MockUart {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut s = self.state.borrow_mut();
        let mut n = 0;
        for slot in buf.iter_mut() {
            match s.rx.pop_front() {
                Some(b) => {
                    *slot = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl ReadReady for MockUart {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.state.borrow().rx.is_empty())
    }
}

impl Write for MockUart {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.state.borrow_mut().tx.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
