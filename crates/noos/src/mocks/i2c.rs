use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

use super::MockError;

#[derive(Debug, Default)]
struct State {
    rx: HashMap<u8, VecDeque<u8>>,
    writes: Vec<(u8, Vec<u8>)>,
    nack: HashSet<u8>,
}

/// Recording I2C bus with a per-address read queue.
///
/// Reads from an address with an empty queue return 0xFF, which is what an
/// idle bus with pull-ups looks like.
#[derive(Debug, Clone, Default)]
pub struct MockI2c {
    state: Rc<RefCell<State>>,
}

impl MockI2c {
    /// Empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes that `address` returns on its next reads
    pub fn queue_read(&self, address: u8, bytes: &[u8]) {
        self.state
            .borrow_mut()
            .rx
            .entry(address)
            .or_default()
            .extend(bytes.iter().copied());
    }

    /// Make `address` refuse to acknowledge
    pub fn set_nack(&self, address: u8, nack: bool) {
        let mut s = self.state.borrow_mut();
        if nack {
            s.nack.insert(address);
        } else {
            s.nack.remove(&address);
        }
    }

    /// All writes in order, with their target address
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.state.borrow().writes.clone()
    }

    /// Writes sent to `address`
    pub fn writes_to(&self, address: u8) -> Vec<Vec<u8>> {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, d)| d.clone())
            .collect()
    }
}

impl ErrorType for MockI2c {
    type Error = MockError;
}

impl I2c<SevenBitAddress> for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut s = self.state.borrow_mut();
        if s.nack.contains(&address) {
            return Err(MockError::Nack);
        }
        for op in operations.iter_mut() {
            match op {
                Operation::Write(data) => s.writes.push((address, data.to_vec())),
                Operation::Read(buf) => {
                    let queue = s.rx.entry(address).or_default();
                    for b in buf.iter_mut() {
                        *b = queue.pop_front().unwrap_or(0xFF);
                    }
                }
            }
        }
        Ok(())
    }
}
