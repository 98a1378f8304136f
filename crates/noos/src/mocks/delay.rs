use embedded_hal::delay::DelayNs;

/// Delay that returns immediately and counts the time it was asked for
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDelay {
    total_ns: u64,
}

impl NoopDelay {
    /// Zero elapsed
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every requested delay
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }
}

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns = self.total_ns.saturating_add(u64::from(ns));
    }
}
