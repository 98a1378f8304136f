//! DMA buffer traits
//!
//! A DMA engine only needs an address and a length. These traits expose
//! both for the buffers the capi layer accepts; keeping the buffer borrowed
//! for the transfer's lifetime is the caller's job.

/// DMA buffer trait (read-only access)
pub trait DmaBuffer {
    /// Get buffer pointer
    fn as_ptr(&self) -> *const u8;

    /// Get buffer length
    fn len(&self) -> usize;

    /// Check if buffer is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bus address of the first byte
    fn address(&self) -> usize {
        self.as_ptr() as usize
    }
}

/// DMA buffer trait (read-write access)
pub trait DmaBufferMut: DmaBuffer {
    /// Get mutable buffer pointer
    fn as_mut_ptr(&mut self) -> *mut u8;
}

impl DmaBuffer for [u8] {
    fn as_ptr(&self) -> *const u8 {
        <[u8]>::as_ptr(self)
    }

    fn len(&self) -> usize {
        <[u8]>::len(self)
    }
}

impl DmaBufferMut for [u8] {
    fn as_mut_ptr(&mut self) -> *mut u8 {
        <[u8]>::as_mut_ptr(self)
    }
}

impl<const N: usize> DmaBuffer for [u8; N] {
    fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    fn len(&self) -> usize {
        N
    }
}

impl<const N: usize> DmaBufferMut for [u8; N] {
    fn as_mut_ptr(&mut self) -> *mut u8 {
        self.as_mut_slice().as_mut_ptr()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn slice_and_array_report_same_address() {
        let buf = [0u8; 16];
        let slice: &[u8] = &buf;
        assert_eq!(DmaBuffer::address(&buf), DmaBuffer::address(slice));
        assert_eq!(DmaBuffer::len(slice), 16);
    }

    #[test]
    fn empty_slice_is_empty() {
        let slice: &[u8] = &[];
        assert!(DmaBuffer::is_empty(slice));
    }
}
