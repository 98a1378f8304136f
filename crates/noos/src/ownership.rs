//! Caller-owned vs driver-owned storage
//!
//! A handle either lives in storage the caller provides or is boxed by the
//! driver. The choice is made once, at construction, and dropping the
//! [`Owned`] value releases exactly what the driver allocated.

use alloc::boxed::Box;
use core::ops::{Deref, DerefMut};

/// Storage for a handle: either borrowed from the caller or boxed by the
/// driver.
pub enum Owned<'a, T> {
    /// The caller supplied the storage; it outlives the handle.
    Caller(&'a mut T),
    /// The driver allocated the storage; dropping frees it.
    Driver(Box<T>),
}

impl<'a, T> Owned<'a, T> {
    /// Place `value` into caller storage if given, otherwise box it.
    ///
    /// Caller storage is overwritten in place; whatever it held before is
    /// dropped.
    pub fn place(storage: Option<&'a mut Option<T>>, value: T) -> Self {
        match storage {
            Some(slot) => Self::Caller(slot.insert(value)),
            None => Self::Driver(Box::new(value)),
        }
    }

    /// `true` when the storage belongs to the caller.
    pub fn is_caller_owned(&self) -> bool {
        matches!(self, Self::Caller(_))
    }
}

impl<T> Deref for Owned<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Self::Caller(r) => r,
            Self::Driver(b) => b,
        }
    }
}

impl<T> DerefMut for Owned<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match self {
            Self::Caller(r) => r,
            Self::Driver(b) => b,
        }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for Owned<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let tag = if self.is_caller_owned() { "Caller" } else { "Driver" };
        f.debug_tuple(tag).field(&**self).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn caller_storage_is_used_in_place() {
        let mut storage = None;
        {
            let mut owned = Owned::place(Some(&mut storage), 7u32);
            assert!(owned.is_caller_owned());
            *owned += 1;
        }
        assert_eq!(storage, Some(8));
    }

    #[test]
    fn missing_storage_is_boxed() {
        let owned = Owned::place(None, 7u32);
        assert!(!owned.is_caller_owned());
        assert_eq!(*owned, 7);
    }

    #[test]
    fn two_boxed_values_are_independent() {
        let mut a = Owned::<u32>::place(None, 1);
        let b = Owned::<u32>::place(None, 2);
        assert!(!core::ptr::eq(&*a, &*b));
        *a = 10;
        drop(a);
        assert_eq!(*b, 2);
    }
}
