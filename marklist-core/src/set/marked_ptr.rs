// Marked pointer operations using the LSB as the deletion mark.
//
// Bit layout:
//   Bit 0: DELETE_MARK - the node owning this link is logically deleted
//
// The mark lives in the same word as the pointer, so a single CAS on the
// raw value updates both together. A thread can never observe the pointer
// without its mark, and cannot change one without the other.
//
const DELETE_MARK: usize = 0b1;

/// A pointer that uses the least significant bit as the deletion flag.
#[derive(Copy, Clone)]
pub(crate) struct MarkedPtr<T> {
    ptr: *mut T,
}

impl<T> MarkedPtr<T> {
    /// Create a new MarkedPtr from a (possibly marked) raw pointer.
    #[inline]
    pub(crate) fn new(ptr: *mut T) -> Self {
        MarkedPtr { ptr }
    }

    /// Strip the mark bit from a raw pointer without creating a MarkedPtr.
    #[inline]
    pub(crate) fn unmask(ptr: *mut T) -> *mut T {
        (ptr as usize & !DELETE_MARK) as *mut T
    }

    /// Get the clean pointer without the mark bit (the one you dereference).
    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        (self.ptr as usize & !DELETE_MARK) as *mut T
    }

    /// Get the raw pointer with the mark bit intact (for CAS operations).
    #[inline]
    pub(crate) fn as_raw(&self) -> *mut T {
        self.ptr
    }

    /// Check if the DELETE mark is set.
    #[inline]
    pub(crate) fn is_marked(&self) -> bool {
        (self.ptr as usize & DELETE_MARK) != 0
    }

    /// Create a DELETE-marked version of this pointer.
    #[inline]
    pub(crate) fn with_mark(&self) -> Self {
        MarkedPtr {
            ptr: (self.as_ptr() as usize | DELETE_MARK) as *mut T,
        }
    }
}
