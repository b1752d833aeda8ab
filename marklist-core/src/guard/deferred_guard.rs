//! Deferred guard implementation for testing.
//!
//! This module provides `DeferredGuard`, a simple guard implementation that
//! defers all node destruction until the guard is dropped.

use std::sync::Mutex;

#[cfg(debug_assertions)]
use std::collections::HashSet;

use super::Guard;

/// A simple guard that defers all node destruction until the guard is dropped.
///
/// This is useful for testing where you want predictable destruction timing.
/// Not suitable for long-running applications as memory accumulates until
/// the owning collection (and with it the guard) is dropped.
///
/// # Thread Safety
///
/// `DeferredGuard` uses a `Mutex` internally to safely collect nodes from
/// multiple threads. The nodes are freed when the guard is dropped.
///
pub struct DeferredGuard {
    deferred: Mutex<Vec<DeferredNode>>,
    #[cfg(debug_assertions)]
    seen: Mutex<HashSet<usize>>,
}

struct DeferredNode {
    ptr: *mut (),
    dealloc: unsafe fn(*mut ()),
}

// Safety: DeferredNode only stores the pointer and its deallocation
// function; all access is synchronized through the Mutex above.
unsafe impl Send for DeferredNode {}

impl DeferredGuard {
    /// Create a new deferred guard.
    pub fn new() -> Self {
        DeferredGuard {
            deferred: Mutex::new(Vec::new()),
            #[cfg(debug_assertions)]
            seen: Mutex::new(HashSet::new()),
        }
    }
}

impl Default for DeferredGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeferredGuard {
    fn drop(&mut self) {
        let nodes = self.deferred.get_mut().unwrap();
        for node in nodes.drain(..) {
            unsafe {
                (node.dealloc)(node.ptr);
            }
        }
    }
}

impl Guard for DeferredGuard {
    /// ReadGuard is a no-op for DeferredGuard - nodes stay allocated until
    /// the collection's stored guard drops.
    type ReadGuard = ();

    fn pin() -> Self::ReadGuard {}

    unsafe fn defer_destroy<N>(&self, node: *mut N, dealloc: unsafe fn(*mut N)) {
        // A node deferred twice would be freed twice; catch the bug at the
        // hand-off rather than at the free.
        #[cfg(debug_assertions)]
        {
            let addr = node as usize;
            let mut seen = self.seen.lock().unwrap();
            if !seen.insert(addr) {
                panic!("duplicate defer_destroy at {:#x}", addr);
            }
        }

        let node = DeferredNode {
            ptr: node as *mut (),
            dealloc: unsafe {
                std::mem::transmute::<unsafe fn(*mut N), unsafe fn(*mut ())>(dealloc)
            },
        };
        self.deferred.lock().unwrap().push(node);
    }
}
