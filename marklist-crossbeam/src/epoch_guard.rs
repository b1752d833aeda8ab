//! Epoch-based guard implementation using crossbeam-epoch.
//!
//! # Design
//!
//! `EpochGuard` is a zero-sized type that schedules destruction through the
//! global epoch collector. A set parameterized with `EpochGuard` gets
//! epoch-based memory reclamation:
//!
//! ```text
//! SortedSet<EpochGuard>
//!     │
//!     └── Uses crossbeam-epoch for memory safety
//! ```
//!
//! Every public set operation pins the current thread for its duration
//! (via `Guard::pin`). A node deferred while some thread is pinned is not
//! freed until that thread unpins, so traversals never dereference freed
//! memory even when they lose a race against a physical unlink.

use crossbeam_epoch::{self as epoch, Guard as CrossbeamGuard};
use marklist_core::guard::Guard;

/// Epoch-based memory reclamation guard.
///
/// This guard uses crossbeam-epoch to safely defer node destruction.
/// Nodes are not freed until all threads have advanced past the epoch
/// in which they were unlinked.
///
/// Unlike `DeferredGuard` which stores pending destructions itself,
/// `EpochGuard` is stateless - all state lives in the global epoch
/// collector. This keeps collections holding it `Send + Sync` for free.
///
/// # Performance
///
/// - **Pin overhead**: Very low (thread-local check)
/// - **Reclamation**: Batched, amortized O(1) per node
///
#[derive(Clone, Copy, Default)]
pub struct EpochGuard {
    // Zero-sized - all state is in the global epoch collector
}

impl EpochGuard {
    /// Create a new epoch guard.
    ///
    /// This is a no-op since EpochGuard is stateless - the actual pinning
    /// happens when operations are performed.
    pub fn new() -> Self {
        EpochGuard {}
    }
}

impl Guard for EpochGuard {
    /// An actual crossbeam epoch guard that pins the current thread for
    /// the duration of an operation.
    type ReadGuard = CrossbeamGuard;

    fn pin() -> Self::ReadGuard {
        epoch::pin()
    }

    unsafe fn defer_destroy<N>(&self, node: *mut N, dealloc: unsafe fn(*mut N)) {
        // Pin, schedule, unpin. The destruction runs after every thread
        // pinned at defer time has advanced past the current epoch.
        let guard = epoch::pin();
        unsafe {
            guard.defer_unchecked(move || {
                dealloc(node);
            });
        }
        // guard dropped here - unpins the thread
    }
}
