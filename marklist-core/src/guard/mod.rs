//! Guard trait for memory reclamation strategies.
//!
//! This module defines the `Guard` trait that abstracts over different memory
//! reclamation strategies (epoch-based, deferred, hazard pointers, ...).
//!
//! # Design
//!
//! The `Guard` trait enables the set to be generic over its memory
//! reclamation strategy:
//!
//! ```text
//! SortedSet<G: Guard>
//!     │
//!     ├── SortedSet<EpochGuard>      (production, marklist-crossbeam)
//!     └── SortedSet<DeferredGuard>   (testing)
//! ```
//!
//! A physically-unlinked node may still be referenced by a concurrent
//! traversal that read the link before it was severed. The guard is what
//! makes freeing such a node safe: every public operation pins a read guard
//! for its duration, and unlinked nodes go through `defer_destroy` instead
//! of being freed in place.
//!
//! # Safety Contract
//!
//! Implementations must ensure:
//! 1. Nodes passed to `defer_destroy` are not freed while any thread that
//!    pinned a `ReadGuard` before the unlink is still pinned
//! 2. `defer_destroy` is called at most once per node

mod deferred_guard;

pub use deferred_guard::DeferredGuard;

/// A memory reclamation guard that protects concurrent access to nodes.
///
/// Different implementations provide different trade-offs:
///
/// - **EpochGuard**: Low overhead, batched reclamation (crossbeam-epoch)
/// - **DeferredGuard**: Simple, defers all destruction until the guard drops
///
/// Guards are stored in collections and must be `Send + Sync`. The stored
/// guard is used for deferred destruction scheduling. Actual thread pinning
/// (for epoch-based guards) happens per-operation via [`Guard::pin`], not
/// when the stored guard is created.
///
pub trait Guard: Sized + Default + Send + Sync {
    /// An active guard that protects node reads for its lifetime.
    ///
    /// For epoch-based guards, this holds an actual pinned
    /// `crossbeam_epoch::Guard`. For deferred guards, this can be a unit
    /// type `()` since protection is provided by the collection's stored
    /// guard.
    ///
    type ReadGuard: Sized;

    /// Pin an active read guard.
    ///
    /// This creates a guard that protects all node reads until dropped.
    /// Every traversal of the chain must run under one.
    ///
    fn pin() -> Self::ReadGuard;

    /// Schedule a node for deferred destruction.
    ///
    /// The node will be deallocated once no pinned reader can still hold a
    /// reference to it.
    ///
    /// # Safety
    ///
    /// - `node` must be a valid pointer previously allocated by the collection
    /// - `node` must be unlinked from the collection (not reachable by traversal)
    /// - `dealloc` must be the correct deallocation function for `node`
    ///
    unsafe fn defer_destroy<N>(&self, node: *mut N, dealloc: unsafe fn(*mut N));
}
