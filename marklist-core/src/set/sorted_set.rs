use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crate::guard::Guard;
use crate::set::MarkedPtr;

/// Key type stored in the set. Sentinel keys are `Key::MIN` (head) and
/// `Key::MAX` (tail); both are excluded from the user-visible key space.
pub type Key = i64;

type NodePtr = *mut SetNode;

const HEAD_KEY: Key = Key::MIN;
const TAIL_KEY: Key = Key::MAX;

//
// Concurrent sorted set implementation based on Harris's paper 'A Pragmatic
// Implementation of Non-Blocking Linked-Lists'.
//
// List structure (sorted ascending, permanent sentinels at both ends):
// ┌──────┐    ┌──────┐    ┌──────┐    ┌──────┐    ┌──────┐
// │ HEAD │───►│  10  │───►│  20  │───►│  30  │───►│ TAIL │
// │ MIN  │    │      │    │      │    │      │    │ MAX  │
// └──────┘    └──────┘    └──────┘    └──────┘    └──────┘
//
// Marked pointer: the mark bit on node.next means the NODE itself is
// logically deleted. Pointer and mark share one word, so one CAS updates
// both together.
//
// INVARIANTS:
// 1. The chain is always sorted by key (ascending)
// 2. No duplicate keys among unmarked nodes
// 3. HEAD and TAIL sentinels are never marked or removed
// 4. A node is handed to the guard exactly once, by the thread whose CAS
//    physically unlinked it
//
// Deletion is two-phase:
//   Phase 1: LOGICAL DELETE  - CAS curr.next from (succ, false) to
//            (succ, true). Mark-only; the pointer stays put. This is the
//            linearization point of remove, and winning it grants exclusive
//            ownership of the deletion.
//   Phase 2: PHYSICAL UNLINK - CAS pred.next from (curr, false) to
//            (succ, false). Best effort in remove; any later locate that
//            walks past a marked node finishes the job.
//

#[derive(Debug)]
pub(crate) struct SetNode {
    key: Key,
    next: AtomicPtr<SetNode>,
}

impl SetNode {
    fn alloc(key: Key, next: NodePtr) -> NodePtr {
        Box::into_raw(Box::new(SetNode {
            key,
            next: AtomicPtr::new(next),
        }))
    }

    /// Load next pointer, mark bit included (Acquire ordering)
    #[inline]
    fn load_next(&self) -> NodePtr {
        self.next.load(Ordering::Acquire)
    }

    /// Store next pointer (Release ordering)
    #[inline]
    fn store_next(&self, ptr: NodePtr) {
        self.next.store(ptr, Ordering::Release)
    }

    /// CAS next pointer (Release/Relaxed ordering)
    #[inline]
    fn cas_next(&self, expected: NodePtr, new: NodePtr) -> Result<NodePtr, NodePtr> {
        self.next
            .compare_exchange(expected, new, Ordering::Release, Ordering::Relaxed)
    }

    /// Deallocate a node.
    ///
    /// # Safety
    /// - `ptr` must have been allocated by `SetNode::alloc`
    /// - Must only be called once; the node must not be accessed afterwards
    unsafe fn dealloc(ptr: NodePtr) {
        unsafe { drop(Box::from_raw(ptr)) };
    }
}

/// The (predecessor, current) node pair bracketing a search key,
/// returned by `locate`.
#[derive(Copy, Clone)]
struct Window {
    pred: NodePtr,
    curr: NodePtr,
}

/// A lock-free sorted set of unique integer keys.
///
/// `insert` and `remove` are lock-free (CAS loop with transparent retry);
/// `contains` is wait-free per call. The guard type `G` decides how
/// physically-unlinked nodes are reclaimed.
pub struct SortedSet<G: Guard> {
    head: AtomicPtr<SetNode>,
    /// Shared guard instance for deferred destruction.
    /// Every unlinked node is deferred to this guard.
    guard: G,
}

impl<G: Guard> SortedSet<G> {
    /// Create an empty set. Both sentinels are installed before the set is
    /// ever shared, so no concurrent access observes a partial chain.
    pub fn new() -> Self {
        let tail = SetNode::alloc(TAIL_KEY, ptr::null_mut());
        let head = SetNode::alloc(HEAD_KEY, tail);
        SortedSet {
            head: AtomicPtr::new(head),
            guard: G::default(),
        }
    }

    /// Get the shared guard instance for this set.
    pub fn guard(&self) -> &G {
        &self.guard
    }

    // Core operation: find with cleanup.
    //
    // Returns adjacent unmarked nodes (pred, curr) with
    // pred.key < key <= curr.key and pred.next == (curr, unmarked) at the
    // time of observation. Splices out every DELETE-marked node it passes;
    // if a splice CAS fails the neighborhood changed under us and the whole
    // traversal restarts from HEAD.
    //
    // The TAIL sentinel carries Key::MAX, so curr never runs off the chain.
    //
    fn locate(&self, key: Key) -> Window {
        'retry: loop {
            let mut pred = self.head.load(Ordering::Acquire);
            let mut curr = MarkedPtr::unmask(unsafe { (*pred).load_next() });

            loop {
                let link = MarkedPtr::new(unsafe { (*curr).load_next() });

                if link.is_marked() {
                    // curr is logically deleted; splice it out before
                    // moving on
                    let succ = link.as_ptr();
                    let snip = unsafe { (*pred).cas_next(curr, succ) };

                    if snip.is_err() {
                        // pred's link changed under us
                        continue 'retry;
                    }

                    // Winning the splice makes curr unreachable; this
                    // thread owns the hand-off to the guard.
                    unsafe { self.guard.defer_destroy(curr, SetNode::dealloc) };
                    curr = succ;
                } else if unsafe { (*curr).key } >= key {
                    debug_assert!(unsafe { (*pred).key } < key);
                    return Window { pred, curr };
                } else {
                    pred = curr;
                    curr = link.as_ptr();
                }
            }
        }
    }

    /// Insert a key into the set.
    ///
    /// Returns `true` if the key was inserted, `false` if it was already
    /// present. Sentinel keys are outside the key space and always return
    /// `false`.
    pub fn insert(&self, key: Key) -> bool {
        if key == HEAD_KEY || key == TAIL_KEY {
            return false;
        }

        let _guard = G::pin();
        let new_node = SetNode::alloc(key, ptr::null_mut());

        loop {
            let Window { pred, curr } = self.locate(key);

            if unsafe { (*curr).key } == key {
                // Already present. The unused allocation was never linked,
                // so it can be freed in place.
                unsafe { SetNode::dealloc(new_node) };
                return false;
            }

            unsafe { (*new_node).store_next(curr) };

            // Linearization point on success: the new node becomes visible
            // in sorted position to every concurrent traversal.
            if unsafe { (*pred).cas_next(curr, new_node) }.is_ok() {
                return true;
            }
            // CAS failed, retry from locate with the same allocation
        }
    }

    /// Remove a key from the set.
    ///
    /// Returns `true` if this call removed the key, `false` if the key was
    /// absent. Across all concurrent removes of the same key at most one
    /// returns `true`: the mark-only CAS is the linearization point and
    /// grants exclusive ownership of the deletion.
    pub fn remove(&self, key: Key) -> bool {
        if key == HEAD_KEY || key == TAIL_KEY {
            return false;
        }

        let _guard = G::pin();

        loop {
            let Window { pred, curr } = self.locate(key);

            if unsafe { (*curr).key } != key {
                return false;
            }

            let link = MarkedPtr::new(unsafe { (*curr).load_next() });

            if link.is_marked() {
                // Another remove claimed curr between locate and here.
                // Retry from locate, which splices curr and reports the
                // key absent (or finds a freshly inserted copy).
                continue;
            }

            let succ = link.as_ptr();

            // Mark-only transition: the pointer stays, the delete bit
            // flips. Fails if another thread marked curr first or changed
            // its successor; either way the whole operation retries from
            // locate, which will observe the new state of the chain.
            let marked = link.with_mark();
            if unsafe { (*curr).cas_next(succ, marked.as_raw()) }.is_err() {
                continue;
            }

            // Best-effort physical unlink. Losing this CAS is not an
            // error: the marked node stays linked and the next locate
            // that passes it splices it out.
            if unsafe { (*pred).cas_next(curr, succ) }.is_ok() {
                unsafe { self.guard.defer_destroy(curr, SetNode::dealloc) };
            }

            return true;
        }
    }

    /// Check whether a key is in the set.
    ///
    /// Pure read path: no CAS, no cleanup, wait-free per call. Reports the
    /// key as present only if its node was unmarked at the moment of
    /// observation.
    pub fn contains(&self, key: Key) -> bool {
        if key == HEAD_KEY || key == TAIL_KEY {
            return false;
        }

        let _guard = G::pin();
        let mut curr = self.head.load(Ordering::Acquire);

        unsafe {
            // Terminates at TAIL (Key::MAX) in the worst case.
            while (*curr).key < key {
                curr = MarkedPtr::unmask((*curr).load_next());
            }

            (*curr).key == key && !MarkedPtr::new((*curr).load_next()).is_marked()
        }
    }

    /// First live (unmarked, non-sentinel) node, or None if the set is empty.
    fn first_node(&self) -> Option<NodePtr> {
        let head = self.head.load(Ordering::Acquire);
        self.next_live_node(head)
    }

    /// Next live node after `node`, skipping marked ones, or None at TAIL.
    fn next_live_node(&self, node: NodePtr) -> Option<NodePtr> {
        let mut curr = MarkedPtr::unmask(unsafe { (*node).load_next() });

        loop {
            unsafe {
                if (*curr).key == TAIL_KEY {
                    return None;
                }

                let link = MarkedPtr::new((*curr).load_next());
                if !link.is_marked() {
                    return Some(curr);
                }

                curr = link.as_ptr();
            }
        }
    }

    /// Iterate over the keys in ascending order.
    ///
    /// The iterator holds a read guard for its whole lifetime, so every
    /// node it visits stays allocated. Keys marked during iteration may or
    /// may not be yielded; no snapshot consistency is promised beyond the
    /// sorted order of what is yielded.
    pub fn iter(&self) -> Iter<'_, G> {
        let guard = G::pin();
        let first = self.first_node();
        Iter {
            _guard: guard,
            set: self,
            curr: first,
        }
    }

    /// Collect all live keys into a Vec, in ascending order.
    pub fn to_vec(&self) -> Vec<Key> {
        self.iter().collect()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the set holds no live keys.
    pub fn is_empty(&self) -> bool {
        let _guard = G::pin();
        self.first_node().is_none()
    }
}

impl<G: Guard> Default for SortedSet<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Guard> Drop for SortedSet<G> {
    fn drop(&mut self) {
        // Free whatever is still on the chain: sentinels, live nodes, and
        // marked nodes whose splice never happened. Unlinked nodes are not
        // reachable from here; the stored guard owns those.
        let mut curr = self.head.load(Ordering::Acquire);

        while !curr.is_null() {
            unsafe {
                let next = MarkedPtr::unmask((*curr).load_next());
                SetNode::dealloc(curr);
                curr = next;
            }
        }
    }
}

/// Iterator over the live keys of a [`SortedSet`], in ascending order.
pub struct Iter<'a, G: Guard> {
    _guard: G::ReadGuard,
    set: &'a SortedSet<G>,
    curr: Option<NodePtr>,
}

impl<G: Guard> Iterator for Iter<'_, G> {
    type Item = Key;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.curr?;
        self.curr = self.set.next_live_node(node);
        Some(unsafe { (*node).key })
    }
}

// ============================================================================
// Tests - single-threaded semantics and basic concurrency
// ============================================================================
// Stress tests are in tests/sorted_set_stress_tests.rs
