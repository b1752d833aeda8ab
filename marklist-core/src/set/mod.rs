//! Lock-free sorted set.
//!
//! # Organization
//!
//! - [`sorted_set`] - The sorted set itself (Harris's non-blocking linked list)
//! - `marked_ptr` - Internal pointer-with-mark-bit helper (pub(crate))

mod marked_ptr;
mod sorted_set;

pub(crate) use marked_ptr::MarkedPtr;
pub use sorted_set::{Iter, Key, SortedSet};
