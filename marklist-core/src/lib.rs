pub mod guard;
pub mod set;

// Re-export the main types for convenience
pub use guard::{DeferredGuard, Guard};
pub use set::{Iter, Key, SortedSet};
