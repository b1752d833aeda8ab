//! Crossbeam-based memory reclamation for marklist collections.
//!
//! This crate provides `EpochGuard`, an implementation of the `Guard` trait
//! using crossbeam-epoch for memory reclamation.
//!
//! # Usage
//!
//! ```ignore
//! use marklist_core::SortedSet;
//! use marklist_crossbeam::EpochGuard;
//!
//! let set: SortedSet<EpochGuard> = SortedSet::new();
//! set.insert(42);
//! ```

pub mod epoch_guard;

// Export the Guard implementation
pub use epoch_guard::EpochGuard;
