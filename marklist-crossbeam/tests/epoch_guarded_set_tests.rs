//! Integration tests for SortedSet with epoch-based reclamation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rand::seq::SliceRandom;

use marklist_core::{Key, SortedSet};
use marklist_crossbeam::EpochGuard;

fn create_epoch_set() -> Arc<SortedSet<EpochGuard>> {
    Arc::new(SortedSet::new())
}

#[test]
fn test_basic_operations() {
    let set: SortedSet<EpochGuard> = SortedSet::new();

    assert!(set.insert(5));
    assert!(set.insert(10));
    assert!(set.insert(3));
    assert!(set.insert(7));
    assert!(set.insert(1));

    // Duplicate rejection
    assert!(!set.insert(5));
    assert!(!set.insert(10));

    assert!(set.contains(1));
    assert!(set.contains(3));
    assert!(set.contains(5));
    assert!(set.contains(7));
    assert!(set.contains(10));
    assert!(!set.contains(2));
    assert!(!set.contains(99));

    assert!(set.remove(3));
    assert!(!set.contains(3));
    assert!(!set.remove(3)); // Already removed

    assert_eq!(set.to_vec(), vec![1, 5, 7, 10]);
}

#[test]
fn test_concurrent_churn_reclaims_safely() {
    let set = create_epoch_set();
    let num_threads = 8;
    let rounds = 50;
    let range = 200 as Key;

    // Every thread hammers the same small key range so traversals keep
    // racing against unlinks; epoch reclamation must keep every observed
    // node alive.
    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                for _ in 0..rounds {
                    for key in 0..range {
                        if t % 2 == 0 {
                            set.insert(key);
                        } else {
                            set.remove(key);
                        }
                        set.contains(key);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let keys = set.to_vec();
    for window in keys.windows(2) {
        assert!(window[0] < window[1], "chain is not strictly sorted");
    }
}

#[test]
fn test_insert_then_remove_workload_converges_to_empty() {
    let set = create_epoch_set();
    let num_threads = 4;
    let universe = 20_000usize;

    let mut keys: Vec<Key> = (1..=universe as Key).collect();
    keys.shuffle(&mut rand::thread_rng());
    let keys = Arc::new(keys);

    let cursor = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let set = Arc::clone(&set);
            let keys = Arc::clone(&keys);
            let cursor = Arc::clone(&cursor);
            thread::spawn(move || loop {
                let i = cursor.fetch_add(1, Ordering::Relaxed);
                if i >= keys.len() {
                    break;
                }
                let key = keys[i];
                assert!(set.insert(key));
                assert!(set.remove(key));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(set.is_empty());
}

#[test]
fn test_no_double_delete_under_epoch() {
    let set = create_epoch_set();
    let num_threads = 8;
    let rounds = 100;

    for round in 0..rounds {
        let key = round as Key;
        assert!(set.insert(key));

        let barrier = Arc::new(Barrier::new(num_threads));
        let successes = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let set = Arc::clone(&set);
                let barrier = Arc::clone(&barrier);
                let successes = Arc::clone(&successes);
                thread::spawn(move || {
                    barrier.wait();
                    if set.remove(key) {
                        successes.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(successes.load(Ordering::Relaxed), 1);
    }
}

#[test]
fn test_iteration_under_concurrent_writes() {
    let set = create_epoch_set();
    let stable = 500 as Key;

    for i in 0..stable {
        set.insert(i * 2);
    }

    let writer = {
        let set = Arc::clone(&set);
        thread::spawn(move || {
            for round in 0..100 {
                for i in 0..stable {
                    let key = i * 2 + 1;
                    if round % 2 == 0 {
                        set.insert(key);
                    } else {
                        set.remove(key);
                    }
                }
            }
        })
    };

    // Iteration must always be sorted and always include the stable keys
    for _ in 0..50 {
        let keys = set.to_vec();
        for window in keys.windows(2) {
            assert!(window[0] < window[1]);
        }
        let evens = keys.iter().filter(|k| *k % 2 == 0).count();
        assert_eq!(evens, stable as usize);
    }

    writer.join().unwrap();
}
