// ==============================================
// EXTERNAL SYNCHRONIZATION TESTS (integration)
// ==============================================
//
// The caches do no locking of their own. These tests wrap one in a
// parking_lot lock and hammer it from several threads; every access,
// including `get`, takes the write side.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use evictkit::prelude::*;
use parking_lot::{Mutex, RwLock};

const THREADS: usize = 8;
const OPS_PER_THREAD: u64 = 2_000;
// Above the most accesses any scan key can collect across all threads.
const HOT_WARMUP: u64 = 256;

#[test]
fn lru_behind_rwlock_stays_consistent() {
    let evictions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evictions);
    let cache = LruCache::with_listener(64, move |_k: u64, _v: u64, r: EvictionReason| {
        if r == EvictionReason::Capacity {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    })
    .unwrap();
    let cache = Arc::new(RwLock::new(cache));

    let handles: Vec<_> = (0..THREADS as u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = (t * 31 + i) % 256;
                    let mut guard = cache.write();
                    if guard.get(&key).is_none() {
                        guard.insert(key, key * 2);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let guard = cache.read();
    assert!(guard.len() <= 64);
    guard.check_invariants().unwrap();
    for (k, v) in guard.iter() {
        assert_eq!(*v, k * 2);
    }
    assert!(evictions.load(Ordering::Relaxed) > 0);
}

#[test]
fn lfu_behind_mutex_stays_consistent() {
    let mut warm = LfuCache::<u64, u64>::new(32);
    for t in 0..THREADS as u64 {
        warm.insert(t, t);
        for _ in 0..HOT_WARMUP {
            warm.get(&t);
        }
    }
    let cache = Arc::new(Mutex::new(warm));

    let handles: Vec<_> = (0..THREADS as u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = if i % 4 == 0 { t } else { 100 + (i * 7 + t) % 200 };
                    let mut guard = cache.lock();
                    match guard.get(&key) {
                        Some(v) => assert_eq!(*v, key),
                        None => {
                            guard.insert(key, key);
                        },
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let guard = cache.lock();
    assert_eq!(guard.len(), 32);
    guard.check_invariants().unwrap();
    for (k, v) in guard.iter() {
        assert_eq!(k, v);
    }
    // Warmed keys outrank every scan key, so no interleaving can evict them.
    for t in 0..THREADS as u64 {
        assert!(guard.contains(&t), "hot key {} was evicted", t);
        assert!(guard.frequency(&t) > Some(HOT_WARMUP));
    }
}
