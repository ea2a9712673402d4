//! Worker-pool accumulation over disjoint batches.
//!
//! Splits a stream of already-encoded batches across `n` OS threads. Each
//! worker owns a private [`KvChecksum`] (no shared mutable state), pulls
//! batches from a shared queue so every batch is folded in exactly once, and
//! hands its partial result back over a channel. The caller thread merges the
//! partials sequentially, which is valid in any arrival order because merge is
//! commutative and associative.

use crate::checksum::{KvChecksum, KvPair};
use std::collections::VecDeque;
use std::sync::{mpsc, Arc, Mutex};

/// Checksums all batches using up to `workers` threads and returns the merged
/// accumulator.
///
/// Equivalent to one accumulator `update`-ing every batch sequentially.
/// `workers` is clamped to at least 1 and at most the number of batches; an
/// empty batch list yields the identity accumulator.
pub fn checksum_batches(batches: Vec<Vec<KvPair>>, workers: usize) -> KvChecksum {
    if batches.is_empty() {
        return KvChecksum::new();
    }

    let num_workers = workers.max(1).min(batches.len());
    let work: Arc<Mutex<VecDeque<Vec<KvPair>>>> =
        Arc::new(Mutex::new(batches.into_iter().collect()));
    let (tx, rx) = mpsc::channel();

    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        handles.push(std::thread::spawn(move || {
            let mut acc = KvChecksum::new();
            loop {
                let batch = match work.lock().unwrap().pop_front() {
                    Some(b) => b,
                    None => break,
                };
                acc.update(&batch);
            }
            let _ = tx.send(acc);
        }));
    }
    drop(tx);

    let mut total = KvChecksum::new();
    for partial in rx {
        total.merge(&partial);
    }
    for h in handles {
        h.join()
            .unwrap_or_else(|e| panic!("checksum worker panicked: {:?}", e));
    }

    tracing::debug!(workers = num_workers, "partitioned checksum done: {}", total);
    total
}
