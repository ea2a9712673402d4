//! Incremental, mergeable checksum over encoded key/value pairs.
//!
//! Each pair is digested with a single rolling CRC-64 (ECMA polynomial,
//! matching Go's `hash/crc64`) over the key bytes and then, without resetting,
//! the value bytes. Per-pair digests are combined by XOR, so partial checksums
//! computed over disjoint partitions, in any batching and any order, merge
//! into exactly the checksum sequential processing would have produced.

use std::fmt;

/// One encoded key/value byte pair moving through the load pipeline.
///
/// An empty key or value is valid and contributes zero bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvPair {
    pub key: Vec<u8>,
    pub val: Vec<u8>,
}

impl KvPair {
    pub fn new(key: impl Into<Vec<u8>>, val: impl Into<Vec<u8>>) -> Self {
        KvPair {
            key: key.into(),
            val: val.into(),
        }
    }
}

/// Digest of one pair: rolling CRC-64 over key then value, seed 0.
///
/// Digesting the concatenation (rather than hashing key and value separately
/// and combining) means a swapped key/value pair changes the result. A byte
/// moved across the key/value boundary does not: the concatenation is
/// unchanged, so the digest is too. The lookup tables live inside
/// `crc64fast` and are immutable after first use, so workers share them
/// without locking.
fn pair_digest(pair: &KvPair) -> u64 {
    let mut digest = crc64fast::Digest::new();
    digest.write(&pair.key);
    digest.write(&pair.val);
    digest.sum64()
}

/// Running aggregate of byte count, pair count and XOR-combined checksum.
///
/// Created empty (the identity element) or from an externally reported triple
/// via [`KvChecksum::from_parts`]. Each worker owns one instance exclusively;
/// partial results are folded together with [`KvChecksum::merge`] at join
/// points. The type carries no internal synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KvChecksum {
    bytes: u64,
    kvs: u64,
    checksum: u64,
}

impl KvChecksum {
    /// New empty accumulator: zero bytes, zero pairs, zero checksum.
    pub fn new() -> Self {
        KvChecksum::default()
    }

    /// Accumulator built from a source-reported `(bytes, kvs, checksum)`
    /// triple, used as the expected side of a comparison and never updated.
    pub fn from_parts(bytes: u64, kvs: u64, checksum: u64) -> Self {
        KvChecksum {
            bytes,
            kvs,
            checksum,
        }
    }

    /// Folds a batch of pairs into the accumulator.
    ///
    /// No ordering is required; any partition of the same pair multiset into
    /// batches, updated in any order, yields the same final state. Folding
    /// the same pair in twice cancels its checksum contribution (XOR), so the
    /// caller must contribute each source pair exactly once.
    pub fn update(&mut self, pairs: &[KvPair]) {
        let mut checksum = 0u64;
        let mut bytes = 0u64;
        for pair in pairs {
            checksum ^= pair_digest(pair);
            bytes += (pair.key.len() + pair.val.len()) as u64;
        }

        self.bytes += bytes;
        self.kvs += pairs.len() as u64;
        self.checksum ^= checksum;
    }

    /// Folds another accumulator into this one.
    ///
    /// Equivalent to having run `update` on the union of both partitions in
    /// any interleaving. The caller guarantees the partitions are disjoint:
    /// merging overlapping partitions silently cancels the overlap's checksum
    /// contribution and corrupts the result.
    pub fn merge(&mut self, other: &KvChecksum) {
        self.bytes += other.bytes;
        self.kvs += other.kvs;
        self.checksum ^= other.checksum;
    }

    /// XOR of the digests of every pair folded in, directly or via merge.
    pub fn sum(&self) -> u64 {
        self.checksum
    }

    /// Total key+value bytes seen.
    pub fn byte_count(&self) -> u64 {
        self.bytes
    }

    /// Total pairs seen.
    pub fn pair_count(&self) -> u64 {
        self.kvs
    }
}

impl fmt::Display for KvChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bytes={} kvs={} checksum={:#018x}",
            self.bytes, self.kvs, self.checksum
        )
    }
}
