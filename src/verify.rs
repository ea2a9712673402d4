//! Comparison of a computed checksum triple against a source-reported one.
//!
//! A mismatch is a non-fatal verification failure. The two failure classes
//! are distinct signals: a count mismatch points at missing, duplicated or
//! extra pairs, while a checksum-only mismatch points at bit-level corruption
//! or a content swap within same-sized data. What to do about either (retry
//! the partition, abort the job, inspect by hand) is the caller's decision.

use crate::checksum::KvChecksum;
use thiserror::Error;

/// Why a computed triple did not match the expected one.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumMismatch {
    /// Pair counts differ: pairs were lost, added or double-counted.
    #[error("pair count mismatch: expected {expected}, got {actual}")]
    PairCount { expected: u64, actual: u64 },
    /// Byte counts differ: the data changed size somewhere in flight.
    #[error("byte count mismatch: expected {expected}, got {actual}")]
    ByteCount { expected: u64, actual: u64 },
    /// Counts match but the digest does not: corruption or a content swap.
    #[error("checksum mismatch: expected {expected:#018x}, got {actual:#018x}")]
    Checksum { expected: u64, actual: u64 },
}

/// Compares a computed accumulator against an expected triple.
///
/// Counts are checked before the digest so the caller gets the most specific
/// failure class. All three fields must match for success.
pub fn verify(actual: &KvChecksum, expected: &KvChecksum) -> Result<(), ChecksumMismatch> {
    if actual.pair_count() != expected.pair_count() {
        return fail(ChecksumMismatch::PairCount {
            expected: expected.pair_count(),
            actual: actual.pair_count(),
        });
    }
    if actual.byte_count() != expected.byte_count() {
        return fail(ChecksumMismatch::ByteCount {
            expected: expected.byte_count(),
            actual: actual.byte_count(),
        });
    }
    if actual.sum() != expected.sum() {
        return fail(ChecksumMismatch::Checksum {
            expected: expected.sum(),
            actual: actual.sum(),
        });
    }

    tracing::debug!("checksum verified: {}", actual);
    Ok(())
}

fn fail(mismatch: ChecksumMismatch) -> Result<(), ChecksumMismatch> {
    tracing::warn!("checksum verification failed: {}", mismatch);
    Err(mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_triples_verify() {
        let computed = KvChecksum::from_parts(15, 3, 0xDEAD ^ 0xBEEF);
        let expected = KvChecksum::from_parts(15, 3, 0xDEAD ^ 0xBEEF);
        assert_eq!(verify(&computed, &expected), Ok(()));
    }

    #[test]
    fn each_field_mismatch_is_classified() {
        let computed = KvChecksum::from_parts(15, 3, 0xDEAD ^ 0xBEEF);

        assert_eq!(
            verify(&computed, &KvChecksum::from_parts(15, 4, 0xDEAD ^ 0xBEEF)),
            Err(ChecksumMismatch::PairCount {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            verify(&computed, &KvChecksum::from_parts(16, 3, 0xDEAD ^ 0xBEEF)),
            Err(ChecksumMismatch::ByteCount {
                expected: 16,
                actual: 15
            })
        );
        assert_eq!(
            verify(&computed, &KvChecksum::from_parts(15, 3, 0xBEEF)),
            Err(ChecksumMismatch::Checksum {
                expected: 0xBEEF,
                actual: 0xDEAD ^ 0xBEEF
            })
        );
    }

    #[test]
    fn count_mismatch_reported_before_checksum() {
        // Both the pair count and the digest are off; the count is the more
        // specific signal and must win.
        let computed = KvChecksum::from_parts(10, 2, 0x1);
        let expected = KvChecksum::from_parts(10, 3, 0x2);
        assert!(matches!(
            verify(&computed, &expected),
            Err(ChecksumMismatch::PairCount { .. })
        ));
    }

    #[test]
    fn empty_accumulators_verify() {
        assert_eq!(verify(&KvChecksum::new(), &KvChecksum::new()), Ok(()));
    }
}
