//! SequenceManager - collision-free monotonic allocation
//!
//! Each sequence name owns a row with its own lock; the lock is held for
//! the duration of one allocation, so two concurrent transactions can
//! never observe or assign the same value. Allocation requires an active
//! transaction. A minted value is never reclaimed, not even when the
//! transaction rolls back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::observability::Logger;
use crate::store::Transaction;

use super::errors::{SequenceError, SequenceResult};

/// Default first value of a fresh sequence.
pub const DEFAULT_START: i64 = 1;

/// One sequence row: the last value handed out.
#[derive(Debug)]
struct SequenceRow {
    last: i64,
}

/// Allocator of named, monotonically increasing values.
#[derive(Debug)]
pub struct SequenceManager {
    /// Row registry; each row carries its own lock
    rows: Mutex<HashMap<String, Arc<Mutex<SequenceRow>>>>,
    /// First value handed out by fresh sequences
    start: i64,
    /// Allocation event log
    logger: Logger,
}

impl SequenceManager {
    /// Creates a manager whose fresh sequences start at [`DEFAULT_START`].
    pub fn new() -> Self {
        Self::with_start(DEFAULT_START)
    }

    /// Creates a manager with an explicit start value, as computed by the
    /// bootstrap utility for migrated sequences.
    pub fn with_start(start: i64) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            start,
            logger: Logger::new("sequence"),
        }
    }

    /// Allocates the next value of the named sequence.
    ///
    /// Requires the caller's active transaction; the dedicated
    /// no-transaction condition is distinct from backend failures.
    pub fn next_value(&self, txn: Option<&Transaction>, name: &str) -> SequenceResult<i64> {
        if txn.is_none() {
            return Err(SequenceError::no_transaction(name));
        }

        let row = {
            let mut rows = self.rows.lock().expect("sequence registry lock poisoned");
            rows.entry(name.to_string())
                .or_insert_with(|| {
                    Arc::new(Mutex::new(SequenceRow {
                        last: self.start - 1,
                    }))
                })
                .clone()
        };

        // Row lock held for the duration of the allocation.
        let mut row = row.lock().expect("sequence row lock poisoned");
        row.last += 1;
        let value = row.last;
        self.logger.info(
            "sequence_allocated",
            &[("sequence", name), ("value", &value.to_string())],
        );
        Ok(value)
    }

    /// Returns the last allocated value of a sequence, if it exists.
    pub fn current(&self, name: &str) -> Option<i64> {
        let rows = self.rows.lock().expect("sequence registry lock poisoned");
        rows.get(name).map(|row| {
            row.lock().expect("sequence row lock poisoned").last
        })
    }
}

impl Default for SequenceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::TypeRegistry;
    use crate::sequence::errors::SequenceErrorCode;
    use crate::store::{Branch, KnowledgeBase, Session};

    fn with_transaction<R>(f: impl FnOnce(&Transaction) -> R) -> R {
        let kb = KnowledgeBase::new(TypeRegistry::new());
        let mut session = Session::new(kb);
        session.begin(Branch::TRUNK).unwrap();
        f(session.transaction().unwrap())
    }

    #[test]
    fn test_allocation_requires_transaction() {
        let sequences = SequenceManager::new();
        let err = sequences.next_value(None, "tickets").unwrap_err();
        assert_eq!(err.code(), SequenceErrorCode::RevNoTransaction);
    }

    #[test]
    fn test_values_strictly_increase() {
        let sequences = SequenceManager::new();
        with_transaction(|txn| {
            let a = sequences.next_value(Some(txn), "tickets").unwrap();
            let b = sequences.next_value(Some(txn), "tickets").unwrap();
            let c = sequences.next_value(Some(txn), "tickets").unwrap();
            assert_eq!((a, b, c), (1, 2, 3));
        });
    }

    #[test]
    fn test_sequences_are_independent() {
        let sequences = SequenceManager::new();
        with_transaction(|txn| {
            assert_eq!(sequences.next_value(Some(txn), "a").unwrap(), 1);
            assert_eq!(sequences.next_value(Some(txn), "b").unwrap(), 1);
            assert_eq!(sequences.next_value(Some(txn), "a").unwrap(), 2);
        });
    }

    #[test]
    fn test_values_survive_rollback() {
        let kb = KnowledgeBase::new(TypeRegistry::new());
        let sequences = SequenceManager::new();
        let mut session = Session::new(kb);

        session.begin(Branch::TRUNK).unwrap();
        let first = sequences
            .next_value(session.transaction(), "tickets")
            .unwrap();
        session.rollback().unwrap();

        session.begin(Branch::TRUNK).unwrap();
        let second = sequences
            .next_value(session.transaction(), "tickets")
            .unwrap();

        // The rolled-back value is never reused.
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[test]
    fn test_explicit_start() {
        let sequences = SequenceManager::with_start(100);
        with_transaction(|txn| {
            assert_eq!(sequences.next_value(Some(txn), "tickets").unwrap(), 100);
        });
        assert_eq!(sequences.current("tickets"), Some(100));
        assert_eq!(sequences.current("unknown"), None);
    }
}
