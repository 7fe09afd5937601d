//! Revision and Branch - commit addressing
//!
//! A revision is an opaque, strictly increasing signed 64-bit commit
//! number, global across branches. Revisions totally order all commits;
//! this ordering is the sole authority for visibility. A branch is an
//! independent line of history; trunk is the default branch.
//!
//! These are pure types with no behavior beyond construction and access.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A totally ordered, opaque commit number.
///
/// No `Default` implementation exists; a revision is only obtained from
/// the revision authority or from stored data.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Revision(i64);

impl Revision {
    /// Creates a revision with the given value.
    #[inline]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying commit number.
    ///
    /// For serialization and diagnostics; application code should not
    /// depend on the representation.
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// An independent line of revision history.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Branch(u32);

impl Branch {
    /// The default branch every store starts with.
    pub const TRUNK: Branch = Branch(1);

    /// Creates a branch id with the given value.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying branch id.
    #[inline]
    pub fn id(&self) -> u32 {
        self.0
    }

    /// Returns true for the trunk branch.
    #[inline]
    pub fn is_trunk(&self) -> bool {
        *self == Self::TRUNK
    }
}

/// A `(branch, revision)` coordinate addressing one snapshot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub branch: Branch,
    pub revision: Revision,
}

impl Coordinate {
    pub fn new(branch: Branch, revision: Revision) -> Self {
        Self { branch, revision }
    }
}

/// The record of one committed revision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommittedRevision {
    /// The assigned commit number
    revision: Revision,
    /// The branch the commit happened on
    branch: Branch,
    /// The committing transaction
    transaction_id: Uuid,
    /// Wall-clock commit time; informational only, never used for ordering
    committed_at: DateTime<Utc>,
}

impl CommittedRevision {
    pub fn new(revision: Revision, branch: Branch, transaction_id: Uuid) -> Self {
        Self {
            revision,
            branch,
            transaction_id,
            committed_at: Utc::now(),
        }
    }

    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    #[inline]
    pub fn branch(&self) -> Branch {
        self.branch
    }

    #[inline]
    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    #[inline]
    pub fn committed_at(&self) -> DateTime<Utc> {
        self.committed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_ordering() {
        let r1 = Revision::new(1);
        let r5 = Revision::new(5);
        let r10 = Revision::new(10);

        assert!(r1 < r5);
        assert!(r5 < r10);
        assert_eq!(Revision::new(5), r5);
    }

    #[test]
    fn test_revision_is_copy() {
        let r = Revision::new(42);
        let copy = r;
        assert_eq!(r, copy);
        assert_eq!(copy.value(), 42);
    }

    #[test]
    fn test_trunk_constant() {
        assert!(Branch::TRUNK.is_trunk());
        assert!(!Branch::new(2).is_trunk());
        assert_eq!(Branch::TRUNK.id(), 1);
    }

    #[test]
    fn test_coordinate() {
        let coord = Coordinate::new(Branch::TRUNK, Revision::new(7));
        assert_eq!(coord.branch, Branch::TRUNK);
        assert_eq!(coord.revision.value(), 7);
    }

    #[test]
    fn test_committed_revision_record() {
        let txn = Uuid::new_v4();
        let record = CommittedRevision::new(Revision::new(3), Branch::TRUNK, txn);
        assert_eq!(record.revision(), Revision::new(3));
        assert_eq!(record.branch(), Branch::TRUNK);
        assert_eq!(record.transaction_id(), txn);
    }
}
