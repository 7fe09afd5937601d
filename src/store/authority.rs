//! RevisionAuthority - strictly increasing revision assignment
//!
//! One authority per store hands out commit numbers. Assignment happens
//! under the commit lock, so two transactions can never take the same
//! revision. Numbers are never reused, including after rollbacks, and
//! assignment going backwards is fatal.

use super::errors::{StoreError, StoreResult};
use super::revision::Revision;

/// Tracks the highest committed revision and hands out the next one.
#[derive(Debug)]
pub struct RevisionAuthority {
    /// Highest committed revision number; zero means none yet
    highest: i64,
}

impl RevisionAuthority {
    /// Creates an authority for a fresh store.
    pub fn new() -> Self {
        Self { highest: 0 }
    }

    /// Creates an authority resuming from the given committed revision.
    pub fn resume_from(revision: Revision) -> Self {
        Self {
            highest: revision.value(),
        }
    }

    /// Returns the highest committed revision, if any commit happened.
    pub fn highest(&self) -> Option<Revision> {
        if self.highest == 0 {
            None
        } else {
            Some(Revision::new(self.highest))
        }
    }

    /// Returns the revision the next commit will take.
    pub fn next_revision(&self) -> Revision {
        Revision::new(self.highest + 1)
    }

    /// Marks a revision as committed.
    ///
    /// The revision must be exactly the next one; anything else means
    /// commit sequencing broke and is fatal.
    pub fn mark_committed(&mut self, revision: Revision) -> StoreResult<()> {
        let value = revision.value();
        if value != self.highest + 1 {
            return Err(StoreError::non_monotonic_revision(value, self.highest));
        }
        self.highest = value;
        Ok(())
    }
}

impl Default for RevisionAuthority {
    fn default() -> Self {
        Self::new()
    }
}
