//! Execution context
//!
//! Everything query execution needs, passed explicitly: the connection
//! pool, the sequence manager, the addressed branch, an optional as-of
//! revision, and the caller's open transaction when running inside one.
//! There is no ambient store handle.

use crate::pool::ConnectionPool;
use crate::sequence::SequenceManager;
use crate::store::{Branch, Revision, Transaction};

/// The explicit execution context.
#[derive(Clone, Copy)]
pub struct ExecContext<'a> {
    /// Pool queries borrow read connections from
    pub pool: &'a ConnectionPool,
    /// Sequence allocator for effectful expressions
    pub sequences: &'a SequenceManager,
    /// Branch every scan addresses
    pub branch: Branch,
    /// Pinned revision; `None` reads at connection-checkout time
    pub as_of: Option<Revision>,
    /// The caller's open transaction, if any
    pub txn: Option<&'a Transaction>,
}

impl<'a> ExecContext<'a> {
    /// A trunk-addressed context with no pinned revision and no
    /// transaction.
    pub fn new(pool: &'a ConnectionPool, sequences: &'a SequenceManager) -> Self {
        Self {
            pool,
            sequences,
            branch: Branch::TRUNK,
            as_of: None,
            txn: None,
        }
    }

    /// Addresses a different branch.
    pub fn on_branch(mut self, branch: Branch) -> Self {
        self.branch = branch;
        self
    }

    /// Pins reads to a specific revision.
    pub fn as_of(mut self, revision: Revision) -> Self {
        self.as_of = Some(revision);
        self
    }

    /// Runs inside the given transaction: its staged changes become
    /// visible and effectful expressions may allocate.
    pub fn in_transaction(mut self, txn: &'a Transaction) -> Self {
        self.txn = Some(txn);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::TypeRegistry;
    use crate::store::KnowledgeBase;

    #[test]
    fn test_context_builders() {
        let kb = KnowledgeBase::new(TypeRegistry::new());
        let pool = ConnectionPool::new(kb, 1);
        let sequences = SequenceManager::new();

        let ctx = ExecContext::new(&pool, &sequences)
            .on_branch(Branch::new(2))
            .as_of(Revision::new(5));

        assert_eq!(ctx.branch, Branch::new(2));
        assert_eq!(ctx.as_of, Some(Revision::new(5)));
        assert!(ctx.txn.is_none());
    }
}
