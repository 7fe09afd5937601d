//! Read-connection pool
//!
//! Connections are borrowed and released in strict scoped pairs: the
//! guard releases its permit on `close` or on drop, whichever comes
//! first, and `close` is safe to call any number of times. A connection
//! captures its snapshot revision at checkout time; no two holders share
//! one connection.

mod errors;

use std::sync::{Arc, Mutex};

use crate::observability::Logger;
use crate::store::{KnowledgeBase, Revision};

pub use errors::{PoolError, PoolErrorCode, PoolResult};

/// State shared between the pool handle and its guards.
#[derive(Debug)]
struct PoolShared {
    /// The store connections read from
    kb: Arc<KnowledgeBase>,
    /// Fixed pool size
    capacity: usize,
    /// Currently available permits
    available: Mutex<usize>,
    /// Pool event log
    logger: Logger,
}

/// A fixed-capacity pool of read connections to one store.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    shared: Arc<PoolShared>,
}

impl ConnectionPool {
    /// Creates a pool of the given capacity.
    pub fn new(kb: Arc<KnowledgeBase>, capacity: usize) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                kb,
                capacity,
                available: Mutex::new(capacity),
                logger: Logger::new("pool"),
            }),
        }
    }

    /// Borrows a connection.
    ///
    /// The snapshot revision is fixed at checkout: queries on this
    /// connection never observe later commits. Fails immediately when
    /// the pool is exhausted; the core has no timeout machinery.
    pub fn acquire(&self) -> PoolResult<PooledConnection> {
        {
            let mut available = self.shared.available.lock().expect("pool lock poisoned");
            if *available == 0 {
                self.shared.logger.warn(
                    "pool_exhausted",
                    &[("capacity", &self.shared.capacity.to_string())],
                );
                return Err(PoolError::exhausted(self.shared.capacity));
            }
            *available -= 1;
        }
        Ok(PooledConnection {
            shared: self.shared.clone(),
            snapshot: self.shared.kb.head_revision(),
            open: true,
        })
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Returns the number of currently borrowed connections.
    pub fn in_use(&self) -> usize {
        let available = self.shared.available.lock().expect("pool lock poisoned");
        self.shared.capacity - *available
    }
}

/// A borrowed read connection.
///
/// Releases its permit on `close` or drop. Reads fail after close.
#[derive(Debug)]
pub struct PooledConnection {
    shared: Arc<PoolShared>,
    snapshot: Revision,
    open: bool,
}

impl PooledConnection {
    /// Returns the snapshot revision fixed at checkout.
    pub fn snapshot(&self) -> Revision {
        self.snapshot
    }

    /// Returns the store, failing after close.
    pub fn knowledge_base(&self) -> PoolResult<&Arc<KnowledgeBase>> {
        if !self.open {
            return Err(PoolError::closed());
        }
        Ok(&self.shared.kb)
    }

    /// Returns true until `close` (or drop) releases the connection.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Releases the connection back to the pool. Idempotent.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        let mut available = self.shared.available.lock().expect("pool lock poisoned");
        *available += 1;
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::TypeRegistry;

    fn pool(capacity: usize) -> ConnectionPool {
        let kb = KnowledgeBase::new(TypeRegistry::new());
        ConnectionPool::new(kb, capacity)
    }

    #[test]
    fn test_acquire_and_drop_release() {
        let pool = pool(2);
        assert_eq!(pool.in_use(), 0);

        let conn = pool.acquire().unwrap();
        assert_eq!(pool.in_use(), 1);
        drop(conn);
        assert_eq!(pool.in_use(), 0);
    }

    #[test]
    fn test_exhaustion_fails_immediately() {
        let pool = pool(1);
        let _held = pool.acquire().unwrap();

        let err = pool.acquire().unwrap_err();
        assert_eq!(err.code(), PoolErrorCode::RevPoolExhausted);
    }

    #[test]
    fn test_close_is_idempotent() {
        let pool = pool(1);
        let mut conn = pool.acquire().unwrap();

        conn.close();
        conn.close();
        conn.close();
        assert_eq!(pool.in_use(), 0);

        // Drop after explicit close must not release a second permit.
        drop(conn);
        assert_eq!(pool.in_use(), 0);
        assert!(pool.acquire().is_ok());
    }

    #[test]
    fn test_use_after_close_rejected() {
        let pool = pool(1);
        let mut conn = pool.acquire().unwrap();
        conn.close();

        let err = conn.knowledge_base().unwrap_err();
        assert_eq!(err.code(), PoolErrorCode::RevConnectionClosed);
    }

    #[test]
    fn test_snapshot_fixed_at_checkout() {
        let kb = KnowledgeBase::new(TypeRegistry::new());
        let pool = ConnectionPool::new(kb, 1);
        let conn = pool.acquire().unwrap();
        assert_eq!(conn.snapshot(), Revision::new(0));
    }

    #[test]
    fn test_released_connection_can_be_reacquired() {
        let pool = pool(1);
        for _ in 0..5 {
            let conn = pool.acquire().unwrap();
            drop(conn);
        }
        assert_eq!(pool.in_use(), 0);
    }
}
