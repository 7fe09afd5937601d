//! Deletion diff
//!
//! The set of object identities that existed at the first coordinate and
//! are gone at the second. Runs on a borrowed read connection,
//! independent of any open write transaction; the caller releases the
//! connection through its scope guard.

use std::collections::BTreeSet;

use crate::pool::PooledConnection;
use crate::store::{Coordinate, ItemState, ObjectKey};

use super::errors::{DiffError, DiffResult};

/// Query for identities deleted between two coordinates.
#[derive(Debug, Clone)]
pub struct DiffDeletionQuery {
    /// The diffed type
    type_name: String,
}

impl DiffDeletionQuery {
    /// Creates a deletion diff for one type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    /// Returns the diffed type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Computes the identities that existed at `from` and are gone at
    /// `to`. Each deleted identity appears exactly once.
    pub fn execute(
        &self,
        conn: &PooledConnection,
        from: Coordinate,
        to: Coordinate,
    ) -> DiffResult<Vec<ObjectKey>> {
        let rows_before = self.scan(conn, from)?;
        let rows_after = self.scan(conn, to)?;

        let surviving: BTreeSet<&str> = rows_after
            .iter()
            .map(|row| row.key.object_name.as_str())
            .collect();

        Ok(rows_before
            .into_iter()
            .filter(|row| !surviving.contains(row.key.object_name.as_str()))
            .map(|row| row.key)
            .collect())
    }

    fn scan(&self, conn: &PooledConnection, at: Coordinate) -> DiffResult<Vec<ItemState>> {
        let kb = conn
            .knowledge_base()
            .map_err(|e| DiffError::failed("deletion diff", &self.type_name, e))?;
        kb.scan(&self.type_name, at.branch, at.revision, &[], None)
            .map_err(|e| DiffError::failed("deletion diff", &self.type_name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{MetaObject, MoAttribute, TypeRegistry};
    use crate::pool::ConnectionPool;
    use crate::store::{Branch, KnowledgeBase, Session, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn store() -> Arc<KnowledgeBase> {
        let mut registry = TypeRegistry::new();
        let mut ty = MetaObject::new("B");
        ty.add_attribute(MoAttribute::string("a2")).unwrap();
        ty.freeze();
        registry.define(ty).unwrap();
        KnowledgeBase::new(registry)
    }

    fn create(session: &mut Session, name: &str, a2: Option<&str>) {
        let mut values = BTreeMap::new();
        if let Some(v) = a2 {
            values.insert("a2".to_string(), Value::from(v));
        }
        session.create_object("B", name, values).unwrap();
    }

    #[test]
    fn test_deleted_object_reported_exactly_once() {
        let kb = store();
        let mut session = Session::new(kb.clone());

        session.begin(Branch::TRUNK).unwrap();
        create(&mut session, "b1", Some("x"));
        create(&mut session, "b2", None);
        let r1 = session.commit().unwrap();

        session.begin(Branch::TRUNK).unwrap();
        session.delete_object("B", "b1").unwrap();
        let r2 = session.commit().unwrap();

        let pool = ConnectionPool::new(kb, 1);
        let conn = pool.acquire().unwrap();
        let deleted = DiffDeletionQuery::new("B")
            .execute(
                &conn,
                Coordinate::new(Branch::TRUNK, r1),
                Coordinate::new(Branch::TRUNK, r2),
            )
            .unwrap();

        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].object_name, "b1");
    }

    #[test]
    fn test_surviving_and_created_objects_absent() {
        let kb = store();
        let mut session = Session::new(kb.clone());

        session.begin(Branch::TRUNK).unwrap();
        create(&mut session, "b1", Some("x"));
        let r1 = session.commit().unwrap();

        session.begin(Branch::TRUNK).unwrap();
        create(&mut session, "b2", Some("y"));
        let r2 = session.commit().unwrap();

        let pool = ConnectionPool::new(kb, 1);
        let conn = pool.acquire().unwrap();
        let deleted = DiffDeletionQuery::new("B")
            .execute(
                &conn,
                Coordinate::new(Branch::TRUNK, r1),
                Coordinate::new(Branch::TRUNK, r2),
            )
            .unwrap();

        assert!(deleted.is_empty());
    }

    #[test]
    fn test_bad_coordinate_wrapped_with_context() {
        let kb = store();
        let pool = ConnectionPool::new(kb.clone(), 1);
        let conn = pool.acquire().unwrap();

        let err = DiffDeletionQuery::new("B")
            .execute(
                &conn,
                Coordinate::new(Branch::new(9), kb.head_revision()),
                Coordinate::new(Branch::TRUNK, kb.head_revision()),
            )
            .unwrap_err();
        assert!(err.message().contains("deletion diff"));
        assert!(err.message().contains('B'));
    }
}
