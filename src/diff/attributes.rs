//! Attribute diff
//!
//! Per surviving or newly created object, either the creation marker or
//! the old and new value of every changed attribute. The comparison is
//! strictly endpoint-to-endpoint: intermediate commits between the two
//! coordinates are invisible, so a value changed and changed back
//! produces no entry. Attributes equal at both endpoints are omitted;
//! objects with no changed attribute are omitted entirely.

use std::collections::{BTreeMap, BTreeSet};

use crate::pool::PooledConnection;
use crate::store::{Coordinate, ItemState, ObjectKey, Value};

use super::errors::{DiffError, DiffResult};

/// One changed attribute: its value at each endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    /// Attribute name
    pub attribute: String,
    /// Value at the first coordinate
    pub old: Value,
    /// Value at the second coordinate
    pub new: Value,
}

/// One object's diff between the two coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    /// Object identity (at the second coordinate for creations)
    key: ObjectKey,
    /// Creation marker or per-attribute changes
    kind: DiffRowKind,
}

#[derive(Debug, Clone, PartialEq)]
enum DiffRowKind {
    /// The object did not exist at the first coordinate
    Creation {
        /// Its attribute values at the second coordinate
        values: BTreeMap<String, Value>,
    },
    /// The object existed at both coordinates
    Update {
        /// Changed attributes, in name order
        changes: Vec<AttributeChange>,
    },
}

impl DiffRow {
    /// Returns the object identity.
    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// Returns true if the object did not exist at the first coordinate.
    pub fn is_creation(&self) -> bool {
        matches!(self.kind, DiffRowKind::Creation { .. })
    }

    /// Returns the created object's values, for creations.
    pub fn created_values(&self) -> Option<&BTreeMap<String, Value>> {
        match &self.kind {
            DiffRowKind::Creation { values } => Some(values),
            DiffRowKind::Update { .. } => None,
        }
    }

    /// Returns the changed attributes, empty for creations.
    pub fn changes(&self) -> &[AttributeChange] {
        match &self.kind {
            DiffRowKind::Creation { .. } => &[],
            DiffRowKind::Update { changes } => changes,
        }
    }

    /// Returns the change for one attribute, if it changed.
    pub fn change(&self, attribute: &str) -> Option<&AttributeChange> {
        self.changes().iter().find(|c| c.attribute == attribute)
    }
}

/// Query for per-attribute deltas between two coordinates.
#[derive(Debug, Clone)]
pub struct DiffAttributesQuery {
    /// The diffed type
    type_name: String,
}

impl DiffAttributesQuery {
    /// Creates an attribute diff for one type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    /// Returns the diffed type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Computes the per-object deltas between `from` and `to`.
    ///
    /// Deleted objects do not appear here; they belong to the deletion
    /// diff.
    pub fn execute(
        &self,
        conn: &PooledConnection,
        from: Coordinate,
        to: Coordinate,
    ) -> DiffResult<Vec<DiffRow>> {
        let before: BTreeMap<String, ItemState> = self
            .scan(conn, from)?
            .into_iter()
            .map(|row| (row.key.object_name.clone(), row))
            .collect();

        let mut rows = Vec::new();
        for after in self.scan(conn, to)? {
            match before.get(&after.key.object_name) {
                None => rows.push(DiffRow {
                    key: after.key.clone(),
                    kind: DiffRowKind::Creation {
                        values: after.values,
                    },
                }),
                Some(old_state) => {
                    let changes = Self::changed_attributes(old_state, &after);
                    if !changes.is_empty() {
                        rows.push(DiffRow {
                            key: after.key.clone(),
                            kind: DiffRowKind::Update { changes },
                        });
                    }
                }
            }
        }
        Ok(rows)
    }

    /// Endpoint-to-endpoint attribute comparison; unset reads as null.
    fn changed_attributes(before: &ItemState, after: &ItemState) -> Vec<AttributeChange> {
        let names: BTreeSet<&String> =
            before.values.keys().chain(after.values.keys()).collect();

        names
            .into_iter()
            .filter_map(|name| {
                let old = before.value(name);
                let new = after.value(name);
                if old == new {
                    None
                } else {
                    Some(AttributeChange {
                        attribute: name.clone(),
                        old: old.clone(),
                        new: new.clone(),
                    })
                }
            })
            .collect()
    }

    fn scan(&self, conn: &PooledConnection, at: Coordinate) -> DiffResult<Vec<ItemState>> {
        let kb = conn
            .knowledge_base()
            .map_err(|e| DiffError::failed("attribute diff", &self.type_name, e))?;
        kb.scan(&self.type_name, at.branch, at.revision, &[], None)
            .map_err(|e| DiffError::failed("attribute diff", &self.type_name, e))
    }
}
