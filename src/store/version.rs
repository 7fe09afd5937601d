//! ItemVersion - one time-bounded state of an item
//!
//! A version is a logically immutable snapshot of an item's attribute
//! values, valid over the half-open revision interval
//! `[created_at, deleted_at)`. `deleted_at` is unbounded until the item is
//! updated or deleted; an update closes the old version at the commit
//! revision and opens a new one at the same revision. Validity intervals
//! of one item's versions never overlap.
//!
//! A version with an empty interval (`created_at == deleted_at`) is a
//! deletion marker: it is visible at no revision but shadows inherited
//! state on child branches.

use std::collections::BTreeMap;

use super::revision::Revision;
use super::value::Value;

/// A single immutable item version.
///
/// All fields are private to enforce immutability; closing the validity
/// interval is the only permitted change and happens exactly once.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemVersion {
    /// Attribute values fixed for the lifetime of this version
    values: BTreeMap<String, Value>,
    /// First revision at which this version is valid
    created_at: Revision,
    /// First revision at which this version is no longer valid
    deleted_at: Option<Revision>,
}

impl ItemVersion {
    /// Creates an open version starting at the given revision.
    pub fn new(values: BTreeMap<String, Value>, created_at: Revision) -> Self {
        Self {
            values,
            created_at,
            deleted_at: None,
        }
    }

    /// Creates a deletion marker at the given revision.
    ///
    /// The marker has an empty validity interval.
    pub fn deletion_marker(created_at: Revision) -> Self {
        Self {
            values: BTreeMap::new(),
            created_at,
            deleted_at: Some(created_at),
        }
    }

    /// Returns the attribute values.
    #[inline]
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Returns one attribute value, null if unset.
    pub fn value(&self, attribute: &str) -> &Value {
        self.values.get(attribute).unwrap_or(&Value::Null)
    }

    /// Returns the first valid revision.
    #[inline]
    pub fn created_at(&self) -> Revision {
        self.created_at
    }

    /// Returns the first no-longer-valid revision, if closed.
    #[inline]
    pub fn deleted_at(&self) -> Option<Revision> {
        self.deleted_at
    }

    /// Returns true while the validity interval is unbounded.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Returns true if the given revision falls inside the validity
    /// interval.
    pub fn valid_at(&self, revision: Revision) -> bool {
        if revision < self.created_at {
            return false;
        }
        match self.deleted_at {
            Some(end) => revision < end,
            None => true,
        }
    }

    /// Closes the validity interval at the given revision.
    ///
    /// Closing is terminal; a closed version is never reopened.
    pub(crate) fn close(&mut self, at: Revision) {
        debug_assert!(self.deleted_at.is_none(), "version closed twice");
        self.deleted_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_open_version_valid_from_creation() {
        let v = ItemVersion::new(values(&[("a", Value::from(1i64))]), Revision::new(5));

        assert!(!v.valid_at(Revision::new(4)));
        assert!(v.valid_at(Revision::new(5)));
        assert!(v.valid_at(Revision::new(500)));
        assert!(v.is_open());
    }

    #[test]
    fn test_closed_version_half_open_interval() {
        let mut v = ItemVersion::new(BTreeMap::new(), Revision::new(5));
        v.close(Revision::new(8));

        assert!(v.valid_at(Revision::new(5)));
        assert!(v.valid_at(Revision::new(7)));
        assert!(!v.valid_at(Revision::new(8)));
        assert!(!v.is_open());
        assert_eq!(v.deleted_at(), Some(Revision::new(8)));
    }

    #[test]
    fn test_deletion_marker_visible_nowhere() {
        let marker = ItemVersion::deletion_marker(Revision::new(6));
        assert!(!marker.valid_at(Revision::new(5)));
        assert!(!marker.valid_at(Revision::new(6)));
        assert!(!marker.valid_at(Revision::new(7)));
    }

    #[test]
    fn test_unset_attribute_reads_null() {
        let v = ItemVersion::new(values(&[("a", Value::from("x"))]), Revision::new(1));
        assert_eq!(v.value("a"), &Value::from("x"));
        assert_eq!(v.value("missing"), &Value::Null);
    }
}
