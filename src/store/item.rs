//! Item identity and version history
//!
//! An item is identified by `(type, object name, branch)` and owns a
//! sequence of versions with non-overlapping validity intervals. The
//! history is a container; visibility decisions live in the knowledge
//! base.

use std::collections::BTreeMap;
use std::fmt;

use super::revision::{Branch, Revision};
use super::value::Value;
use super::version::ItemVersion;

/// The identity of an item: type, object name, branch.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    /// Type name
    pub type_name: String,
    /// Object name, unique within the type and branch
    pub object_name: String,
    /// Owning branch
    pub branch: Branch,
}

impl ObjectKey {
    pub fn new(
        type_name: impl Into<String>,
        object_name: impl Into<String>,
        branch: Branch,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            object_name: object_name.into(),
            branch,
        }
    }

    /// The same identity on a different branch.
    pub fn with_branch(&self, branch: Branch) -> Self {
        Self {
            type_name: self.type_name.clone(),
            object_name: self.object_name.clone(),
            branch,
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            self.type_name,
            self.object_name,
            self.branch.id()
        )
    }
}

/// The complete version history of one item.
#[derive(Clone, Debug, Default)]
pub struct ItemHistory {
    /// Versions in commit order
    versions: Vec<ItemVersion>,
}

impl ItemHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self {
            versions: Vec::new(),
        }
    }

    /// Returns all versions in commit order.
    #[inline]
    pub fn versions(&self) -> &[ItemVersion] {
        &self.versions
    }

    /// Returns true if no versions exist.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Returns the first revision this history knows about.
    pub fn first_revision(&self) -> Option<Revision> {
        self.versions.first().map(|v| v.created_at())
    }

    /// Returns the version valid at the given revision, if any.
    ///
    /// Intervals never overlap, so at most one version matches.
    pub fn version_at(&self, revision: Revision) -> Option<&ItemVersion> {
        self.versions.iter().find(|v| v.valid_at(revision))
    }

    /// Returns the open (current) version, if any.
    pub fn open_version(&self) -> Option<&ItemVersion> {
        self.versions.iter().find(|v| v.is_open())
    }

    /// Closes the open version at the given revision, if one exists.
    pub(crate) fn close_open(&mut self, at: Revision) {
        if let Some(open) = self.versions.iter_mut().find(|v| v.is_open()) {
            open.close(at);
        }
    }

    /// Appends a version.
    pub(crate) fn push(&mut self, version: ItemVersion) {
        self.versions.push(version);
    }
}

/// The resolved state of an item at one revision.
///
/// `created_at` is `None` for rows contributed by an open transaction's
/// uncommitted working set.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemState {
    /// Item identity
    pub key: ObjectKey,
    /// Attribute values at the addressed revision
    pub values: BTreeMap<String, Value>,
    /// Creation revision of the backing version, if committed
    pub created_at: Option<Revision>,
}

impl ItemState {
    /// Returns one attribute value, null if unset.
    pub fn value(&self, attribute: &str) -> &Value {
        self.values.get(attribute).unwrap_or(&Value::Null)
    }

    /// Returns true for uncommitted working-set rows.
    pub fn is_uncommitted(&self) -> bool {
        self.created_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(created: i64, pairs: &[(&str, i64)]) -> ItemVersion {
        let values = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect();
        ItemVersion::new(values, Revision::new(created))
    }

    #[test]
    fn test_version_at_picks_containing_interval() {
        let mut history = ItemHistory::new();
        let mut v1 = version(1, &[("a", 10)]);
        v1.close(Revision::new(5));
        history.push(v1);
        history.push(version(5, &[("a", 20)]));

        assert_eq!(
            history.version_at(Revision::new(3)).unwrap().value("a"),
            &Value::from(10i64)
        );
        assert_eq!(
            history.version_at(Revision::new(5)).unwrap().value("a"),
            &Value::from(20i64)
        );
        assert!(history.version_at(Revision::new(0)).is_none());
    }

    #[test]
    fn test_close_open_then_push_keeps_intervals_disjoint() {
        let mut history = ItemHistory::new();
        history.push(version(1, &[("a", 1)]));
        history.close_open(Revision::new(4));
        history.push(version(4, &[("a", 2)]));

        // Exactly one version matches any revision
        for rev in 1..10 {
            let matches = history
                .versions()
                .iter()
                .filter(|v| v.valid_at(Revision::new(rev)))
                .count();
            assert_eq!(matches, 1, "revision {}", rev);
        }
    }

    #[test]
    fn test_open_version() {
        let mut history = ItemHistory::new();
        history.push(version(1, &[]));
        assert!(history.open_version().is_some());

        history.close_open(Revision::new(2));
        assert!(history.open_version().is_none());
    }

    #[test]
    fn test_object_key_display_and_rebranch() {
        let key = ObjectKey::new("Person", "p1", Branch::TRUNK);
        assert_eq!(format!("{}", key), "Person/p1@1");

        let moved = key.with_branch(Branch::new(2));
        assert_eq!(moved.branch, Branch::new(2));
        assert_eq!(moved.object_name, "p1");
    }

    #[test]
    fn test_first_revision() {
        let mut history = ItemHistory::new();
        assert!(history.first_revision().is_none());
        history.push(version(7, &[]));
        assert_eq!(history.first_revision(), Some(Revision::new(7)));
    }
}
