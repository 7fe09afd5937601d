//! KnowledgeBase - the versioned, branch-aware object store
//!
//! Visibility rules:
//! - A query addressed at `(branch, revision)` sees exactly the versions
//!   whose validity interval contains the revision.
//! - A branch created from a base coordinate sees the base branch's state
//!   capped at the branch point; its own histories shadow inherited state
//!   once their first version exists at the addressed revision.
//! - A query inside an open transaction additionally sees that
//!   transaction's own staged changes, never another transaction's.
//!
//! All writes funnel through `commit`, which holds the store write lock
//! for the whole revision assignment. That lock is the commit-sequencing
//! guarantee: the working set becomes visible atomically under one new
//! revision.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use crate::meta::{HistoryType, MetaError, MoAttribute, TypeRegistry};
use crate::observability::Logger;

use super::authority::RevisionAuthority;
use super::errors::{StoreError, StoreResult};
use super::filter::AttributeFilter;
use super::item::{ItemHistory, ItemState, ObjectKey};
use super::revision::{Branch, Coordinate, CommittedRevision, Revision};
use super::transaction::Transaction;
use super::value::ObjectRef;
use super::version::ItemVersion;

/// Registration record of one branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchInfo {
    /// Branch id
    pub branch: Branch,
    /// Base coordinate this branch was spawned from; trunk has none
    pub base: Option<Coordinate>,
}

/// Mutable store state, guarded by one lock.
#[derive(Debug)]
struct StoreInner {
    /// Known branches
    branches: BTreeMap<Branch, BranchInfo>,
    /// Item histories by identity
    items: BTreeMap<ObjectKey, ItemHistory>,
    /// Commit log in revision order
    revisions: Vec<CommittedRevision>,
    /// Revision assignment
    authority: RevisionAuthority,
    /// Next branch id to hand out
    next_branch: u32,
}

/// The store.
pub struct KnowledgeBase {
    /// Frozen type vocabulary
    registry: TypeRegistry,
    /// Guarded mutable state
    inner: RwLock<StoreInner>,
    /// Commit/branch event log
    logger: Logger,
}

impl KnowledgeBase {
    /// Creates a store over a frozen registry, with trunk pre-created.
    pub fn new(registry: TypeRegistry) -> Arc<Self> {
        let mut branches = BTreeMap::new();
        branches.insert(
            Branch::TRUNK,
            BranchInfo {
                branch: Branch::TRUNK,
                base: None,
            },
        );
        Arc::new(Self {
            registry,
            inner: RwLock::new(StoreInner {
                branches,
                items: BTreeMap::new(),
                revisions: Vec::new(),
                authority: RevisionAuthority::new(),
                next_branch: Branch::TRUNK.id() + 1,
            }),
            logger: Logger::new("store"),
        })
    }

    /// Returns the type registry.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Returns the highest committed revision; zero before any commit.
    pub fn head_revision(&self) -> Revision {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.authority.highest().unwrap_or(Revision::new(0))
    }

    /// Returns the commit record for a revision, if it exists.
    pub fn revision_info(&self, revision: Revision) -> Option<CommittedRevision> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .revisions
            .iter()
            .find(|r| r.revision() == revision)
            .cloned()
    }

    /// Returns the registration record of a branch.
    pub fn branch_info(&self, branch: Branch) -> StoreResult<BranchInfo> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .branches
            .get(&branch)
            .cloned()
            .ok_or_else(|| StoreError::unknown_branch(branch.id()))
    }

    /// Spawns a new branch from a base coordinate.
    ///
    /// The base branch must exist and the base revision must already be
    /// committed.
    pub fn create_branch(&self, base: Coordinate) -> StoreResult<Branch> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if !inner.branches.contains_key(&base.branch) {
            return Err(StoreError::unknown_branch(base.branch.id()));
        }
        let head = inner.authority.highest().unwrap_or(Revision::new(0));
        if base.revision > head {
            return Err(StoreError::unknown_branch(base.branch.id()));
        }
        let branch = Branch::new(inner.next_branch);
        inner.next_branch += 1;
        inner.branches.insert(
            branch,
            BranchInfo {
                branch,
                base: Some(base),
            },
        );
        self.logger.info(
            "branch_created",
            &[
                ("branch", &branch.id().to_string()),
                ("base_branch", &base.branch.id().to_string()),
                ("base_revision", &base.revision.value().to_string()),
            ],
        );
        Ok(branch)
    }

    /// Resolves the lookup chain for `(branch, revision)`: the branch
    /// itself, then each base capped at its branch point.
    fn chain(inner: &StoreInner, branch: Branch, revision: Revision) -> StoreResult<Vec<(Branch, Revision)>> {
        let mut chain = Vec::new();
        let mut current = branch;
        let mut cap = revision;
        loop {
            let info = inner
                .branches
                .get(&current)
                .ok_or_else(|| StoreError::unknown_branch(current.id()))?;
            chain.push((current, cap));
            match info.base {
                Some(base) => {
                    cap = cap.min(base.revision);
                    current = base.branch;
                }
                None => break,
            }
        }
        Ok(chain)
    }

    /// Resolves one item's state at `(branch, revision)`, walking the
    /// branch chain.
    fn resolve(
        inner: &StoreInner,
        type_name: &str,
        object_name: &str,
        branch: Branch,
        revision: Revision,
    ) -> StoreResult<Option<ItemState>> {
        for (chain_branch, cap) in Self::chain(inner, branch, revision)? {
            let key = ObjectKey::new(type_name, object_name, chain_branch);
            if let Some(history) = inner.items.get(&key) {
                let shadows = history
                    .first_revision()
                    .map_or(false, |first| first <= cap);
                if shadows {
                    return Ok(history.version_at(cap).map(|v| ItemState {
                        key,
                        values: v.values().clone(),
                        created_at: Some(v.created_at()),
                    }));
                }
            }
        }
        Ok(None)
    }

    /// Historical lookup: the item's state as of the given revision.
    pub fn item_as_of(
        &self,
        type_name: &str,
        object_name: &str,
        branch: Branch,
        revision: Revision,
    ) -> StoreResult<Option<ItemState>> {
        let inner = self.inner.read().expect("store lock poisoned");
        Self::resolve(&inner, type_name, object_name, branch, revision)
    }

    /// The item's state at the head revision.
    pub fn item_at_head(
        &self,
        type_name: &str,
        object_name: &str,
        branch: Branch,
    ) -> StoreResult<Option<ItemState>> {
        let inner = self.inner.read().expect("store lock poisoned");
        let head = inner.authority.highest().unwrap_or(Revision::new(0));
        Self::resolve(&inner, type_name, object_name, branch, head)
    }

    /// Scans all instances of a type visible at `(branch, revision)`,
    /// applying pushed filters, overlaying the transaction's working set
    /// when one is supplied.
    ///
    /// Rows are returned in object-name order.
    pub fn scan(
        &self,
        type_name: &str,
        branch: Branch,
        revision: Revision,
        pushed: &[AttributeFilter],
        txn: Option<&Transaction>,
    ) -> StoreResult<Vec<ItemState>> {
        self.registry.get(type_name)?;
        let inner = self.inner.read().expect("store lock poisoned");

        let mut rows: BTreeMap<String, ItemState> = BTreeMap::new();
        let mut shadowed: BTreeSet<String> = BTreeSet::new();

        for (chain_branch, cap) in Self::chain(&inner, branch, revision)? {
            for (key, history) in inner.items.iter() {
                if key.type_name != type_name || key.branch != chain_branch {
                    continue;
                }
                if rows.contains_key(&key.object_name) || shadowed.contains(&key.object_name) {
                    continue;
                }
                let shadows = history
                    .first_revision()
                    .map_or(false, |first| first <= cap);
                if !shadows {
                    continue;
                }
                match history.version_at(cap) {
                    Some(v) => {
                        rows.insert(
                            key.object_name.clone(),
                            ItemState {
                                key: key.clone(),
                                values: v.values().clone(),
                                created_at: Some(v.created_at()),
                            },
                        );
                    }
                    None => {
                        shadowed.insert(key.object_name.clone());
                    }
                }
            }
        }

        // Overlay the caller's own uncommitted changes.
        if let Some(txn) = txn.filter(|t| t.branch() == branch) {
            for key in txn.deletions() {
                if key.type_name == type_name {
                    rows.remove(&key.object_name);
                }
            }
            for (key, changes) in txn.updates() {
                if key.type_name != type_name {
                    continue;
                }
                if let Some(row) = rows.get_mut(&key.object_name) {
                    for (attribute, value) in changes {
                        row.values.insert(attribute.clone(), value.clone());
                    }
                }
            }
            for (key, values) in txn.creations() {
                if key.type_name != type_name {
                    continue;
                }
                rows.insert(
                    key.object_name.clone(),
                    ItemState {
                        key: key.clone(),
                        values: values.clone(),
                        created_at: None,
                    },
                );
            }
        }

        let result = rows
            .into_values()
            .filter(|row| {
                pushed
                    .iter()
                    .all(|filter| filter.matches(row.value(&filter.attribute)))
            })
            .collect();
        Ok(result)
    }

    /// Resolves a reference value according to the attribute's history
    /// type and branch scope.
    ///
    /// - `Current` resolves at the addressed revision.
    /// - `Historic` resolves at the revision stored with the value; the
    ///   resolved version's validity interval contains that revision.
    /// - `Mixed` resolves historically when a revision is stored, else
    ///   like `Current`.
    pub fn resolve_reference(
        &self,
        attribute: &MoAttribute,
        holder_branch: Branch,
        reference: &ObjectRef,
        at: Revision,
    ) -> StoreResult<ItemState> {
        let spec = attribute.kind.reference().ok_or_else(|| {
            StoreError::from(MetaError::incompatible_type(
                &reference.type_name,
                &attribute.name,
                "reference",
                attribute.kind.kind_name(),
            ))
        })?;

        let branch = match spec.scope {
            crate::meta::BranchScope::Global => reference.branch.unwrap_or(holder_branch),
            crate::meta::BranchScope::Local => holder_branch,
        };
        let revision = match spec.history {
            HistoryType::Current => at,
            HistoryType::Historic => reference.revision.ok_or_else(|| {
                StoreError::dangling_reference(
                    &reference.type_name,
                    &reference.object_name,
                    "historic reference without a pinned revision",
                )
            })?,
            HistoryType::Mixed => reference.revision.unwrap_or(at),
        };

        self.item_as_of(&reference.type_name, &reference.object_name, branch, revision)?
            .ok_or_else(|| {
                StoreError::dangling_reference(
                    &reference.type_name,
                    &reference.object_name,
                    format!("no version valid at revision {}", revision.value()),
                )
            })
    }

    /// Commits a transaction's working set under one new revision.
    ///
    /// Holds the store write lock for the whole assignment; validation
    /// runs against the latest committed state under that lock.
    pub(crate) fn commit(&self, txn: Transaction) -> StoreResult<Revision> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let branch = txn.branch();
        if !inner.branches.contains_key(&branch) {
            return Err(StoreError::unknown_branch(branch.id()));
        }
        let head = inner.authority.highest().unwrap_or(Revision::new(0));

        // Re-validate identities against committed state.
        for key in txn.creations().keys() {
            if Self::resolve(&inner, &key.type_name, &key.object_name, branch, head)?.is_some() {
                return Err(StoreError::duplicate_object(
                    &key.type_name,
                    &key.object_name,
                ));
            }
        }
        for key in txn.updates().keys().chain(txn.deletions().iter()) {
            if Self::resolve(&inner, &key.type_name, &key.object_name, branch, head)?.is_none() {
                return Err(StoreError::unknown_object(
                    &key.type_name,
                    &key.object_name,
                ));
            }
        }

        let revision = inner.authority.next_revision();

        for (key, values) in txn.creations() {
            inner
                .items
                .entry(key.clone())
                .or_default()
                .push(ItemVersion::new(values.clone(), revision));
        }

        for (key, changes) in txn.updates() {
            let base_state =
                Self::resolve(&inner, &key.type_name, &key.object_name, branch, head)?
                    .expect("validated above");
            let mut merged = base_state.values;
            for (attribute, value) in changes {
                merged.insert(attribute.clone(), value.clone());
            }
            let history = inner.items.entry(key.clone()).or_default();
            history.close_open(revision);
            history.push(ItemVersion::new(merged, revision));
        }

        for key in txn.deletions() {
            let history = inner.items.entry(key.clone()).or_default();
            if history.open_version().is_some() {
                history.close_open(revision);
            } else {
                // Inherited from a base branch: shadow it with a marker.
                history.push(ItemVersion::deletion_marker(revision));
            }
        }

        let record = CommittedRevision::new(revision, branch, txn.id());
        inner.revisions.push(record);
        inner.authority.mark_committed(revision)?;

        self.logger.info(
            "commit",
            &[
                ("branch", &branch.id().to_string()),
                ("revision", &revision.value().to_string()),
                ("transaction", &txn.id().to_string()),
            ],
        );
        Ok(revision)
    }
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("types", &self.registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{BranchScope, MetaObject, MoAttribute, ReferenceSpec, TypeRegistry};
    use crate::store::errors::StoreErrorCode;
    use crate::store::transaction::Session;
    use crate::store::Value;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();

        let mut person = MetaObject::new("Person");
        person
            .add_attribute(MoAttribute::mandatory_string("name"))
            .unwrap();
        person.add_attribute(MoAttribute::int("age")).unwrap();
        person.freeze();
        registry.define(person).unwrap();

        let mut task = MetaObject::new("Task");
        task.add_attribute(MoAttribute::mandatory_string("title"))
            .unwrap();
        task.add_attribute(MoAttribute::reference(
            "assignee",
            ReferenceSpec::new("Person", HistoryType::Current, BranchScope::Local),
        ))
        .unwrap();
        task.add_attribute(MoAttribute::reference(
            "approved_by",
            ReferenceSpec::new("Person", HistoryType::Historic, BranchScope::Local),
        ))
        .unwrap();
        task.freeze();
        registry.define(task).unwrap();

        registry
    }

    fn person(session: &mut Session, name: &str, age: i64) {
        let mut values = BTreeMap::new();
        values.insert("name".to_string(), Value::from(name));
        values.insert("age".to_string(), Value::from(age));
        session.create_object("Person", name, values).unwrap();
    }

    #[test]
    fn test_scan_sees_committed_state_only() {
        let kb = KnowledgeBase::new(registry());
        let mut session = Session::new(kb.clone());
        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 30);
        session.commit().unwrap();

        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "bob", 40);

        // Without the transaction, only alice is visible.
        let rows = kb
            .scan("Person", Branch::TRUNK, kb.head_revision(), &[], None)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.object_name, "alice");

        // With the transaction, bob is overlaid.
        let rows = kb
            .scan(
                "Person",
                Branch::TRUNK,
                kb.head_revision(),
                &[],
                session.transaction(),
            )
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].is_uncommitted());
    }

    #[test]
    fn test_snapshot_does_not_see_later_commits() {
        let kb = KnowledgeBase::new(registry());
        let mut session = Session::new(kb.clone());

        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 30);
        let r1 = session.commit().unwrap();

        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "bob", 40);
        session.commit().unwrap();

        let rows = kb.scan("Person", Branch::TRUNK, r1, &[], None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.object_name, "alice");
    }

    #[test]
    fn test_pushed_filters_applied() {
        let kb = KnowledgeBase::new(registry());
        let mut session = Session::new(kb.clone());
        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 30);
        person(&mut session, "bob", 40);
        session.commit().unwrap();

        let filters = vec![AttributeFilter::new(
            "age",
            crate::store::FilterOp::Ge,
            Value::from(35i64),
        )];
        let rows = kb
            .scan("Person", Branch::TRUNK, kb.head_revision(), &filters, None)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.object_name, "bob");
    }

    #[test]
    fn test_branch_inherits_base_state() {
        let kb = KnowledgeBase::new(registry());
        let mut session = Session::new(kb.clone());
        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 30);
        let r1 = session.commit().unwrap();

        let branch = kb
            .create_branch(Coordinate::new(Branch::TRUNK, r1))
            .unwrap();

        // Trunk commit after the branch point is invisible on the branch.
        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "bob", 40);
        session.commit().unwrap();

        let rows = kb
            .scan("Person", branch, kb.head_revision(), &[], None)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key.object_name, "alice");
    }

    #[test]
    fn test_branch_update_shadows_base() {
        let kb = KnowledgeBase::new(registry());
        let mut session = Session::new(kb.clone());
        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 30);
        let r1 = session.commit().unwrap();

        let branch = kb
            .create_branch(Coordinate::new(Branch::TRUNK, r1))
            .unwrap();

        session.begin(branch).unwrap();
        session
            .set_value("Person", "alice", "age", Value::from(99i64))
            .unwrap();
        session.commit().unwrap();

        // Branch sees the shadowing version.
        let on_branch = kb
            .item_at_head("Person", "alice", branch)
            .unwrap()
            .unwrap();
        assert_eq!(on_branch.value("age"), &Value::from(99i64));
        assert_eq!(on_branch.key.branch, branch);

        // Trunk still sees the original.
        let on_trunk = kb
            .item_at_head("Person", "alice", Branch::TRUNK)
            .unwrap()
            .unwrap();
        assert_eq!(on_trunk.value("age"), &Value::from(30i64));
    }

    #[test]
    fn test_branch_delete_shadows_base() {
        let kb = KnowledgeBase::new(registry());
        let mut session = Session::new(kb.clone());
        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 30);
        let r1 = session.commit().unwrap();

        let branch = kb
            .create_branch(Coordinate::new(Branch::TRUNK, r1))
            .unwrap();

        session.begin(branch).unwrap();
        session.delete_object("Person", "alice").unwrap();
        session.commit().unwrap();

        assert!(kb.item_at_head("Person", "alice", branch).unwrap().is_none());
        assert!(kb
            .item_at_head("Person", "alice", Branch::TRUNK)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_current_reference_follows_target() {
        let kb = KnowledgeBase::new(registry());
        let mut session = Session::new(kb.clone());
        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 30);
        let mut values = BTreeMap::new();
        values.insert("title".to_string(), Value::from("review"));
        values.insert(
            "assignee".to_string(),
            Value::Ref(ObjectRef::current("Person", "alice")),
        );
        session.create_object("Task", "t1", values).unwrap();
        session.commit().unwrap();

        session.begin(Branch::TRUNK).unwrap();
        session
            .set_value("Person", "alice", "age", Value::from(31i64))
            .unwrap();
        let r2 = session.commit().unwrap();

        let task = kb.item_at_head("Task", "t1", Branch::TRUNK).unwrap().unwrap();
        let attr = kb.registry().attribute("Task", "assignee").unwrap();
        let reference = task.value("assignee").as_ref_value().unwrap().clone();
        let resolved = kb
            .resolve_reference(&attr, Branch::TRUNK, &reference, r2)
            .unwrap();
        assert_eq!(resolved.value("age"), &Value::from(31i64));
    }

    #[test]
    fn test_historic_reference_pins_revision() {
        let kb = KnowledgeBase::new(registry());
        let mut session = Session::new(kb.clone());
        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 30);
        let r1 = session.commit().unwrap();

        session.begin(Branch::TRUNK).unwrap();
        let mut values = BTreeMap::new();
        values.insert("title".to_string(), Value::from("review"));
        values.insert(
            "approved_by".to_string(),
            Value::Ref(ObjectRef::historic("Person", "alice", r1)),
        );
        session.create_object("Task", "t1", values).unwrap();
        session.commit().unwrap();

        session.begin(Branch::TRUNK).unwrap();
        session
            .set_value("Person", "alice", "age", Value::from(77i64))
            .unwrap();
        let r3 = session.commit().unwrap();

        let task = kb.item_at_head("Task", "t1", Branch::TRUNK).unwrap().unwrap();
        let attr = kb.registry().attribute("Task", "approved_by").unwrap();
        let reference = task.value("approved_by").as_ref_value().unwrap().clone();
        let resolved = kb
            .resolve_reference(&attr, Branch::TRUNK, &reference, r3)
            .unwrap();

        // Pinned to r1: sees the original age.
        assert_eq!(resolved.value("age"), &Value::from(30i64));
    }

    #[test]
    fn test_dangling_reference_reported() {
        let kb = KnowledgeBase::new(registry());
        let attr = kb.registry().attribute("Task", "assignee").unwrap();
        let reference = ObjectRef::current("Person", "ghost");
        let err = kb
            .resolve_reference(&attr, Branch::TRUNK, &reference, Revision::new(0))
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::RevDanglingReference);
    }

    #[test]
    fn test_unknown_branch_rejected() {
        let kb = KnowledgeBase::new(registry());
        let err = kb
            .scan("Person", Branch::new(99), Revision::new(0), &[], None)
            .unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::RevUnknownBranch);
    }

    #[test]
    fn test_delete_then_recreate() {
        let kb = KnowledgeBase::new(registry());
        let mut session = Session::new(kb.clone());
        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 30);
        session.commit().unwrap();

        session.begin(Branch::TRUNK).unwrap();
        session.delete_object("Person", "alice").unwrap();
        let r2 = session.commit().unwrap();
        assert!(kb
            .item_at_head("Person", "alice", Branch::TRUNK)
            .unwrap()
            .is_none());

        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 31);
        let r3 = session.commit().unwrap();

        let state = kb
            .item_at_head("Person", "alice", Branch::TRUNK)
            .unwrap()
            .unwrap();
        assert_eq!(state.created_at, Some(r3));
        assert_eq!(state.value("age"), &Value::from(31i64));

        // The deleted window stays empty.
        assert!(kb
            .item_as_of("Person", "alice", Branch::TRUNK, r2)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_revision_info_recorded() {
        let kb = KnowledgeBase::new(registry());
        let mut session = Session::new(kb.clone());
        session.begin(Branch::TRUNK).unwrap();
        person(&mut session, "alice", 30);
        let r1 = session.commit().unwrap();

        let info = kb.revision_info(r1).unwrap();
        assert_eq!(info.branch(), Branch::TRUNK);
        assert_eq!(info.revision(), r1);
    }
}
