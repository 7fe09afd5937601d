//! Transactions and sessions
//!
//! A transaction is the mutable working set of one session: creations,
//! updates and deletions staged against one branch. At commit the whole
//! set is atomically assigned a single new revision. Uncommitted changes
//! are visible only to queries running inside the owning session.
//!
//! A session owns at most one active transaction at a time.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use uuid::Uuid;

use super::base::KnowledgeBase;
use super::errors::{StoreError, StoreResult};
use super::item::ObjectKey;
use super::revision::{Branch, Revision};
use super::value::Value;

/// The staged working set of one session.
#[derive(Debug)]
pub struct Transaction {
    /// Transaction identity
    id: Uuid,
    /// Branch all staged changes target
    branch: Branch,
    /// Staged creations: full attribute maps
    creations: BTreeMap<ObjectKey, BTreeMap<String, Value>>,
    /// Staged updates to committed objects: changed attributes only
    updates: BTreeMap<ObjectKey, BTreeMap<String, Value>>,
    /// Staged deletions of committed objects
    deletions: BTreeSet<ObjectKey>,
}

impl Transaction {
    pub(crate) fn new(branch: Branch) -> Self {
        Self {
            id: Uuid::new_v4(),
            branch,
            creations: BTreeMap::new(),
            updates: BTreeMap::new(),
            deletions: BTreeSet::new(),
        }
    }

    /// Returns the transaction identity.
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the branch this transaction targets.
    #[inline]
    pub fn branch(&self) -> Branch {
        self.branch
    }

    /// Returns true if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.creations.is_empty() && self.updates.is_empty() && self.deletions.is_empty()
    }

    /// Returns the staged creations.
    pub(crate) fn creations(&self) -> &BTreeMap<ObjectKey, BTreeMap<String, Value>> {
        &self.creations
    }

    /// Returns the staged updates.
    pub(crate) fn updates(&self) -> &BTreeMap<ObjectKey, BTreeMap<String, Value>> {
        &self.updates
    }

    /// Returns the staged deletions.
    pub(crate) fn deletions(&self) -> &BTreeSet<ObjectKey> {
        &self.deletions
    }

    /// Returns true if the object is staged for deletion.
    pub fn is_deleted(&self, key: &ObjectKey) -> bool {
        self.deletions.contains(key)
    }

    /// Returns the staged creation values for the object, if created here.
    pub fn created_values(&self, key: &ObjectKey) -> Option<&BTreeMap<String, Value>> {
        self.creations.get(key)
    }

    /// Returns the staged attribute overrides for the object, if updated.
    pub fn updated_values(&self, key: &ObjectKey) -> Option<&BTreeMap<String, Value>> {
        self.updates.get(key)
    }

    fn stage_creation(&mut self, key: ObjectKey, values: BTreeMap<String, Value>) {
        self.creations.insert(key, values);
    }

    fn stage_update(&mut self, key: ObjectKey, attribute: String, value: Value) {
        self.updates.entry(key).or_default().insert(attribute, value);
    }

    fn stage_deletion(&mut self, key: ObjectKey) {
        self.updates.remove(&key);
        self.deletions.insert(key);
    }
}

/// One logical session against the store.
///
/// The session is the transaction owner: `begin`, the staging calls,
/// `commit` and `rollback` all go through it, which makes a second
/// concurrent transaction on one session impossible to express.
pub struct Session {
    /// Session identity
    id: Uuid,
    /// The store this session works on
    kb: Arc<KnowledgeBase>,
    /// The active transaction, if any
    active: Option<Transaction>,
}

impl Session {
    /// Opens a session on the store.
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kb,
            active: None,
        }
    }

    /// Returns the session identity.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the store handle.
    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    /// Returns the active transaction, if any.
    pub fn transaction(&self) -> Option<&Transaction> {
        self.active.as_ref()
    }

    /// Begins a transaction on the given branch.
    ///
    /// Fails if a transaction is already active on this session.
    pub fn begin(&mut self, branch: Branch) -> StoreResult<()> {
        if self.active.is_some() {
            return Err(StoreError::transaction_active());
        }
        self.kb.branch_info(branch)?;
        self.active = Some(Transaction::new(branch));
        Ok(())
    }

    /// Stages the creation of a new object.
    ///
    /// Attribute kinds and mandatory attributes are validated immediately
    /// against the registry; identity collisions with committed state are
    /// validated here and re-validated under the commit lock.
    pub fn create_object(
        &mut self,
        type_name: &str,
        object_name: &str,
        values: BTreeMap<String, Value>,
    ) -> StoreResult<()> {
        let txn = self
            .active
            .as_ref()
            .ok_or_else(|| StoreError::no_transaction("create_object"))?;
        let branch = txn.branch();
        let key = ObjectKey::new(type_name, object_name, branch);

        let ty = self.kb.registry().get(type_name)?;
        for (name, value) in &values {
            let attr = ty.attribute(name)?;
            if !attr.accepts(value.kind()) {
                return Err(crate::meta::MetaError::incompatible_type(
                    type_name,
                    name,
                    attr.kind.kind_name(),
                    value.kind().kind_name(),
                )
                .into());
            }
        }
        for attr in ty.attributes() {
            if attr.mandatory && values.get(&attr.name).map_or(true, Value::is_null) {
                return Err(crate::meta::MetaError::incompatible_type(
                    type_name,
                    &attr.name,
                    attr.kind.kind_name(),
                    "null",
                )
                .into());
            }
        }

        let txn = self.active.as_ref().unwrap();
        if txn.created_values(&key).is_some() {
            return Err(StoreError::duplicate_object(type_name, object_name));
        }
        if !txn.is_deleted(&key)
            && self
                .kb
                .item_at_head(type_name, object_name, branch)?
                .is_some()
        {
            return Err(StoreError::duplicate_object(type_name, object_name));
        }

        self.active
            .as_mut()
            .unwrap()
            .stage_creation(key, values);
        Ok(())
    }

    /// Stages an attribute change.
    ///
    /// The object must be alive at the head revision or created inside
    /// this transaction.
    pub fn set_value(
        &mut self,
        type_name: &str,
        object_name: &str,
        attribute: &str,
        value: Value,
    ) -> StoreResult<()> {
        let txn = self
            .active
            .as_ref()
            .ok_or_else(|| StoreError::no_transaction("set_value"))?;
        let branch = txn.branch();
        let key = ObjectKey::new(type_name, object_name, branch);

        let attr = self.kb.registry().attribute(type_name, attribute)?;
        if !attr.accepts(value.kind()) {
            return Err(crate::meta::MetaError::incompatible_type(
                type_name,
                attribute,
                attr.kind.kind_name(),
                value.kind().kind_name(),
            )
            .into());
        }

        let txn = self.active.as_mut().unwrap();
        if txn.is_deleted(&key) {
            return Err(StoreError::unknown_object(type_name, object_name));
        }
        if let Some(values) = txn.creations.get_mut(&key) {
            values.insert(attribute.to_string(), value);
            return Ok(());
        }

        if self
            .kb
            .item_at_head(type_name, object_name, branch)?
            .is_none()
        {
            return Err(StoreError::unknown_object(type_name, object_name));
        }
        self.active
            .as_mut()
            .unwrap()
            .stage_update(key, attribute.to_string(), value);
        Ok(())
    }

    /// Stages the deletion of an object.
    ///
    /// Deleting an object created inside this transaction simply drops
    /// the staged creation.
    pub fn delete_object(&mut self, type_name: &str, object_name: &str) -> StoreResult<()> {
        let txn = self
            .active
            .as_ref()
            .ok_or_else(|| StoreError::no_transaction("delete_object"))?;
        let branch = txn.branch();
        let key = ObjectKey::new(type_name, object_name, branch);

        let txn = self.active.as_mut().unwrap();
        if txn.creations.remove(&key).is_some() {
            return Ok(());
        }
        if txn.is_deleted(&key) {
            return Err(StoreError::unknown_object(type_name, object_name));
        }
        if self
            .kb
            .item_at_head(type_name, object_name, branch)?
            .is_none()
        {
            return Err(StoreError::unknown_object(type_name, object_name));
        }
        self.active.as_mut().unwrap().stage_deletion(key);
        Ok(())
    }

    /// Commits the active transaction, assigning one new revision to the
    /// whole working set.
    pub fn commit(&mut self) -> StoreResult<Revision> {
        let txn = self
            .active
            .take()
            .ok_or_else(|| StoreError::no_transaction("commit"))?;
        self.kb.commit(txn)
    }

    /// Discards the active transaction.
    pub fn rollback(&mut self) -> StoreResult<()> {
        self.active
            .take()
            .ok_or_else(|| StoreError::no_transaction("rollback"))?;
        Ok(())
    }
}
