//! Change events
//!
//! The linear historical event log format: one event per object change,
//! carrying the type name, the object identity and the attribute maps
//! (old and new for updates). Serde-serializable for offline migration
//! tooling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::store::Value;

/// One entry of the historical event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// An object came into existence with these values
    ObjectCreation {
        type_name: String,
        object_name: String,
        values: BTreeMap<String, Value>,
    },
    /// An object's attributes changed
    ItemUpdate {
        type_name: String,
        object_name: String,
        old_values: BTreeMap<String, Value>,
        new_values: BTreeMap<String, Value>,
    },
    /// An object was deleted; `values` is its last state
    ItemDeletion {
        type_name: String,
        object_name: String,
        values: BTreeMap<String, Value>,
    },
}

impl ChangeEvent {
    /// Creates an object-creation event.
    pub fn creation(
        type_name: impl Into<String>,
        object_name: impl Into<String>,
        values: BTreeMap<String, Value>,
    ) -> Self {
        ChangeEvent::ObjectCreation {
            type_name: type_name.into(),
            object_name: object_name.into(),
            values,
        }
    }

    /// Creates an item-update event.
    pub fn update(
        type_name: impl Into<String>,
        object_name: impl Into<String>,
        old_values: BTreeMap<String, Value>,
        new_values: BTreeMap<String, Value>,
    ) -> Self {
        ChangeEvent::ItemUpdate {
            type_name: type_name.into(),
            object_name: object_name.into(),
            old_values,
            new_values,
        }
    }

    /// Creates an item-deletion event.
    pub fn deletion(
        type_name: impl Into<String>,
        object_name: impl Into<String>,
        values: BTreeMap<String, Value>,
    ) -> Self {
        ChangeEvent::ItemDeletion {
            type_name: type_name.into(),
            object_name: object_name.into(),
            values,
        }
    }

    /// Returns the event's type name.
    pub fn type_name(&self) -> &str {
        match self {
            ChangeEvent::ObjectCreation { type_name, .. }
            | ChangeEvent::ItemUpdate { type_name, .. }
            | ChangeEvent::ItemDeletion { type_name, .. } => type_name,
        }
    }

    /// Returns the event's object name.
    pub fn object_name(&self) -> &str {
        match self {
            ChangeEvent::ObjectCreation { object_name, .. }
            | ChangeEvent::ItemUpdate { object_name, .. }
            | ChangeEvent::ItemDeletion { object_name, .. } => object_name,
        }
    }

    /// Returns the event kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ChangeEvent::ObjectCreation { .. } => "object_creation",
            ChangeEvent::ItemUpdate { .. } => "item_update",
            ChangeEvent::ItemDeletion { .. } => "item_deletion",
        }
    }
}
