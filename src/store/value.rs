//! Attribute values
//!
//! The primitive value vocabulary stored in item versions. Reference
//! values carry the target identity plus the optional pinned revision
//! (historic/mixed references) and the optional explicit branch (global
//! references).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::meta::ValueKind;

use super::revision::{Branch, Revision};

/// Identity of a referenced item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Name of the target type
    pub type_name: String,
    /// Object name of the target
    pub object_name: String,
    /// Explicit branch for global references; local references omit it
    pub branch: Option<Branch>,
    /// Pinned revision for historic references; mixed references may omit it
    pub revision: Option<Revision>,
}

impl ObjectRef {
    /// A current, branch-local reference.
    pub fn current(type_name: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            object_name: object_name.into(),
            branch: None,
            revision: None,
        }
    }

    /// A reference pinned to a specific revision.
    pub fn historic(
        type_name: impl Into<String>,
        object_name: impl Into<String>,
        revision: Revision,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            object_name: object_name.into(),
            branch: None,
            revision: Some(revision),
        }
    }

    /// Pins the reference to an explicit branch.
    pub fn on_branch(mut self, branch: Branch) -> Self {
        self.branch = Some(branch);
        self
    }
}

/// A stored attribute value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Null,
    Str(String),
    Int(i64),
    Bool(bool),
    Float(f64),
    Ref(ObjectRef),
}

impl Value {
    /// Returns the kind of this value for attribute compatibility checks.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Str(_) => ValueKind::Str,
            Value::Int(_) => ValueKind::Int,
            Value::Bool(_) => ValueKind::Bool,
            Value::Float(_) => ValueKind::Float,
            Value::Ref(_) => ValueKind::Ref,
        }
    }

    /// Returns true for the null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the reference payload, if any.
    pub fn as_ref_value(&self) -> Option<&ObjectRef> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// Compares two values of the same kind.
    ///
    /// Returns `None` for kind mismatches and for references, which have
    /// no defined order. Null compares equal only to null.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
