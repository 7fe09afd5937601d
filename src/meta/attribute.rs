//! Attribute definitions for the meta-model
//!
//! A logical attribute (`MoAttribute`) maps to one or more physical columns
//! (`DbColumn`) of a primitive SQL type. Reference attributes additionally
//! carry a history type and a branch scope and span several columns (target
//! name, branch, pinned revision).

use serde::{Deserialize, Serialize};

/// Primitive SQL column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    /// Variable-length character data
    Varchar,
    /// 64-bit signed integer
    BigInt,
    /// Boolean
    Boolean,
    /// 64-bit floating point
    Double,
}

impl SqlType {
    /// Returns the type name for error messages and DDL
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlType::Varchar => "varchar",
            SqlType::BigInt => "bigint",
            SqlType::Boolean => "boolean",
            SqlType::Double => "double",
        }
    }
}

/// A physical column backing a logical attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbColumn {
    /// Logical column name (mangled to a physical name by the dialect)
    pub name: String,
    /// Primitive SQL type
    pub sql_type: SqlType,
}

impl DbColumn {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

/// How a reference attribute resolves across revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryType {
    /// Always resolves to the live version of the target
    Current,
    /// Pinned to the revision stored with the value
    Historic,
    /// Resolves either way depending on stored metadata
    Mixed,
}

impl HistoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryType::Current => "current",
            HistoryType::Historic => "historic",
            HistoryType::Mixed => "mixed",
        }
    }
}

/// Whether a reference may cross branches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchScope {
    /// Target may live on any branch; the branch is stored with the value
    Global,
    /// Target lives on the same branch as the holder
    Local,
}

impl BranchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchScope::Global => "global",
            BranchScope::Local => "local",
        }
    }
}

/// Reference annotation on an attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSpec {
    /// Name of the referenced type
    pub target_type: String,
    /// History resolution mode
    pub history: HistoryType,
    /// Branch scope
    pub scope: BranchScope,
}

impl ReferenceSpec {
    pub fn new(target_type: impl Into<String>, history: HistoryType, scope: BranchScope) -> Self {
        Self {
            target_type: target_type.into(),
            history,
            scope,
        }
    }
}

/// Kind of value an attribute stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AttributeKind {
    /// UTF-8 string
    Str,
    /// 64-bit signed integer
    Int,
    /// Boolean
    Bool,
    /// 64-bit floating point
    Float,
    /// Reference to another item
    Ref(ReferenceSpec),
}

impl AttributeKind {
    /// Returns the kind name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttributeKind::Str => "string",
            AttributeKind::Int => "int",
            AttributeKind::Bool => "bool",
            AttributeKind::Float => "float",
            AttributeKind::Ref(_) => "reference",
        }
    }

    /// Returns true if this is a reference kind
    pub fn is_reference(&self) -> bool {
        matches!(self, AttributeKind::Ref(_))
    }

    /// Returns the reference spec for reference kinds
    pub fn reference(&self) -> Option<&ReferenceSpec> {
        match self {
            AttributeKind::Ref(spec) => Some(spec),
            _ => None,
        }
    }
}

/// The kind of a concrete stored value, for compatibility checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Str,
    Int,
    Bool,
    Float,
    Ref,
}

impl ValueKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Str => "string",
            ValueKind::Int => "int",
            ValueKind::Bool => "bool",
            ValueKind::Float => "float",
            ValueKind::Ref => "reference",
        }
    }
}

/// A logical attribute of a meta-model type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoAttribute {
    /// Attribute name, unique within the owning type
    pub name: String,
    /// Value kind
    pub kind: AttributeKind,
    /// Whether a non-null value must be present
    pub mandatory: bool,
}

impl MoAttribute {
    /// Create an attribute of the given kind
    pub fn new(name: impl Into<String>, kind: AttributeKind, mandatory: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            mandatory,
        }
    }

    /// Create an optional string attribute
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Str, false)
    }

    /// Create a mandatory string attribute
    pub fn mandatory_string(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Str, true)
    }

    /// Create an optional int attribute
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Int, false)
    }

    /// Create an optional bool attribute
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Bool, false)
    }

    /// Create an optional float attribute
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Float, false)
    }

    /// Create an optional reference attribute
    pub fn reference(name: impl Into<String>, spec: ReferenceSpec) -> Self {
        Self::new(name, AttributeKind::Ref(spec), false)
    }

    /// Returns true if a value of the given kind may be stored here.
    ///
    /// Null is accepted for optional attributes only.
    pub fn accepts(&self, value: ValueKind) -> bool {
        match (value, &self.kind) {
            (ValueKind::Null, _) => !self.mandatory,
            (ValueKind::Str, AttributeKind::Str) => true,
            (ValueKind::Int, AttributeKind::Int) => true,
            (ValueKind::Bool, AttributeKind::Bool) => true,
            (ValueKind::Float, AttributeKind::Float) => true,
            (ValueKind::Ref, AttributeKind::Ref(_)) => true,
            _ => false,
        }
    }

    /// Returns the physical columns backing this attribute.
    ///
    /// Plain attributes occupy one column. Reference attributes occupy the
    /// target-name column, a branch column for global scope, and a revision
    /// column for historic or mixed history.
    pub fn columns(&self) -> Vec<DbColumn> {
        match &self.kind {
            AttributeKind::Str => vec![DbColumn::new(&self.name, SqlType::Varchar)],
            AttributeKind::Int => vec![DbColumn::new(&self.name, SqlType::BigInt)],
            AttributeKind::Bool => vec![DbColumn::new(&self.name, SqlType::Boolean)],
            AttributeKind::Float => vec![DbColumn::new(&self.name, SqlType::Double)],
            AttributeKind::Ref(spec) => {
                let mut cols = vec![DbColumn::new(format!("{}_id", self.name), SqlType::Varchar)];
                if spec.scope == BranchScope::Global {
                    cols.push(DbColumn::new(format!("{}_branch", self.name), SqlType::BigInt));
                }
                if spec.history != HistoryType::Current {
                    cols.push(DbColumn::new(format!("{}_rev", self.name), SqlType::BigInt));
                }
                cols
            }
        }
    }
}
