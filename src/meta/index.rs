//! Index definitions for the meta-model

use serde::{Deserialize, Serialize};

/// A named index over an ordered list of attributes of one type.
///
/// The attribute order is significant; it is the index column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoIndex {
    /// Index name, unique within the owning type
    pub name: String,
    /// Ordered attribute names
    pub attributes: Vec<String>,
    /// Whether the index enforces uniqueness
    pub unique: bool,
}

impl MoIndex {
    /// Create a non-unique index
    pub fn new(name: impl Into<String>, attributes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            attributes,
            unique: false,
        }
    }

    /// Create a unique index
    pub fn unique(name: impl Into<String>, attributes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            attributes,
            unique: true,
        }
    }

    /// Returns true if the index covers the given attribute
    pub fn covers(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}
