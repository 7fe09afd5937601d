//! MetaObject - a frozen meta-model type
//!
//! A type holds an ordered list of attributes and a list of indexes.
//! Construction is staged: attributes and indexes are added to a fresh
//! type, then `freeze()` makes it terminal. Every mutation after freeze
//! fails. Duplicate attribute and index names are rejected at build time.

use std::collections::HashMap;

use super::attribute::MoAttribute;
use super::errors::{MetaError, MetaResult};
use super::index::MoIndex;

/// A meta-model type: name, attributes, indexes.
///
/// Fields are private; the only way to a populated `MetaObject` is through
/// `add_attribute`/`add_index` followed by `freeze`.
#[derive(Debug, Clone)]
pub struct MetaObject {
    /// Type name, unique within a registry
    name: String,
    /// Attributes in declaration order
    attributes: Vec<MoAttribute>,
    /// Attribute name -> position in `attributes`
    by_name: HashMap<String, usize>,
    /// Indexes in declaration order
    indexes: Vec<MoIndex>,
    /// Terminal flag; no mutation once set
    frozen: bool,
}

impl MetaObject {
    /// Create a fresh, unfrozen type with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            by_name: HashMap::new(),
            indexes: Vec::new(),
            frozen: false,
        }
    }

    /// Returns the type name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true once `freeze` has been called.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Adds an attribute.
    ///
    /// Fails with a duplicate-attribute error if the name is taken and with
    /// a frozen-type error after `freeze`.
    pub fn add_attribute(&mut self, attribute: MoAttribute) -> MetaResult<()> {
        if self.frozen {
            return Err(MetaError::type_frozen(&self.name));
        }
        if self.by_name.contains_key(&attribute.name) {
            return Err(MetaError::duplicate_attribute(&self.name, &attribute.name));
        }
        self.by_name
            .insert(attribute.name.clone(), self.attributes.len());
        self.attributes.push(attribute);
        Ok(())
    }

    /// Adds an index.
    ///
    /// Every referenced attribute must already be declared; the index name
    /// must be fresh; the type must not be frozen.
    pub fn add_index(&mut self, index: MoIndex) -> MetaResult<()> {
        if self.frozen {
            return Err(MetaError::type_frozen(&self.name));
        }
        if self.indexes.iter().any(|i| i.name == index.name) {
            return Err(MetaError::duplicate_attribute(&self.name, &index.name));
        }
        for attr in &index.attributes {
            if !self.by_name.contains_key(attr) {
                return Err(MetaError::no_such_attribute(&self.name, attr));
            }
        }
        self.indexes.push(index);
        Ok(())
    }

    /// Makes this type terminal. Idempotent.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Resolves an attribute by name.
    pub fn attribute(&self, name: &str) -> MetaResult<&MoAttribute> {
        self.by_name
            .get(name)
            .map(|&i| &self.attributes[i])
            .ok_or_else(|| MetaError::no_such_attribute(&self.name, name))
    }

    /// Returns true if the attribute is declared.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Returns all attributes in declaration order.
    #[inline]
    pub fn attributes(&self) -> &[MoAttribute] {
        &self.attributes
    }

    /// Returns all indexes in declaration order.
    #[inline]
    pub fn indexes(&self) -> &[MoIndex] {
        &self.indexes
    }
}
