//! TypeRegistry - the frozen set of meta-model types
//!
//! Types are defined once by a schema-setup step at startup and never
//! mutated afterwards. The registry only accepts frozen types and rejects
//! duplicate names. Lookups hand out shared handles.

use std::collections::HashMap;
use std::sync::Arc;

use super::attribute::MoAttribute;
use super::errors::{MetaError, MetaResult};
use super::object::MetaObject;

/// Registry of all defined types.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    /// Types by name
    types: HashMap<String, Arc<MetaObject>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Defines a type.
    ///
    /// The type must be frozen. Fails with a duplicate-type error if the
    /// name is already registered.
    pub fn define(&mut self, ty: MetaObject) -> MetaResult<Arc<MetaObject>> {
        if !ty.is_frozen() {
            return Err(MetaError::type_not_frozen(ty.name()));
        }
        if self.types.contains_key(ty.name()) {
            return Err(MetaError::duplicate_type(ty.name()));
        }
        let handle = Arc::new(ty);
        self.types.insert(handle.name().to_string(), handle.clone());
        Ok(handle)
    }

    /// Resolves a type by name.
    pub fn get(&self, name: &str) -> MetaResult<Arc<MetaObject>> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| MetaError::unknown_type(name))
    }

    /// Returns true if the type is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Resolves an attribute of a registered type.
    pub fn attribute(&self, type_name: &str, attribute: &str) -> MetaResult<MoAttribute> {
        let ty = self.get(type_name)?;
        ty.attribute(attribute).cloned()
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns all type names in unspecified order.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }
}
