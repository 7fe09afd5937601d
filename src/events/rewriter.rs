//! Event rewriters for schema migrations
//!
//! Rewriters transform the historical event log offline, never the live
//! transactional path. Filtering is by exact declared type name;
//! composition is a sequential pipeline, each stage seeing the previous
//! stage's output.

use std::collections::BTreeMap;

use crate::meta::TypeRegistry;
use crate::store::Value;

use super::errors::{RewriteError, RewriteResult};
use super::event::ChangeEvent;

/// One migration stage.
pub trait Rewriter: Send + Sync {
    /// Stage name for diagnostics.
    fn name(&self) -> &str;

    /// Rewrites one event.
    fn rewrite(&self, event: ChangeEvent) -> ChangeEvent;

    /// Validates the stage against the target schema.
    fn validate(&self, _registry: &TypeRegistry) -> RewriteResult<()> {
        Ok(())
    }
}

/// Injects an initial value into creations of one type.
///
/// Only creations missing the attribute are touched; an explicitly
/// stored value wins.
pub struct SetInitialValue {
    /// Exact type name to match
    type_name: String,
    /// Attribute to inject
    attribute: String,
    /// The injected value
    value: Value,
}

impl SetInitialValue {
    pub fn new(
        type_name: impl Into<String>,
        attribute: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            attribute: attribute.into(),
            value,
        }
    }
}

impl Rewriter for SetInitialValue {
    fn name(&self) -> &str {
        "set_initial_value"
    }

    fn rewrite(&self, event: ChangeEvent) -> ChangeEvent {
        match event {
            ChangeEvent::ObjectCreation {
                type_name,
                object_name,
                mut values,
            } if type_name == self.type_name => {
                values
                    .entry(self.attribute.clone())
                    .or_insert_with(|| self.value.clone());
                ChangeEvent::ObjectCreation {
                    type_name,
                    object_name,
                    values,
                }
            }
            other => other,
        }
    }

    fn validate(&self, registry: &TypeRegistry) -> RewriteResult<()> {
        let ty = registry
            .get(&self.type_name)
            .map_err(|_| RewriteError::UnknownType(self.type_name.clone()))?;
        let attr = ty
            .attribute(&self.attribute)
            .map_err(|_| RewriteError::UnknownAttribute {
                type_name: self.type_name.clone(),
                attribute: self.attribute.clone(),
            })?;
        if !attr.accepts(self.value.kind()) {
            return Err(RewriteError::IncompatibleValue {
                type_name: self.type_name.clone(),
                attribute: self.attribute.clone(),
                kind: self.value.kind().kind_name(),
            });
        }
        Ok(())
    }
}

/// Strips a named attribute value from matching events, as if the value
/// had never been set.
pub struct RemoveAttributeValue {
    /// Exact type name to match
    type_name: String,
    /// Attribute to strip
    attribute: String,
    /// Additional event filter; `None` matches every event of the type
    predicate: Option<Box<dyn Fn(&ChangeEvent) -> bool + Send + Sync>>,
}

impl RemoveAttributeValue {
    /// Strips the attribute from every event of the type.
    pub fn new(type_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            attribute: attribute.into(),
            predicate: None,
        }
    }

    /// Restricts the stage to events matching a predicate.
    pub fn matching(
        mut self,
        predicate: impl Fn(&ChangeEvent) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Box::new(predicate));
        self
    }

    fn matches(&self, event: &ChangeEvent) -> bool {
        if event.type_name() != self.type_name {
            return false;
        }
        match &self.predicate {
            Some(predicate) => predicate(event),
            None => true,
        }
    }

    fn strip(&self, values: &mut BTreeMap<String, Value>) {
        values.remove(&self.attribute);
    }
}

impl Rewriter for RemoveAttributeValue {
    fn name(&self) -> &str {
        "remove_attribute_value"
    }

    fn rewrite(&self, event: ChangeEvent) -> ChangeEvent {
        if !self.matches(&event) {
            return event;
        }
        match event {
            ChangeEvent::ObjectCreation {
                type_name,
                object_name,
                mut values,
            } => {
                self.strip(&mut values);
                ChangeEvent::ObjectCreation {
                    type_name,
                    object_name,
                    values,
                }
            }
            ChangeEvent::ItemUpdate {
                type_name,
                object_name,
                mut old_values,
                mut new_values,
            } => {
                self.strip(&mut old_values);
                self.strip(&mut new_values);
                ChangeEvent::ItemUpdate {
                    type_name,
                    object_name,
                    old_values,
                    new_values,
                }
            }
            ChangeEvent::ItemDeletion {
                type_name,
                object_name,
                mut values,
            } => {
                self.strip(&mut values);
                ChangeEvent::ItemDeletion {
                    type_name,
                    object_name,
                    values,
                }
            }
        }
    }

    fn validate(&self, registry: &TypeRegistry) -> RewriteResult<()> {
        registry
            .get(&self.type_name)
            .map_err(|_| RewriteError::UnknownType(self.type_name.clone()))?;
        Ok(())
    }
}

/// A sequential pipeline of rewriters.
pub struct RewritePipeline {
    stages: Vec<Box<dyn Rewriter>>,
}

impl RewritePipeline {
    /// Creates an empty pipeline; an empty pipeline is the identity.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage.
    pub fn stage(mut self, rewriter: impl Rewriter + 'static) -> Self {
        self.stages.push(Box::new(rewriter));
        self
    }

    /// Returns the number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true for the identity pipeline.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Validates every stage against the target schema.
    pub fn validate(&self, registry: &TypeRegistry) -> RewriteResult<()> {
        for stage in &self.stages {
            stage.validate(registry)?;
        }
        Ok(())
    }

    /// Rewrites one event through all stages, in order.
    pub fn rewrite(&self, event: ChangeEvent) -> ChangeEvent {
        self.stages
            .iter()
            .fold(event, |event, stage| stage.rewrite(event))
    }

    /// Rewrites a whole log, preserving event order.
    pub fn rewrite_log(&self, events: Vec<ChangeEvent>) -> Vec<ChangeEvent> {
        events.into_iter().map(|e| self.rewrite(e)).collect()
    }
}

impl Default for RewritePipeline {
    fn default() -> Self {
        Self::new()
    }
}
