//! Meta-variables - named template placeholders
//!
//! A meta-variable is embedded in a template expression by shared handle.
//! Binding is single-assignment per compilation pass: `bind` fails on a
//! slot that is already occupied, and `reset` clears the slot between
//! passes. The slot is plain data, never shared state across concurrent
//! compilations of different templates.

use std::sync::RwLock;

use super::errors::{ExprError, ExprResult};
use super::set::SetExpr;
use super::value::ValueExpr;

/// The single-assignment slot shared by both meta-variable kinds.
#[derive(Debug)]
struct Slot<T> {
    cell: RwLock<Option<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            cell: RwLock::new(None),
        }
    }
}

impl<T: Clone> Slot<T> {
    fn bind(&self, name: &str, value: T) -> ExprResult<()> {
        let mut cell = self.cell.write().expect("binding lock poisoned");
        if cell.is_some() {
            return Err(ExprError::meta_bound(name));
        }
        *cell = Some(value);
        Ok(())
    }

    fn get(&self) -> Option<T> {
        self.cell.read().expect("binding lock poisoned").clone()
    }

    fn reset(&self) {
        *self.cell.write().expect("binding lock poisoned") = None;
    }
}

/// A named placeholder for a value expression.
#[derive(Debug)]
pub struct MetaValue {
    /// Placeholder name, used in diagnostics
    name: String,
    /// The bound expression, if any
    slot: Slot<ValueExpr>,
}

impl MetaValue {
    /// Creates an unbound placeholder.
    pub fn named(name: impl Into<String>) -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            name: name.into(),
            slot: Slot::default(),
        })
    }

    /// Returns the placeholder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binds the placeholder. Single-assignment: a second bind fails.
    pub fn bind(&self, expr: ValueExpr) -> ExprResult<()> {
        self.slot.bind(&self.name, expr)
    }

    /// Returns a copy of the current binding, if any.
    pub fn binding(&self) -> Option<ValueExpr> {
        self.slot.get()
    }

    /// Clears the binding for the next compilation pass.
    pub fn reset(&self) {
        self.slot.reset();
    }
}

/// Identity is the name; the binding is transient compilation state.
impl PartialEq for MetaValue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A named placeholder for a set expression.
#[derive(Debug)]
pub struct MetaSet {
    /// Placeholder name, used in diagnostics
    name: String,
    /// The bound expression, if any
    slot: Slot<SetExpr>,
}

impl MetaSet {
    /// Creates an unbound placeholder.
    pub fn named(name: impl Into<String>) -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            name: name.into(),
            slot: Slot::default(),
        })
    }

    /// Returns the placeholder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binds the placeholder. Single-assignment: a second bind fails.
    pub fn bind(&self, expr: SetExpr) -> ExprResult<()> {
        self.slot.bind(&self.name, expr)
    }

    /// Returns a copy of the current binding, if any.
    pub fn binding(&self) -> Option<SetExpr> {
        self.slot.get()
    }

    /// Clears the binding for the next compilation pass.
    pub fn reset(&self) {
        self.slot.reset();
    }
}

impl PartialEq for MetaSet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::errors::ExprErrorCode;
    use crate::store::Value;

    #[test]
    fn test_bind_once() {
        let meta = MetaValue::named("check");
        assert!(meta.binding().is_none());

        meta.bind(ValueExpr::literal(Value::from(true))).unwrap();
        assert!(meta.binding().is_some());
    }

    #[test]
    fn test_double_bind_fails() {
        let meta = MetaValue::named("check");
        meta.bind(ValueExpr::literal(Value::from(true))).unwrap();

        let err = meta
            .bind(ValueExpr::literal(Value::from(false)))
            .unwrap_err();
        assert_eq!(err.code(), ExprErrorCode::RevMetaBound);
    }

    #[test]
    fn test_reset_allows_rebinding() {
        let meta = MetaValue::named("check");
        meta.bind(ValueExpr::literal(Value::from(true))).unwrap();
        meta.reset();
        assert!(meta.binding().is_none());

        meta.bind(ValueExpr::literal(Value::from(false))).unwrap();
        assert_eq!(
            meta.binding(),
            Some(ValueExpr::literal(Value::from(false)))
        );
    }

    #[test]
    fn test_set_placeholder() {
        let meta = MetaSet::named("visible");
        meta.bind(SetExpr::all_of("Person")).unwrap();
        assert_eq!(meta.binding(), Some(SetExpr::all_of("Person")));

        let err = meta.bind(SetExpr::none()).unwrap_err();
        assert_eq!(err.code(), ExprErrorCode::RevMetaBound);
    }

    #[test]
    fn test_equality_is_by_name() {
        let a = MetaValue::named("x");
        let b = MetaValue::named("x");
        b.bind(ValueExpr::literal(Value::from(1i64))).unwrap();
        assert_eq!(*a, *b);
    }
}
