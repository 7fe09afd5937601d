//! Variable and meta-variable resolution
//!
//! Free variables are substituted from the call-site scope;
//! meta-variables are substituted from their binding slot. Substituted
//! trees are resolved recursively, so a binding may itself use variables
//! from the same scope. A binding that reaches itself is rejected.

use std::collections::HashMap;

use crate::expr::{walk_set, walk_value, SetExpr, ValueExpr};

use super::errors::{CompileError, CompileResult};

/// Resolution depth guard; genuine templates nest a handful of levels.
const MAX_DEPTH: usize = 64;

/// Call-site definitions for free variables.
#[derive(Debug, Default)]
pub struct Scope {
    /// Variable name -> defining expression
    definitions: HashMap<String, ValueExpr>,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Defines a variable.
    pub fn define(mut self, name: impl Into<String>, expr: ValueExpr) -> Self {
        self.definitions.insert(name.into(), expr);
        self
    }

    /// Returns a variable's definition, if present.
    pub fn get(&self, name: &str) -> Option<&ValueExpr> {
        self.definitions.get(name)
    }
}

/// Substitutes variables and meta-variable bindings in a value tree.
pub fn resolve_value(expr: &ValueExpr, scope: &Scope) -> CompileResult<ValueExpr> {
    resolve_value_at(expr, scope, 0)
}

/// Substitutes variables and meta-variable bindings in a set tree.
pub fn resolve_set(expr: &SetExpr, scope: &Scope) -> CompileResult<SetExpr> {
    resolve_set_at(expr, scope, 0)
}

fn depth_check(depth: usize, name: &str) -> CompileResult<()> {
    if depth >= MAX_DEPTH {
        return Err(CompileError::cyclic_binding(name));
    }
    Ok(())
}

fn resolve_value_at(expr: &ValueExpr, scope: &Scope, depth: usize) -> CompileResult<ValueExpr> {
    match expr {
        ValueExpr::Literal(_) | ValueExpr::Attribute(_) | ValueExpr::SequenceNext(_) => {
            Ok(expr.clone())
        }
        ValueExpr::Var(name) => {
            depth_check(depth, name)?;
            let definition = scope
                .get(name)
                .ok_or_else(|| CompileError::unresolved_variable(name))?;
            resolve_value_at(definition, scope, depth + 1)
        }
        ValueExpr::Meta(placeholder) => {
            depth_check(depth, placeholder.name())?;
            let binding = placeholder
                .binding()
                .ok_or_else(|| CompileError::unbound_meta(placeholder.name()))?;
            resolve_value_at(&binding, scope, depth + 1)
        }
        ValueExpr::Not(inner) => Ok(ValueExpr::Not(Box::new(resolve_value_at(
            inner,
            scope,
            depth,
        )?))),
        ValueExpr::And(left, right) => Ok(ValueExpr::And(
            Box::new(resolve_value_at(left, scope, depth)?),
            Box::new(resolve_value_at(right, scope, depth)?),
        )),
        ValueExpr::Or(left, right) => Ok(ValueExpr::Or(
            Box::new(resolve_value_at(left, scope, depth)?),
            Box::new(resolve_value_at(right, scope, depth)?),
        )),
        ValueExpr::Compare(op, left, right) => Ok(ValueExpr::Compare(
            *op,
            Box::new(resolve_value_at(left, scope, depth)?),
            Box::new(resolve_value_at(right, scope, depth)?),
        )),
        ValueExpr::IfElse(cond, then, or_else) => Ok(ValueExpr::IfElse(
            Box::new(resolve_value_at(cond, scope, depth)?),
            Box::new(resolve_value_at(then, scope, depth)?),
            Box::new(resolve_value_at(or_else, scope, depth)?),
        )),
    }
}

fn resolve_set_at(expr: &SetExpr, scope: &Scope, depth: usize) -> CompileResult<SetExpr> {
    match expr {
        SetExpr::None | SetExpr::AllOf(_) => Ok(expr.clone()),
        SetExpr::Meta(placeholder) => {
            depth_check(depth, placeholder.name())?;
            let binding = placeholder
                .binding()
                .ok_or_else(|| CompileError::unbound_meta(placeholder.name()))?;
            resolve_set_at(&binding, scope, depth + 1)
        }
        SetExpr::Filter(input, predicate) => Ok(SetExpr::Filter(
            Box::new(resolve_set_at(input, scope, depth)?),
            Box::new(resolve_value_at(predicate, scope, depth)?),
        )),
        SetExpr::Navigate(input, attribute) => Ok(SetExpr::Navigate(
            Box::new(resolve_set_at(input, scope, depth)?),
            attribute.clone(),
        )),
        SetExpr::Union(left, right) => Ok(SetExpr::Union(
            Box::new(resolve_set_at(left, scope, depth)?),
            Box::new(resolve_set_at(right, scope, depth)?),
        )),
        SetExpr::Intersection(left, right) => Ok(SetExpr::Intersection(
            Box::new(resolve_set_at(left, scope, depth)?),
            Box::new(resolve_set_at(right, scope, depth)?),
        )),
        SetExpr::Substraction(left, right) => Ok(SetExpr::Substraction(
            Box::new(resolve_set_at(left, scope, depth)?),
            Box::new(resolve_set_at(right, scope, depth)?),
        )),
    }
}

/// Verifies no unresolved node survived rewriting.
///
/// Rewriting can introduce fresh nodes; this is the final re-resolution
/// check before a plan is built.
pub fn ensure_set_resolved(expr: &SetExpr) -> CompileResult<()> {
    let offender: std::cell::RefCell<Option<CompileError>> = std::cell::RefCell::new(None);
    walk_set(
        expr,
        &mut |node| {
            if offender.borrow().is_none() {
                if let SetExpr::Meta(placeholder) = node {
                    *offender.borrow_mut() = Some(CompileError::unbound_meta(placeholder.name()));
                }
            }
        },
        &mut |node| {
            if offender.borrow().is_none() {
                match node {
                    ValueExpr::Var(name) => {
                        *offender.borrow_mut() = Some(CompileError::unresolved_variable(name))
                    }
                    ValueExpr::Meta(placeholder) => {
                        *offender.borrow_mut() = Some(CompileError::unbound_meta(placeholder.name()))
                    }
                    _ => {}
                }
            }
        },
    );
    match offender.into_inner() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Value-tree variant of [`ensure_set_resolved`].
pub fn ensure_value_resolved(expr: &ValueExpr) -> CompileResult<()> {
    let mut offender: Option<CompileError> = None;
    walk_value(expr, &mut |node| {
        if offender.is_none() {
            match node {
                ValueExpr::Var(name) => offender = Some(CompileError::unresolved_variable(name)),
                ValueExpr::Meta(placeholder) => {
                    offender = Some(CompileError::unbound_meta(placeholder.name()))
                }
                _ => {}
            }
        }
    });
    match offender {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::errors::CompileErrorCode;
    use crate::expr::{MetaSet, MetaValue};

    #[test]
    fn test_variable_substitution() {
        let scope = Scope::new().define("min_age", ValueExpr::literal(18i64));
        let expr = ValueExpr::compare(
            crate::store::FilterOp::Ge,
            ValueExpr::attribute("age"),
            ValueExpr::var("min_age"),
        );

        let resolved = resolve_value(&expr, &scope).unwrap();
        assert_eq!(resolved, ValueExpr::attr_ge("age", 18i64));
    }

    #[test]
    fn test_unresolved_variable_rejected() {
        let err = resolve_value(&ValueExpr::var("ghost"), &Scope::new()).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::RevUnresolvedVariable);
    }

    #[test]
    fn test_meta_substitution() {
        let check = MetaValue::named("check");
        check.bind(ValueExpr::attr_eq("name", "Alice")).unwrap();

        let template = SetExpr::all_of("Person").filter(ValueExpr::meta(check));
        let resolved = resolve_set(&template, &Scope::new()).unwrap();
        assert_eq!(
            resolved,
            SetExpr::all_of("Person").filter(ValueExpr::attr_eq("name", "Alice"))
        );
    }

    #[test]
    fn test_unbound_meta_rejected() {
        let template = SetExpr::meta(MetaSet::named("visible"));
        let err = resolve_set(&template, &Scope::new()).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::RevUnboundMeta);
    }

    #[test]
    fn test_binding_may_use_scope_variables() {
        let check = MetaValue::named("check");
        check
            .bind(ValueExpr::compare(
                crate::store::FilterOp::Eq,
                ValueExpr::attribute("name"),
                ValueExpr::var("who"),
            ))
            .unwrap();
        let scope = Scope::new().define("who", ValueExpr::literal("Alice"));

        let resolved = resolve_value(&ValueExpr::meta(check), &scope).unwrap();
        assert_eq!(resolved, ValueExpr::attr_eq("name", "Alice"));
    }

    #[test]
    fn test_cyclic_binding_rejected() {
        let cycle = MetaValue::named("cycle");
        cycle.bind(ValueExpr::Meta(cycle.clone())).unwrap();

        let err = resolve_value(&ValueExpr::meta(cycle), &Scope::new()).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::RevCyclicBinding);
    }

    #[test]
    fn test_ensure_resolved_detects_leftovers() {
        let expr = SetExpr::all_of("Person").filter(ValueExpr::var("late"));
        let err = ensure_set_resolved(&expr).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::RevUnresolvedVariable);

        assert!(ensure_set_resolved(&SetExpr::all_of("Person")).is_ok());
    }
}
