//! Set expressions
//!
//! Describe sets of item instances: type extents, filters and the set
//! algebra over them. Union concatenates without deduplicating; the
//! engine's result rows keep their identity, so callers can deduplicate
//! when their semantics ask for it.

use std::sync::Arc;

use super::binding::MetaSet;
use super::value::ValueExpr;

/// A set expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SetExpr {
    /// The empty set
    None,
    /// All instances of a type
    AllOf(String),
    /// The subset of a set matching a predicate
    Filter(Box<SetExpr>, Box<ValueExpr>),
    /// The items reached from a set through a reference attribute
    Navigate(Box<SetExpr>, String),
    /// Both sets, in order
    Union(Box<SetExpr>, Box<SetExpr>),
    /// Rows of the left set whose identity also occurs in the right
    Intersection(Box<SetExpr>, Box<SetExpr>),
    /// Rows of the left set whose identity does not occur in the right
    Substraction(Box<SetExpr>, Box<SetExpr>),
    /// A meta-variable placeholder
    Meta(Arc<MetaSet>),
}

impl SetExpr {
    /// The empty set.
    pub fn none() -> Self {
        SetExpr::None
    }

    /// All instances of the named type.
    pub fn all_of(type_name: impl Into<String>) -> Self {
        SetExpr::AllOf(type_name.into())
    }

    /// A meta-variable placeholder.
    pub fn meta(placeholder: Arc<MetaSet>) -> Self {
        SetExpr::Meta(placeholder)
    }

    /// Filters this set by a predicate.
    pub fn filter(self, predicate: ValueExpr) -> Self {
        SetExpr::Filter(Box::new(self), Box::new(predicate))
    }

    /// Joins through a reference attribute: the referenced items.
    pub fn navigate(self, attribute: impl Into<String>) -> Self {
        SetExpr::Navigate(Box::new(self), attribute.into())
    }

    /// The union with another set.
    pub fn union(self, other: SetExpr) -> Self {
        SetExpr::Union(Box::new(self), Box::new(other))
    }

    /// The intersection with another set.
    pub fn intersection(self, other: SetExpr) -> Self {
        SetExpr::Intersection(Box::new(self), Box::new(other))
    }

    /// This set minus another set.
    pub fn substraction(self, other: SetExpr) -> Self {
        SetExpr::Substraction(Box::new(self), Box::new(other))
    }

    /// Returns the node kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SetExpr::None => "none",
            SetExpr::AllOf(_) => "all_of",
            SetExpr::Filter(_, _) => "filter",
            SetExpr::Navigate(_, _) => "navigate",
            SetExpr::Union(_, _) => "union",
            SetExpr::Intersection(_, _) => "intersection",
            SetExpr::Substraction(_, _) => "substraction",
            SetExpr::Meta(_) => "meta",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_compose() {
        let expr = SetExpr::all_of("Person")
            .filter(ValueExpr::attr_ge("age", 18i64))
            .union(SetExpr::all_of("Robot"));

        match &expr {
            SetExpr::Union(left, right) => {
                assert_eq!(left.kind_name(), "filter");
                assert_eq!(right.kind_name(), "all_of");
            }
            other => panic!("expected union, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_structural_equality() {
        let a = SetExpr::all_of("Person").filter(ValueExpr::attr_eq("age", 1i64));
        let b = SetExpr::all_of("Person").filter(ValueExpr::attr_eq("age", 1i64));
        assert_eq!(a, b);
        assert_ne!(a, SetExpr::all_of("Person"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SetExpr::none().kind_name(), "none");
        assert_eq!(
            SetExpr::all_of("A").substraction(SetExpr::all_of("B")).kind_name(),
            "substraction"
        );
    }
}
