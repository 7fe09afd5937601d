//! Tree walkers and transformers
//!
//! Structural traversal over the closed expression node set, by
//! exhaustive pattern matching. Walkers do not descend into meta-variable
//! bindings; the compiler substitutes those before any analysis runs.

use super::set::SetExpr;
use super::value::ValueExpr;

/// Visits every node of a value expression in pre-order.
pub fn walk_value<'a>(expr: &'a ValueExpr, visit: &mut impl FnMut(&'a ValueExpr)) {
    visit(expr);
    match expr {
        ValueExpr::Literal(_)
        | ValueExpr::Attribute(_)
        | ValueExpr::Var(_)
        | ValueExpr::SequenceNext(_)
        | ValueExpr::Meta(_) => {}
        ValueExpr::Not(inner) => walk_value(inner, visit),
        ValueExpr::And(left, right) | ValueExpr::Or(left, right) => {
            walk_value(left, visit);
            walk_value(right, visit);
        }
        ValueExpr::Compare(_, left, right) => {
            walk_value(left, visit);
            walk_value(right, visit);
        }
        ValueExpr::IfElse(cond, then, or_else) => {
            walk_value(cond, visit);
            walk_value(then, visit);
            walk_value(or_else, visit);
        }
    }
}

/// Visits every set node in pre-order, and every embedded predicate.
pub fn walk_set<'a>(
    expr: &'a SetExpr,
    visit_set: &mut impl FnMut(&'a SetExpr),
    visit_value: &mut impl FnMut(&'a ValueExpr),
) {
    visit_set(expr);
    match expr {
        SetExpr::None | SetExpr::AllOf(_) | SetExpr::Meta(_) => {}
        SetExpr::Filter(input, predicate) => {
            walk_set(input, visit_set, visit_value);
            walk_value(predicate, visit_value);
        }
        SetExpr::Navigate(input, _) => walk_set(input, visit_set, visit_value),
        SetExpr::Union(left, right)
        | SetExpr::Intersection(left, right)
        | SetExpr::Substraction(left, right) => {
            walk_set(left, visit_set, visit_value);
            walk_set(right, visit_set, visit_value);
        }
    }
}

/// Rebuilds a value expression bottom-up.
///
/// Children are transformed first; `f` then sees the rebuilt node.
pub fn map_value(expr: ValueExpr, f: &impl Fn(ValueExpr) -> ValueExpr) -> ValueExpr {
    let rebuilt = match expr {
        ValueExpr::Literal(_)
        | ValueExpr::Attribute(_)
        | ValueExpr::Var(_)
        | ValueExpr::SequenceNext(_)
        | ValueExpr::Meta(_) => expr,
        ValueExpr::Not(inner) => ValueExpr::Not(Box::new(map_value(*inner, f))),
        ValueExpr::And(left, right) => ValueExpr::And(
            Box::new(map_value(*left, f)),
            Box::new(map_value(*right, f)),
        ),
        ValueExpr::Or(left, right) => ValueExpr::Or(
            Box::new(map_value(*left, f)),
            Box::new(map_value(*right, f)),
        ),
        ValueExpr::Compare(op, left, right) => ValueExpr::Compare(
            op,
            Box::new(map_value(*left, f)),
            Box::new(map_value(*right, f)),
        ),
        ValueExpr::IfElse(cond, then, or_else) => ValueExpr::IfElse(
            Box::new(map_value(*cond, f)),
            Box::new(map_value(*then, f)),
            Box::new(map_value(*or_else, f)),
        ),
    };
    f(rebuilt)
}

/// Rebuilds a set expression bottom-up, transforming embedded predicates
/// with `fv` and set nodes with `fs`.
pub fn map_set(
    expr: SetExpr,
    fs: &impl Fn(SetExpr) -> SetExpr,
    fv: &impl Fn(ValueExpr) -> ValueExpr,
) -> SetExpr {
    let rebuilt = match expr {
        SetExpr::None | SetExpr::AllOf(_) | SetExpr::Meta(_) => expr,
        SetExpr::Filter(input, predicate) => SetExpr::Filter(
            Box::new(map_set(*input, fs, fv)),
            Box::new(map_value(*predicate, fv)),
        ),
        SetExpr::Navigate(input, attribute) => {
            SetExpr::Navigate(Box::new(map_set(*input, fs, fv)), attribute)
        }
        SetExpr::Union(left, right) => SetExpr::Union(
            Box::new(map_set(*left, fs, fv)),
            Box::new(map_set(*right, fs, fv)),
        ),
        SetExpr::Intersection(left, right) => SetExpr::Intersection(
            Box::new(map_set(*left, fs, fv)),
            Box::new(map_set(*right, fs, fv)),
        ),
        SetExpr::Substraction(left, right) => SetExpr::Substraction(
            Box::new(map_set(*left, fs, fv)),
            Box::new(map_set(*right, fs, fv)),
        ),
    };
    fs(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Value;

    #[test]
    fn test_walk_value_visits_all_nodes() {
        let expr = ValueExpr::attr_eq("a", 1i64).and(ValueExpr::attribute("b").not());
        let mut kinds = Vec::new();
        walk_value(&expr, &mut |node| kinds.push(node.kind_name()));
        assert_eq!(
            kinds,
            vec!["and", "compare", "attribute", "literal", "not", "attribute"]
        );
    }

    #[test]
    fn test_walk_set_visits_predicates() {
        let expr = SetExpr::all_of("Person")
            .filter(ValueExpr::attr_eq("age", 1i64))
            .union(SetExpr::none());
        let mut sets = Vec::new();
        let mut values = 0usize;
        walk_set(&expr, &mut |node| sets.push(node.kind_name()), &mut |_| {
            values += 1
        });
        assert_eq!(sets, vec!["union", "filter", "all_of", "none"]);
        assert_eq!(values, 3); // compare, attribute, literal
    }

    #[test]
    fn test_map_value_is_bottom_up() {
        // Replace every attribute with a literal; the enclosing compare
        // must see the replacement.
        let expr = ValueExpr::attr_eq("a", 1i64);
        let mapped = map_value(expr, &|node| match node {
            ValueExpr::Attribute(_) => ValueExpr::literal(Value::from(7i64)),
            other => other,
        });
        match mapped {
            ValueExpr::Compare(_, left, _) => {
                assert_eq!(*left, ValueExpr::literal(Value::from(7i64)));
            }
            other => panic!("expected compare, got {}", other.kind_name()),
        }
    }

    #[test]
    fn test_map_set_transforms_both_layers() {
        let expr = SetExpr::all_of("Person").filter(ValueExpr::truth());
        let mapped = map_set(
            expr,
            &|node| match node {
                SetExpr::AllOf(_) => SetExpr::all_of("Robot"),
                other => other,
            },
            &|node| match node {
                ValueExpr::Literal(Value::Bool(true)) => ValueExpr::falsity(),
                other => other,
            },
        );
        assert_eq!(
            mapped,
            SetExpr::all_of("Robot").filter(ValueExpr::falsity())
        );
    }
}
