//! Algebraic rewrite battery
//!
//! A fixed battery of local, semantics-preserving rewrite rules, applied
//! bottom-up over the immutable tree until a full pass changes nothing.
//! Rules are pure `Tree -> Tree` functions; a rule either returns the
//! replacement node or declines.
//!
//! The battery runs only for side-effect-free expressions. A pass cap
//! bounds pathological inputs; rewrites preserve semantics, so stopping
//! at the cap is still correct.

use std::cell::Cell;

use crate::expr::{map_set, SetExpr, ValueExpr};

/// Upper bound on full rewrite passes.
pub const MAX_PASSES: usize = 64;

/// One local rewrite rule.
///
/// A rule inspects a single node (children already rewritten) and
/// returns `Some(replacement)` when it fires.
trait RewriteRule {
    /// Rule name for diagnostics
    fn name(&self) -> &'static str;

    /// Attempts to rewrite a value node.
    fn apply_value(&self, _expr: &ValueExpr) -> Option<ValueExpr> {
        None
    }

    /// Attempts to rewrite a set node.
    fn apply_set(&self, _expr: &SetExpr) -> Option<SetExpr> {
        None
    }
}

/// `true AND x -> x`, `false AND x -> false`, dual for OR, `NOT literal`,
/// and `if-else` with equal branches.
struct BooleanAbsorption;

impl RewriteRule for BooleanAbsorption {
    fn name(&self) -> &'static str {
        "boolean_absorption"
    }

    fn apply_value(&self, expr: &ValueExpr) -> Option<ValueExpr> {
        match expr {
            ValueExpr::And(left, right) => match (left.as_bool_literal(), right.as_bool_literal())
            {
                (Some(true), _) => Some((**right).clone()),
                (_, Some(true)) => Some((**left).clone()),
                (Some(false), _) | (_, Some(false)) => Some(ValueExpr::falsity()),
                _ => None,
            },
            ValueExpr::Or(left, right) => match (left.as_bool_literal(), right.as_bool_literal()) {
                (Some(false), _) => Some((**right).clone()),
                (_, Some(false)) => Some((**left).clone()),
                (Some(true), _) | (_, Some(true)) => Some(ValueExpr::truth()),
                _ => None,
            },
            ValueExpr::Not(inner) => inner.as_bool_literal().map(|b| ValueExpr::literal(!b)),
            ValueExpr::IfElse(cond, then, or_else) => match cond.as_bool_literal() {
                Some(true) => Some((**then).clone()),
                Some(false) => Some((**or_else).clone()),
                None if then == or_else => Some((**then).clone()),
                None => None,
            },
            _ => None,
        }
    }
}

/// `NOT NOT x -> x`
struct DoubleNegation;

impl RewriteRule for DoubleNegation {
    fn name(&self) -> &'static str {
        "double_negation"
    }

    fn apply_value(&self, expr: &ValueExpr) -> Option<ValueExpr> {
        match expr {
            ValueExpr::Not(inner) => match &**inner {
                ValueExpr::Not(x) => Some((**x).clone()),
                _ => None,
            },
            _ => None,
        }
    }
}

/// `x AND x -> x`, `x OR x -> x`
struct Idempotence;

impl RewriteRule for Idempotence {
    fn name(&self) -> &'static str {
        "idempotence"
    }

    fn apply_value(&self, expr: &ValueExpr) -> Option<ValueExpr> {
        match expr {
            ValueExpr::And(left, right) | ValueExpr::Or(left, right) if left == right => {
                Some((**left).clone())
            }
            _ => None,
        }
    }
}

/// `NOT (a AND b) -> NOT a OR NOT b`, `NOT (a OR b) -> NOT a AND NOT b`
struct DeMorgan;

impl RewriteRule for DeMorgan {
    fn name(&self) -> &'static str {
        "de_morgan"
    }

    fn apply_value(&self, expr: &ValueExpr) -> Option<ValueExpr> {
        match expr {
            ValueExpr::Not(inner) => match &**inner {
                ValueExpr::And(a, b) => {
                    Some((**a).clone().not().or((**b).clone().not()))
                }
                ValueExpr::Or(a, b) => {
                    Some((**a).clone().not().and((**b).clone().not()))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// `x OR (a AND b) -> (x OR a) AND (x OR b)`, and mirrored.
struct OrOverAnd;

impl RewriteRule for OrOverAnd {
    fn name(&self) -> &'static str {
        "or_over_and"
    }

    fn apply_value(&self, expr: &ValueExpr) -> Option<ValueExpr> {
        match expr {
            ValueExpr::Or(left, right) => {
                if let ValueExpr::And(a, b) = &**right {
                    let x = (**left).clone();
                    return Some(
                        x.clone().or((**a).clone()).and(x.or((**b).clone())),
                    );
                }
                if let ValueExpr::And(a, b) = &**left {
                    let x = (**right).clone();
                    return Some(
                        (**a).clone().or(x.clone()).and((**b).clone().or(x)),
                    );
                }
                None
            }
            _ => None,
        }
    }
}

/// Filter simplification: constant predicates and empty inputs.
struct FilterSimplify;

impl RewriteRule for FilterSimplify {
    fn name(&self) -> &'static str {
        "filter_simplify"
    }

    fn apply_set(&self, expr: &SetExpr) -> Option<SetExpr> {
        match expr {
            SetExpr::Filter(input, predicate) => {
                if matches!(**input, SetExpr::None) {
                    return Some(SetExpr::None);
                }
                match predicate.as_bool_literal() {
                    Some(true) => Some((**input).clone()),
                    Some(false) => Some(SetExpr::None),
                    None => None,
                }
            }
            _ => None,
        }
    }
}

/// Pulls a union out from under a filter, enabling per-branch planning.
struct UnionPullout;

impl RewriteRule for UnionPullout {
    fn name(&self) -> &'static str {
        "union_pullout"
    }

    fn apply_set(&self, expr: &SetExpr) -> Option<SetExpr> {
        match expr {
            SetExpr::Filter(input, predicate) => match &**input {
                SetExpr::Union(left, right) => Some(
                    (**left)
                        .clone()
                        .filter((**predicate).clone())
                        .union((**right).clone().filter((**predicate).clone())),
                ),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Empty-set algebra: unions, intersections and substractions with the
/// empty set collapse.
struct EmptySetAlgebra;

impl RewriteRule for EmptySetAlgebra {
    fn name(&self) -> &'static str {
        "empty_set_algebra"
    }

    fn apply_set(&self, expr: &SetExpr) -> Option<SetExpr> {
        match expr {
            SetExpr::Union(left, right) => {
                if matches!(**left, SetExpr::None) {
                    return Some((**right).clone());
                }
                if matches!(**right, SetExpr::None) {
                    return Some((**left).clone());
                }
                None
            }
            SetExpr::Intersection(left, right) => {
                if matches!(**left, SetExpr::None) || matches!(**right, SetExpr::None) {
                    return Some(SetExpr::None);
                }
                None
            }
            SetExpr::Substraction(left, right) => {
                if matches!(**left, SetExpr::None) {
                    return Some(SetExpr::None);
                }
                if matches!(**right, SetExpr::None) {
                    return Some((**left).clone());
                }
                None
            }
            _ => None,
        }
    }
}

/// The battery, in application order.
fn battery() -> [&'static dyn RewriteRule; 8] {
    [
        &BooleanAbsorption,
        &DoubleNegation,
        &Idempotence,
        &DeMorgan,
        &OrOverAnd,
        &FilterSimplify,
        &UnionPullout,
        &EmptySetAlgebra,
    ]
}

fn rewrite_value_node(expr: ValueExpr, changed: &Cell<bool>) -> ValueExpr {
    for rule in battery() {
        if let Some(replacement) = rule.apply_value(&expr) {
            changed.set(true);
            return replacement;
        }
    }
    expr
}

fn rewrite_set_node(expr: SetExpr, changed: &Cell<bool>) -> SetExpr {
    for rule in battery() {
        if let Some(replacement) = rule.apply_set(&expr) {
            changed.set(true);
            return replacement;
        }
    }
    expr
}

/// Runs the battery over a set expression to a fixpoint.
pub fn rewrite_set(expr: SetExpr) -> SetExpr {
    let mut current = expr;
    for _ in 0..MAX_PASSES {
        let changed = Cell::new(false);
        current = map_set(
            current,
            &|node| rewrite_set_node(node, &changed),
            &|node| rewrite_value_node(node, &changed),
        );
        if !changed.get() {
            break;
        }
    }
    current
}

/// Runs the battery over a value expression to a fixpoint.
pub fn rewrite_value(expr: ValueExpr) -> ValueExpr {
    let mut current = expr;
    for _ in 0..MAX_PASSES {
        let changed = Cell::new(false);
        current = crate::expr::map_value(current, &|node| rewrite_value_node(node, &changed));
        if !changed.get() {
            break;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str) -> ValueExpr {
        ValueExpr::attribute(name)
    }

    #[test]
    fn test_true_absorption_under_and() {
        let expr = ValueExpr::truth().and(attr("x"));
        assert_eq!(rewrite_value(expr), attr("x"));
    }

    #[test]
    fn test_false_short_circuits_and() {
        let expr = attr("x").and(ValueExpr::falsity());
        assert_eq!(rewrite_value(expr), ValueExpr::falsity());
    }

    #[test]
    fn test_double_negation_eliminated() {
        let expr = attr("x").not().not();
        assert_eq!(rewrite_value(expr), attr("x"));
    }

    #[test]
    fn test_duplicate_conjunct_eliminated() {
        let expr = attr("x").and(attr("x"));
        assert_eq!(rewrite_value(expr), attr("x"));
    }

    #[test]
    fn test_de_morgan_with_double_negation() {
        // NOT (NOT a AND NOT b) -> a OR b
        let expr = attr("a").not().and(attr("b").not()).not();
        assert_eq!(rewrite_value(expr), attr("a").or(attr("b")));
    }

    #[test]
    fn test_or_distributes_over_and() {
        let expr = attr("x").or(attr("a").and(attr("b")));
        assert_eq!(
            rewrite_value(expr),
            attr("x").or(attr("a")).and(attr("x").or(attr("b")))
        );
    }

    #[test]
    fn test_if_else_equal_branches() {
        let expr = ValueExpr::if_else(attr("cond"), attr("v"), attr("v"));
        assert_eq!(rewrite_value(expr), attr("v"));
    }

    #[test]
    fn test_union_pulled_out_of_filter() {
        let expr = SetExpr::all_of("A")
            .union(SetExpr::all_of("B"))
            .filter(attr("ok"));
        assert_eq!(
            rewrite_set(expr),
            SetExpr::all_of("A")
                .filter(attr("ok"))
                .union(SetExpr::all_of("B").filter(attr("ok")))
        );
    }

    #[test]
    fn test_constant_false_filter_collapses_to_none() {
        let expr = SetExpr::all_of("A").filter(ValueExpr::falsity());
        assert_eq!(rewrite_set(expr), SetExpr::None);
    }

    #[test]
    fn test_empty_set_algebra() {
        let expr = SetExpr::none().union(SetExpr::all_of("A"));
        assert_eq!(rewrite_set(expr), SetExpr::all_of("A"));

        let expr = SetExpr::all_of("A").intersection(SetExpr::none());
        assert_eq!(rewrite_set(expr), SetExpr::None);

        let expr = SetExpr::all_of("A").substraction(SetExpr::none());
        assert_eq!(rewrite_set(expr), SetExpr::all_of("A"));
    }

    #[test]
    fn test_rules_cascade_to_fixpoint() {
        // Filter(Union(A, None), false AND x) collapses entirely.
        let expr = SetExpr::all_of("A")
            .union(SetExpr::none())
            .filter(ValueExpr::falsity().and(attr("x")));
        assert_eq!(rewrite_set(expr), SetExpr::None);
    }

    #[test]
    fn test_fixpoint_is_stable() {
        let expr = attr("a").or(attr("b").and(attr("c")));
        let once = rewrite_value(expr);
        let twice = rewrite_value(once.clone());
        assert_eq!(once, twice);
    }
}
