//! Constant folding
//!
//! Evaluates operations whose operands are literals. Folding always
//! runs, for side-effecting expressions too: a literal subtree inside an
//! effectful call is still a literal. The untaken branch of a literal
//! conditional is dropped; it would never have been evaluated.
//!
//! Anything that eliminates a non-literal operand (`false AND x`) is
//! algebraic simplification and belongs to the rewrite battery, which is
//! skipped for effectful expressions.

use crate::expr::{map_set, map_value, SetExpr, ValueExpr};

/// Folds literal subtrees of a value expression, bottom-up.
pub fn fold_value(expr: ValueExpr) -> ValueExpr {
    map_value(expr, &fold_node)
}

/// Folds literal subtrees of every predicate in a set expression.
pub fn fold_set(expr: SetExpr) -> SetExpr {
    map_set(expr, &|set| set, &fold_node)
}

fn fold_node(expr: ValueExpr) -> ValueExpr {
    match expr {
        ValueExpr::Not(inner) => match inner.as_bool_literal() {
            Some(b) => ValueExpr::literal(!b),
            None => ValueExpr::Not(inner),
        },
        ValueExpr::And(left, right) => {
            match (left.as_bool_literal(), right.as_bool_literal()) {
                (Some(a), Some(b)) => ValueExpr::literal(a && b),
                _ => ValueExpr::And(left, right),
            }
        }
        ValueExpr::Or(left, right) => {
            match (left.as_bool_literal(), right.as_bool_literal()) {
                (Some(a), Some(b)) => ValueExpr::literal(a || b),
                _ => ValueExpr::Or(left, right),
            }
        }
        ValueExpr::Compare(op, left, right) => match (&*left, &*right) {
            (ValueExpr::Literal(a), ValueExpr::Literal(b)) => {
                let holds = match a.compare(b) {
                    Some(ordering) => op.accepts(ordering),
                    None => false,
                };
                ValueExpr::literal(holds)
            }
            _ => ValueExpr::Compare(op, left, right),
        },
        ValueExpr::IfElse(cond, then, or_else) => match cond.as_bool_literal() {
            Some(true) => *then,
            Some(false) => *or_else,
            None => ValueExpr::IfElse(cond, then, or_else),
        },
        other => other,
    }
}
