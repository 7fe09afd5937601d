//! Side-effect analysis
//!
//! An expression is side-effecting when evaluating it can change
//! observable state. The one effectful node kind is `SequenceNext`:
//! it mints an identifier on every evaluation. Side-effecting
//! expressions skip algebraic rewriting so the effect order and count
//! stay exactly as written; constant folding still runs.
//!
//! Analysis runs after resolution, so meta-variables and free variables
//! no longer occur.

use crate::expr::{walk_set, walk_value, SetExpr, ValueExpr};

/// Returns true if evaluating the value expression has side effects.
pub fn value_has_effects(expr: &ValueExpr) -> bool {
    let mut found = false;
    walk_value(expr, &mut |node| {
        if matches!(node, ValueExpr::SequenceNext(_)) {
            found = true;
        }
    });
    found
}

/// Returns true if any predicate inside the set expression has side
/// effects.
pub fn set_has_effects(expr: &SetExpr) -> bool {
    let mut found = false;
    walk_set(expr, &mut |_| {}, &mut |node| {
        if matches!(node, ValueExpr::SequenceNext(_)) {
            found = true;
        }
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_expression() {
        let expr = ValueExpr::attr_eq("age", 30i64).and(ValueExpr::attribute("ok").not());
        assert!(!value_has_effects(&expr));
    }

    #[test]
    fn test_sequence_next_is_effectful() {
        let expr = ValueExpr::compare(
            crate::store::FilterOp::Eq,
            ValueExpr::attribute("ticket"),
            ValueExpr::sequence_next("tickets"),
        );
        assert!(value_has_effects(&expr));
    }

    #[test]
    fn test_set_effects_found_in_nested_predicate() {
        let pure = SetExpr::all_of("Person").filter(ValueExpr::attr_eq("age", 1i64));
        assert!(!set_has_effects(&pure));

        let effectful = SetExpr::all_of("Person")
            .union(SetExpr::all_of("Robot").filter(ValueExpr::compare(
                crate::store::FilterOp::Eq,
                ValueExpr::attribute("serial"),
                ValueExpr::sequence_next("serials"),
            )));
        assert!(set_has_effects(&effectful));
    }
}
