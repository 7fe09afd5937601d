//! Residual predicate evaluation
//!
//! Evaluates the in-process remainder of a compiled predicate against
//! one row. Conjunction and disjunction are short-circuiting and the
//! untaken conditional branch is never evaluated, so effectful
//! sub-expressions run exactly as written.

use crate::expr::ValueExpr;
use crate::store::{ItemState, Value};

use super::context::ExecContext;
use super::errors::{EngineError, EngineResult};

/// Evaluates an expression against a row.
pub fn eval(expr: &ValueExpr, row: &ItemState, ctx: &ExecContext<'_>) -> EngineResult<Value> {
    match expr {
        ValueExpr::Literal(value) => Ok(value.clone()),
        ValueExpr::Attribute(name) => Ok(row.value(name).clone()),
        ValueExpr::Var(name) => Err(EngineError::execution_failed(
            "evaluation",
            format!("unresolved variable '{}' reached execution", name),
        )),
        ValueExpr::Meta(placeholder) => Err(EngineError::execution_failed(
            "evaluation",
            format!(
                "unresolved meta-variable '{}' reached execution",
                placeholder.name()
            ),
        )),
        ValueExpr::Not(inner) => {
            let value = truthy(&eval(inner, row, ctx)?)?;
            Ok(Value::Bool(!value))
        }
        ValueExpr::And(left, right) => {
            if !truthy(&eval(left, row, ctx)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(truthy(&eval(right, row, ctx)?)?))
        }
        ValueExpr::Or(left, right) => {
            if truthy(&eval(left, row, ctx)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(truthy(&eval(right, row, ctx)?)?))
        }
        ValueExpr::Compare(op, left, right) => {
            let left = eval(left, row, ctx)?;
            let right = eval(right, row, ctx)?;
            let holds = match left.compare(&right) {
                Some(ordering) => op.accepts(ordering),
                None => false,
            };
            Ok(Value::Bool(holds))
        }
        ValueExpr::IfElse(cond, then, or_else) => {
            if truthy(&eval(cond, row, ctx)?)? {
                eval(then, row, ctx)
            } else {
                eval(or_else, row, ctx)
            }
        }
        ValueExpr::SequenceNext(name) => {
            let value = ctx.sequences.next_value(ctx.txn, name)?;
            Ok(Value::Int(value))
        }
    }
}

/// Evaluates an expression as a predicate.
pub fn eval_predicate(
    expr: &ValueExpr,
    row: &ItemState,
    ctx: &ExecContext<'_>,
) -> EngineResult<bool> {
    truthy(&eval(expr, row, ctx)?)
}

/// Boolean coercion: null is false, non-boolean values are an error.
fn truthy(value: &Value) -> EngineResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        other => Err(EngineError::execution_failed(
            "evaluation",
            format!("{} value where a condition was expected", other.kind().kind_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::errors::EngineErrorCode;
    use crate::meta::TypeRegistry;
    use crate::pool::ConnectionPool;
    use crate::sequence::SequenceManager;
    use crate::store::{Branch, KnowledgeBase, ObjectKey, Session};
    use std::collections::BTreeMap;

    fn row(pairs: &[(&str, Value)]) -> ItemState {
        ItemState {
            key: ObjectKey::new("Person", "p1", Branch::TRUNK),
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            created_at: None,
        }
    }

    fn harness() -> (ConnectionPool, SequenceManager) {
        let kb = KnowledgeBase::new(TypeRegistry::new());
        (ConnectionPool::new(kb, 1), SequenceManager::new())
    }

    #[test]
    fn test_attribute_and_literal() {
        let (pool, sequences) = harness();
        let ctx = ExecContext::new(&pool, &sequences);
        let row = row(&[("age", Value::from(30i64))]);

        let expr = ValueExpr::attr_eq("age", 30i64);
        assert!(eval_predicate(&expr, &row, &ctx).unwrap());

        let expr = ValueExpr::attr_lt("age", 30i64);
        assert!(!eval_predicate(&expr, &row, &ctx).unwrap());
    }

    #[test]
    fn test_missing_attribute_reads_null() {
        let (pool, sequences) = harness();
        let ctx = ExecContext::new(&pool, &sequences);
        let row = row(&[]);

        // null compared to a value matches nothing
        let expr = ValueExpr::attr_eq("age", 30i64);
        assert!(!eval_predicate(&expr, &row, &ctx).unwrap());
    }

    #[test]
    fn test_short_circuit_skips_effects() {
        let (pool, sequences) = harness();
        let ctx = ExecContext::new(&pool, &sequences);
        let row = row(&[]);

        // Left side false: the effectful right side must not run, so no
        // transaction is needed.
        let expr = ValueExpr::falsity().and(ValueExpr::compare(
            crate::store::FilterOp::Eq,
            ValueExpr::attribute("serial"),
            ValueExpr::sequence_next("serials"),
        ));
        assert!(!eval_predicate(&expr, &row, &ctx).unwrap());
        assert_eq!(sequences.current("serials"), None);
    }

    #[test]
    fn test_effectful_evaluation_requires_transaction() {
        let (pool, sequences) = harness();
        let ctx = ExecContext::new(&pool, &sequences);
        let row = row(&[]);

        let expr = ValueExpr::sequence_next("serials");
        let err = eval(&expr, &row, &ctx).unwrap_err();
        assert_eq!(err.code(), EngineErrorCode::RevNoTransaction);
    }

    #[test]
    fn test_effectful_evaluation_inside_transaction() {
        let kb = KnowledgeBase::new(TypeRegistry::new());
        let pool = ConnectionPool::new(kb.clone(), 1);
        let sequences = SequenceManager::new();
        let mut session = Session::new(kb);
        session.begin(Branch::TRUNK).unwrap();

        let ctx =
            ExecContext::new(&pool, &sequences).in_transaction(session.transaction().unwrap());
        let row = row(&[]);

        let value = eval(&ValueExpr::sequence_next("serials"), &row, &ctx).unwrap();
        assert_eq!(value, Value::Int(1));
    }

    #[test]
    fn test_conditional_takes_one_branch() {
        let (pool, sequences) = harness();
        let ctx = ExecContext::new(&pool, &sequences);
        let row = row(&[("age", Value::from(10i64))]);

        let expr = ValueExpr::if_else(
            ValueExpr::attr_lt("age", 18i64),
            ValueExpr::literal("minor"),
            ValueExpr::literal("adult"),
        );
        assert_eq!(eval(&expr, &row, &ctx).unwrap(), Value::from("minor"));
    }

    #[test]
    fn test_non_boolean_condition_rejected() {
        let (pool, sequences) = harness();
        let ctx = ExecContext::new(&pool, &sequences);
        let row = row(&[("age", Value::from(10i64))]);

        let expr = ValueExpr::attribute("age").and(ValueExpr::truth());
        let err = eval(&expr, &row, &ctx).unwrap_err();
        assert_eq!(err.code(), EngineErrorCode::RevExecutionFailed);
    }
}
