//! Plan execution
//!
//! Runs a lowered plan tree against one borrowed connection. Scans read
//! the store at the addressed revision (pinned, or the connection's
//! checkout snapshot) with pushed filters evaluated natively; residual
//! predicates and set operators run in-process. Row order is the scan's
//! object-name order, stable across passes.

use crate::compiler::{PlanNode, QueryPlan};
use crate::pool::PooledConnection;
use crate::store::ItemState;

use super::context::ExecContext;
use super::errors::EngineResult;
use super::eval;

/// Runs a plan on a borrowed connection, producing all rows eagerly.
pub fn run_plan(
    plan: &QueryPlan,
    ctx: &ExecContext<'_>,
    conn: &PooledConnection,
) -> EngineResult<Vec<ItemState>> {
    run_node(&plan.root, ctx, conn)
}

fn run_node(
    node: &PlanNode,
    ctx: &ExecContext<'_>,
    conn: &PooledConnection,
) -> EngineResult<Vec<ItemState>> {
    match node {
        PlanNode::Empty => Ok(Vec::new()),
        PlanNode::Scan {
            type_name,
            pushed,
            residual,
            ..
        } => {
            let kb = conn.knowledge_base()?;
            let at = ctx.as_of.unwrap_or_else(|| conn.snapshot());
            let rows = kb.scan(type_name, ctx.branch, at, pushed, ctx.txn)?;
            match residual {
                Some(predicate) => filter_rows(rows, predicate, ctx),
                None => Ok(rows),
            }
        }
        PlanNode::Filter { input, predicate } => {
            let rows = run_node(input, ctx, conn)?;
            filter_rows(rows, predicate, ctx)
        }
        PlanNode::Navigate { input, attribute } => {
            let kb = conn.knowledge_base()?;
            let at = ctx.as_of.unwrap_or_else(|| conn.snapshot());

            // Deduplicated by identity, in identity order.
            let mut targets: std::collections::BTreeMap<(String, String), ItemState> =
                std::collections::BTreeMap::new();
            for row in run_node(input, ctx, conn)? {
                let attr = kb.registry().attribute(&row.key.type_name, attribute)?;
                let reference = match row.value(attribute) {
                    crate::store::Value::Ref(reference) => reference.clone(),
                    // Unset references contribute nothing.
                    crate::store::Value::Null => continue,
                    other => {
                        return Err(super::errors::EngineError::execution_failed(
                            "navigation",
                            format!(
                                "attribute '{}' holds a {} value, not a reference",
                                attribute,
                                other.kind().kind_name()
                            ),
                        ))
                    }
                };
                let target = kb.resolve_reference(&attr, row.key.branch, &reference, at)?;
                targets.insert(identity_of(&target), target);
            }
            Ok(targets.into_values().collect())
        }
        PlanNode::Union(left, right) => {
            let mut rows = run_node(left, ctx, conn)?;
            rows.extend(run_node(right, ctx, conn)?);
            Ok(rows)
        }
        PlanNode::Intersection(left, right) => {
            let right_keys: std::collections::BTreeSet<(String, String)> =
                run_node(right, ctx, conn)?
                    .into_iter()
                    .map(identity)
                    .collect();
            Ok(run_node(left, ctx, conn)?
                .into_iter()
                .filter(|row| right_keys.contains(&identity_of(row)))
                .collect())
        }
        PlanNode::Substraction(left, right) => {
            let right_keys: std::collections::BTreeSet<(String, String)> =
                run_node(right, ctx, conn)?
                    .into_iter()
                    .map(identity)
                    .collect();
            Ok(run_node(left, ctx, conn)?
                .into_iter()
                .filter(|row| !right_keys.contains(&identity_of(row)))
                .collect())
        }
    }
}

/// Branch-agnostic row identity for the set operators.
fn identity(row: ItemState) -> (String, String) {
    (row.key.type_name, row.key.object_name)
}

fn identity_of(row: &ItemState) -> (String, String) {
    (row.key.type_name.clone(), row.key.object_name.clone())
}

fn filter_rows(
    rows: Vec<ItemState>,
    predicate: &crate::expr::ValueExpr,
    ctx: &ExecContext<'_>,
) -> EngineResult<Vec<ItemState>> {
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if eval::eval_predicate(predicate, &row, ctx)? {
            kept.push(row);
        }
    }
    Ok(kept)
}
