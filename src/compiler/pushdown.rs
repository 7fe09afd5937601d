//! Lowering and partial SQL pushdown
//!
//! Turns a resolved, rewritten set expression into a plan tree. Filter
//! predicates directly over a scan are split into conjuncts; each
//! attribute-vs-literal conjunct becomes a pushed filter the store
//! evaluates natively, the remainder stays residual and is evaluated
//! in-process. Stacked filters over one scan merge conjunctively.

use crate::expr::{walk_value, SetExpr, ValueExpr};
use crate::meta::TypeRegistry;
use crate::store::{AttributeFilter, FilterOp, Value};

use super::compile::CompilerContext;
use super::errors::{CompileError, CompileResult};
use super::query::PlanNode;

/// Splits a predicate into its top-level conjuncts.
pub fn split_conjuncts(expr: &ValueExpr) -> Vec<ValueExpr> {
    match expr {
        ValueExpr::And(left, right) => {
            let mut conjuncts = split_conjuncts(left);
            conjuncts.extend(split_conjuncts(right));
            conjuncts
        }
        other => vec![other.clone()],
    }
}

/// Joins conjuncts back into one predicate.
pub fn join_conjuncts(mut conjuncts: Vec<ValueExpr>) -> Option<ValueExpr> {
    let first = match conjuncts.is_empty() {
        true => return None,
        false => conjuncts.remove(0),
    };
    Some(conjuncts.into_iter().fold(first, |acc, next| acc.and(next)))
}

/// Mirrors a comparison operator for operand swapping.
fn flip(op: FilterOp) -> FilterOp {
    match op {
        FilterOp::Eq => FilterOp::Eq,
        FilterOp::Ne => FilterOp::Ne,
        FilterOp::Lt => FilterOp::Gt,
        FilterOp::Le => FilterOp::Ge,
        FilterOp::Gt => FilterOp::Lt,
        FilterOp::Ge => FilterOp::Le,
    }
}

/// Returns the pushable form of a conjunct, if it has one.
///
/// Pushable: `attribute op literal` (either operand order), literal not
/// a reference, and null only under equality shapes.
fn as_pushable(conjunct: &ValueExpr) -> Option<AttributeFilter> {
    let (op, attribute, literal) = match conjunct {
        ValueExpr::Compare(op, left, right) => match (&**left, &**right) {
            (ValueExpr::Attribute(a), ValueExpr::Literal(v)) => (*op, a.clone(), v.clone()),
            (ValueExpr::Literal(v), ValueExpr::Attribute(a)) => (flip(*op), a.clone(), v.clone()),
            _ => return None,
        },
        _ => return None,
    };
    if matches!(literal, Value::Ref(_)) {
        return None;
    }
    if literal.is_null() && !matches!(op, FilterOp::Eq | FilterOp::Ne) {
        return None;
    }
    Some(AttributeFilter::new(attribute, op, literal))
}

/// Validates every attribute access in a scan predicate against the
/// scanned type.
fn validate_attributes(
    registry: &TypeRegistry,
    type_name: &str,
    predicate: &ValueExpr,
) -> CompileResult<()> {
    let ty = registry.get(type_name)?;
    let mut missing: Option<String> = None;
    walk_value(predicate, &mut |node| {
        if missing.is_none() {
            if let ValueExpr::Attribute(name) = node {
                if !ty.has_attribute(name) {
                    missing = Some(name.clone());
                }
            }
        }
    });
    match missing {
        Some(name) => Err(crate::meta::MetaError::no_such_attribute(type_name, name).into()),
        None => Ok(()),
    }
}

/// Validates every type reference in the tree against the registry and
/// the dialect, before any rewriting can fold references away.
pub fn validate_lowering(expr: &SetExpr, ctx: &CompilerContext) -> CompileResult<()> {
    match expr {
        SetExpr::None => Ok(()),
        SetExpr::AllOf(type_name) => {
            ctx.registry.get(type_name)?;
            ctx.dialect.table_name(type_name)?;
            Ok(())
        }
        SetExpr::Meta(placeholder) => Err(CompileError::unbound_meta(placeholder.name())),
        SetExpr::Filter(input, _) => validate_lowering(input, ctx),
        SetExpr::Navigate(input, attribute) => {
            validate_lowering(input, ctx)?;
            // A navigation directly over a scan is checkable statically:
            // the attribute must be a declared reference.
            if let SetExpr::AllOf(type_name) = &**input {
                let attr = ctx.registry.attribute(type_name, attribute)?;
                if !attr.kind.is_reference() {
                    return Err(crate::meta::MetaError::incompatible_type(
                        type_name,
                        attribute,
                        "reference",
                        attr.kind.kind_name(),
                    )
                    .into());
                }
            }
            Ok(())
        }
        SetExpr::Union(left, right)
        | SetExpr::Intersection(left, right)
        | SetExpr::Substraction(left, right) => {
            validate_lowering(left, ctx)?;
            validate_lowering(right, ctx)
        }
    }
}

/// Lowers a resolved, rewritten set expression into a plan tree,
/// collecting the SQL preview of every pushed filter.
pub fn build_plan(
    expr: &SetExpr,
    ctx: &CompilerContext,
    pushed_sql: &mut Vec<String>,
) -> CompileResult<PlanNode> {
    match expr {
        SetExpr::None => Ok(PlanNode::Empty),
        SetExpr::AllOf(type_name) => {
            ctx.registry.get(type_name)?;
            let table = ctx.dialect.table_name(type_name)?;
            Ok(PlanNode::Scan {
                type_name: type_name.clone(),
                table,
                pushed: Vec::new(),
                residual: None,
            })
        }
        SetExpr::Meta(placeholder) => Err(CompileError::unbound_meta(placeholder.name())),
        SetExpr::Filter(input, predicate) => {
            let input_plan = build_plan(input, ctx, pushed_sql)?;
            apply_filter(input_plan, (**predicate).clone(), ctx, pushed_sql)
        }
        SetExpr::Navigate(input, attribute) => Ok(PlanNode::Navigate {
            input: Box::new(build_plan(input, ctx, pushed_sql)?),
            attribute: attribute.clone(),
        }),
        SetExpr::Union(left, right) => Ok(PlanNode::Union(
            Box::new(build_plan(left, ctx, pushed_sql)?),
            Box::new(build_plan(right, ctx, pushed_sql)?),
        )),
        SetExpr::Intersection(left, right) => Ok(PlanNode::Intersection(
            Box::new(build_plan(left, ctx, pushed_sql)?),
            Box::new(build_plan(right, ctx, pushed_sql)?),
        )),
        SetExpr::Substraction(left, right) => Ok(PlanNode::Substraction(
            Box::new(build_plan(left, ctx, pushed_sql)?),
            Box::new(build_plan(right, ctx, pushed_sql)?),
        )),
    }
}

/// Applies a filter predicate to a plan node, pushing what the scan can
/// evaluate natively.
fn apply_filter(
    input: PlanNode,
    predicate: ValueExpr,
    ctx: &CompilerContext,
    pushed_sql: &mut Vec<String>,
) -> CompileResult<PlanNode> {
    match input {
        PlanNode::Scan {
            type_name,
            table,
            mut pushed,
            residual,
        } => {
            validate_attributes(ctx.registry, &type_name, &predicate)?;

            let mut residual_conjuncts = match residual {
                Some(existing) => split_conjuncts(&existing),
                None => Vec::new(),
            };
            for conjunct in split_conjuncts(&predicate) {
                match as_pushable(&conjunct) {
                    Some(filter) => {
                        pushed_sql.push(ctx.dialect.render_filter(&type_name, &filter)?);
                        pushed.push(filter);
                    }
                    None => residual_conjuncts.push(conjunct),
                }
            }

            Ok(PlanNode::Scan {
                type_name,
                table,
                pushed,
                residual: join_conjuncts(residual_conjuncts),
            })
        }
        other => Ok(PlanNode::Filter {
            input: Box::new(other),
            predicate,
        }),
    }
}
