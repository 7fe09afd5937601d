//! The compilation pipeline
//!
//! Order matters:
//! 1. Resolve free variables and meta-variable bindings.
//! 2. Validate lowering: every type reference must bind to the physical
//!    schema, before rewriting can fold a bad reference away.
//! 3. Determine side-effect freedom.
//! 4. Constant-fold (always), then run the algebraic battery (pure
//!    expressions only, to keep effect order and count as written).
//! 5. Lower into a plan tree, pushing translatable conjuncts to the
//!    scans and keeping the residual in-process.
//! 6. Re-check resolution: rewriting introduces fresh nodes.

use crate::dialect::SqlDialect;
use crate::expr::SetExpr;
use crate::meta::TypeRegistry;

use super::effects;
use super::errors::CompileResult;
use super::fold;
use super::pushdown;
use super::query::{CompiledQuery, PlanNode, QueryPlan};
use super::rewrite;
use super::scope::{self, Scope};

/// Everything compilation binds against: the schema and the dialect.
///
/// Passed explicitly to every entry point; there is no ambient registry.
#[derive(Clone, Copy)]
pub struct CompilerContext<'a> {
    /// The frozen type vocabulary
    pub registry: &'a TypeRegistry,
    /// The target backend's identifier mangling
    pub dialect: &'a dyn SqlDialect,
}

impl<'a> CompilerContext<'a> {
    pub fn new(registry: &'a TypeRegistry, dialect: &'a dyn SqlDialect) -> Self {
        Self { registry, dialect }
    }
}

/// Compiles a set expression into an executable query.
pub fn compile(
    expr: &SetExpr,
    scope: &Scope,
    ctx: &CompilerContext<'_>,
) -> CompileResult<CompiledQuery> {
    // 1. Resolution
    let resolved = scope::resolve_set(expr, scope)?;

    // 2. Lowering validation
    pushdown::validate_lowering(&resolved, ctx)?;

    // 3. Effect analysis
    let has_effects = effects::set_has_effects(&resolved);

    // 4. Folding always; the battery only without side effects
    let folded = fold::fold_set(resolved);
    let rewritten = if has_effects {
        folded
    } else {
        rewrite::rewrite_set(folded)
    };

    // 6. Re-resolution check (rewriting can introduce fresh nodes)
    scope::ensure_set_resolved(&rewritten)?;

    // 5. Lowering and pushdown
    let mut pushed_sql = Vec::new();
    let root = pushdown::build_plan(&rewritten, ctx, &mut pushed_sql)?;

    if matches!(root, PlanNode::Empty) {
        return Ok(CompiledQuery::Empty);
    }
    Ok(CompiledQuery::Plan(QueryPlan {
        root,
        pushed_sql,
        has_effects,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::errors::CompileErrorCode;
    use crate::dialect::DefaultDialect;
    use crate::expr::{MetaValue, ValueExpr};
    use crate::meta::{MetaObject, MoAttribute};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        let mut ty = MetaObject::new("Person");
        ty.add_attribute(MoAttribute::mandatory_string("name")).unwrap();
        ty.add_attribute(MoAttribute::int("age")).unwrap();
        ty.freeze();
        registry.define(ty).unwrap();
        registry
    }

    fn compile_one(expr: &SetExpr) -> CompileResult<CompiledQuery> {
        compile_scoped(expr, &Scope::new())
    }

    fn compile_scoped(expr: &SetExpr, scope: &Scope) -> CompileResult<CompiledQuery> {
        let registry = registry();
        let dialect = DefaultDialect;
        let ctx = CompilerContext::new(&registry, &dialect);
        compile(expr, scope, &ctx)
    }

    #[test]
    fn test_plain_scan_compiles() {
        let query = compile_one(&SetExpr::all_of("Person")).unwrap();
        match query {
            CompiledQuery::Plan(plan) => {
                assert!(!plan.has_effects);
                assert_eq!(plan.root.kind_name(), "scan");
            }
            other => panic!("unexpected query: {:?}", other),
        }
    }

    #[test]
    fn test_none_compiles_to_empty() {
        assert_eq!(compile_one(&SetExpr::none()).unwrap(), CompiledQuery::Empty);
    }

    #[test]
    fn test_constant_false_filter_compiles_to_empty() {
        let expr = SetExpr::all_of("Person").filter(ValueExpr::falsity());
        assert_eq!(compile_one(&expr).unwrap(), CompiledQuery::Empty);
    }

    #[test]
    fn test_unknown_type_fails_even_when_rewriting_would_drop_it() {
        // The filter collapses to None, but lowering validation runs
        // before rewriting and still sees the bad reference.
        let expr = SetExpr::all_of("Ghost").filter(ValueExpr::falsity());
        let err = compile_one(&expr).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::RevUnknownType);
    }

    #[test]
    fn test_template_reuse_with_different_bindings() {
        let check = MetaValue::named("check");
        let template = SetExpr::all_of("Person").filter(ValueExpr::meta(check.clone()));

        check.bind(ValueExpr::attr_eq("name", "Alice")).unwrap();
        let first = compile_one(&template).unwrap();

        check.reset();
        check.bind(ValueExpr::attr_ge("age", 18i64)).unwrap();
        let second = compile_one(&template).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_unbound_meta_fails() {
        let template = SetExpr::all_of("Person").filter(ValueExpr::meta(MetaValue::named("m")));
        let err = compile_one(&template).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::RevUnboundMeta);
    }

    #[test]
    fn test_effectful_expression_skips_battery() {
        // `true AND (serial = next(serials))` would be absorbed by the
        // battery; with effects present the AND survives as residual.
        let effectful = ValueExpr::truth().and(ValueExpr::compare(
            crate::store::FilterOp::Eq,
            ValueExpr::attribute("age"),
            ValueExpr::sequence_next("ages"),
        ));
        let expr = SetExpr::all_of("Person").filter(effectful.clone());

        let query = compile_scoped(&expr, &Scope::new()).unwrap();
        match query {
            CompiledQuery::Plan(plan) => {
                assert!(plan.has_effects);
                match plan.root {
                    PlanNode::Scan { residual, .. } => {
                        assert_eq!(residual, Some(effectful));
                    }
                    other => panic!("expected scan, got {}", other.kind_name()),
                }
            }
            other => panic!("unexpected query: {:?}", other),
        }
    }

    #[test]
    fn test_pure_expression_gets_simplified() {
        // The same shape without effects is simplified and pushed.
        let pure = ValueExpr::truth().and(ValueExpr::attr_eq("age", 30i64));
        let expr = SetExpr::all_of("Person").filter(pure);

        let query = compile_one(&expr).unwrap();
        match query {
            CompiledQuery::Plan(plan) => match plan.root {
                PlanNode::Scan {
                    pushed, residual, ..
                } => {
                    assert_eq!(pushed.len(), 1);
                    assert!(residual.is_none());
                }
                other => panic!("expected scan, got {}", other.kind_name()),
            },
            other => panic!("unexpected query: {:?}", other),
        }
    }

    #[test]
    fn test_union_of_filters_plans_per_branch() {
        let expr = SetExpr::all_of("Person")
            .union(SetExpr::all_of("Person"))
            .filter(ValueExpr::attr_ge("age", 18i64));
        let query = compile_one(&expr).unwrap();
        match query {
            CompiledQuery::Plan(plan) => match plan.root {
                PlanNode::Union(left, right) => {
                    // The filter was pulled under the union: both sides
                    // are scans with the pushed predicate.
                    for side in [&*left, &*right] {
                        match side {
                            PlanNode::Scan { pushed, .. } => assert_eq!(pushed.len(), 1),
                            other => panic!("expected scan, got {}", other.kind_name()),
                        }
                    }
                }
                other => panic!("expected union, got {}", other.kind_name()),
            },
            other => panic!("unexpected query: {:?}", other),
        }
    }

    #[test]
    fn test_navigating_a_non_reference_rejected() {
        let expr = SetExpr::all_of("Person").navigate("age");
        let err = compile_one(&expr).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::RevIncompatibleType);

        let expr = SetExpr::all_of("Person").navigate("ghost");
        let err = compile_one(&expr).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::RevNoSuchAttribute);
    }

    #[test]
    fn test_scope_variables_reach_pushdown() {
        let scope = Scope::new().define("min_age", ValueExpr::literal(21i64));
        let expr = SetExpr::all_of("Person").filter(ValueExpr::compare(
            crate::store::FilterOp::Ge,
            ValueExpr::attribute("age"),
            ValueExpr::var("min_age"),
        ));

        let query = compile_scoped(&expr, &scope).unwrap();
        match query {
            CompiledQuery::Plan(plan) => {
                assert_eq!(plan.pushed_sql, vec!["\"t_person\".\"c_age\" >= 21"]);
            }
            other => panic!("unexpected query: {:?}", other),
        }
    }
}
