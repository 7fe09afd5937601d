//! Query compiler
//!
//! Transforms expression trees into executable compiled queries:
//! resolution, lowering validation, effect analysis, constant folding,
//! the algebraic rewrite battery, and partial SQL pushdown.

mod compile;
mod effects;
mod errors;
mod fold;
mod pushdown;
mod query;
mod rewrite;
mod scope;

pub use compile::{compile, CompilerContext};
pub use effects::{set_has_effects, value_has_effects};
pub use errors::{CompileError, CompileErrorCode, CompileResult};
pub use fold::{fold_set, fold_value};
pub use query::{CompiledQuery, PlanNode, QueryPlan};
pub use rewrite::{rewrite_set, rewrite_value, MAX_PASSES};
pub use scope::{ensure_set_resolved, ensure_value_resolved, resolve_set, resolve_value, Scope};
