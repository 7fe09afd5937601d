//! Expression AST
//!
//! A closed algebra of value expressions (per-row conditions) and set
//! expressions (instance sets and the algebra over them), plus
//! meta-variables: named placeholders a template binds once per
//! compilation pass.

mod binding;
mod errors;
mod set;
mod value;
mod visit;

pub use binding::{MetaSet, MetaValue};
pub use errors::{ExprError, ExprErrorCode, ExprResult};
pub use set::SetExpr;
pub use value::ValueExpr;
pub use visit::{map_set, map_value, walk_set, walk_value};
