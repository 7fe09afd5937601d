//! Compiled query execution engine
//!
//! Two retrieval modes over one compiled query:
//! - `search` - eager: borrows a connection, produces all rows, releases
//!   the connection before returning
//! - `open` - streaming: returns a `RowStream` that holds its connection
//!   until closed (or dropped)
//!
//! Concatenated queries drain their sources in list order; empty sources
//! anywhere in the list are skipped without disturbing order.

mod context;
mod errors;
mod eval;
mod exec;
mod stream;

use crate::compiler::CompiledQuery;
use crate::store::ItemState;

pub use context::ExecContext;
pub use errors::{EngineError, EngineErrorCode, EngineResult};
pub use eval::{eval, eval_predicate};
pub use stream::RowStream;

/// Runs a query eagerly, returning all rows.
///
/// Each plan source borrows a connection for exactly the duration of its
/// execution.
pub fn search(query: &CompiledQuery, ctx: &ExecContext<'_>) -> EngineResult<Vec<ItemState>> {
    match query {
        CompiledQuery::Empty => Ok(Vec::new()),
        CompiledQuery::Plan(plan) => {
            let conn = ctx.pool.acquire()?;
            let rows = exec::run_plan(plan, ctx, &conn)?;
            Ok(rows)
        }
        CompiledQuery::Concat(sources) => {
            let mut rows = Vec::new();
            for source in sources {
                rows.extend(search(source, ctx)?);
            }
            Ok(rows)
        }
    }
}

/// Opens a streaming pass over a query.
pub fn open<'a>(query: &CompiledQuery, ctx: ExecContext<'a>) -> EngineResult<RowStream<'a>> {
    RowStream::open(query, ctx)
}
