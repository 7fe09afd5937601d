//! Streaming result retrieval
//!
//! A `RowStream` holds its read connection until closed. The contract:
//! - `has_next` is idempotent; repeated calls never change the answer
//! - `next` works without a prior `has_next` and visits every row
//!   exactly once; on a drained or closed stream it fails exhausted
//! - `close` releases the connection, is idempotent, and runs on drop
//!
//! Concatenated sources are drained in list order; the next source is
//! not opened before the previous one is exhausted.

use std::collections::VecDeque;

use crate::compiler::CompiledQuery;
use crate::store::ItemState;

use super::context::ExecContext;
use super::errors::{EngineError, EngineResult};
use super::exec;

enum StreamState<'a> {
    /// Released; stably exhausted
    Closed,
    /// Rows of one plan, with the connection held until close
    Rows {
        buf: VecDeque<ItemState>,
        conn: Option<crate::pool::PooledConnection>,
    },
    /// Sources drained lazily in list order
    Concat {
        pending: VecDeque<CompiledQuery>,
        current: Option<Box<RowStream<'a>>>,
    },
}

/// A closeable, resource-holding row iterator.
pub struct RowStream<'a> {
    ctx: ExecContext<'a>,
    state: StreamState<'a>,
}

impl<'a> RowStream<'a> {
    /// Opens a stream over a compiled query.
    ///
    /// A plan query borrows its connection here and keeps it until
    /// `close`. The empty query holds no resources.
    pub fn open(query: &CompiledQuery, ctx: ExecContext<'a>) -> EngineResult<Self> {
        let state = match query {
            CompiledQuery::Empty => StreamState::Rows {
                buf: VecDeque::new(),
                conn: None,
            },
            CompiledQuery::Plan(plan) => {
                let conn = ctx.pool.acquire()?;
                let rows = exec::run_plan(plan, &ctx, &conn)?;
                StreamState::Rows {
                    buf: rows.into(),
                    conn: Some(conn),
                }
            }
            CompiledQuery::Concat(sources) => StreamState::Concat {
                pending: sources.iter().cloned().collect(),
                current: None,
            },
        };
        Ok(Self { ctx, state })
    }

    /// Returns true if another row is available. Idempotent.
    pub fn has_next(&mut self) -> bool {
        match &mut self.state {
            StreamState::Closed => false,
            StreamState::Rows { buf, .. } => !buf.is_empty(),
            StreamState::Concat { pending, current } => loop {
                if let Some(stream) = current {
                    if stream.has_next() {
                        return true;
                    }
                    stream.close();
                    *current = None;
                }
                match pending.pop_front() {
                    Some(source) => match RowStream::open(&source, self.ctx) {
                        Ok(stream) => *current = Some(Box::new(stream)),
                        // Leave the source queued; the error surfaces
                        // from `next`.
                        Err(_) => {
                            pending.push_front(source);
                            return true;
                        }
                    },
                    None => return false,
                }
            },
        }
    }

    /// Returns the next row; fails exhausted on a drained stream.
    pub fn next(&mut self) -> EngineResult<ItemState> {
        match &mut self.state {
            StreamState::Closed => Err(EngineError::exhausted()),
            StreamState::Rows { buf, .. } => buf.pop_front().ok_or_else(EngineError::exhausted),
            StreamState::Concat { pending, current } => loop {
                if let Some(stream) = current {
                    if stream.has_next() {
                        return stream.next();
                    }
                    stream.close();
                    *current = None;
                }
                match pending.pop_front() {
                    Some(source) => {
                        *current = Some(Box::new(RowStream::open(&source, self.ctx)?));
                    }
                    None => return Err(EngineError::exhausted()),
                }
            },
        }
    }

    /// Releases the underlying connection. Idempotent; also runs on
    /// drop, so scope-guard usage needs no explicit call.
    pub fn close(&mut self) {
        self.state = StreamState::Closed;
    }

    /// Returns true once the stream is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self.state, StreamState::Closed)
    }
}

impl Drop for RowStream<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
