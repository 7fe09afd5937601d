//! Native-sequence bootstrap
//!
//! One-shot utility for migrating a legacy auto-increment column to a
//! real sequence: computes the safe starting value (`max + 1` over the
//! existing column) and renders the backend-specific creation DDL. Runs
//! on a borrowed read connection.

use crate::dialect::SqlDialect;
use crate::pool::PooledConnection;
use crate::store::{Branch, Value};

use super::errors::{SequenceError, SequenceResult};
use super::manager::DEFAULT_START;

/// Computes the safe starting value for a sequence replacing a legacy
/// serial attribute: one past the highest value currently stored.
pub fn bootstrap_start(
    conn: &PooledConnection,
    type_name: &str,
    attribute: &str,
    branch: Branch,
    sequence: &str,
) -> SequenceResult<i64> {
    let kb = conn
        .knowledge_base()
        .map_err(|e| SequenceError::failed(sequence, "bootstrap", e.message().to_string()))?;

    let attr = kb
        .registry()
        .attribute(type_name, attribute)
        .map_err(|e| SequenceError::failed(sequence, "bootstrap", e.message().to_string()))?;
    if attr.kind != crate::meta::AttributeKind::Int {
        return Err(SequenceError::failed(
            sequence,
            "bootstrap",
            format!(
                "attribute '{}.{}' is {}, not a serial column",
                type_name,
                attribute,
                attr.kind.kind_name()
            ),
        ));
    }

    let rows = kb
        .scan(type_name, branch, conn.snapshot(), &[], None)
        .map_err(|e| SequenceError::failed(sequence, "bootstrap", e.message().to_string()))?;

    let max = rows
        .iter()
        .filter_map(|row| match row.value(attribute) {
            Value::Int(v) => Some(*v),
            _ => None,
        })
        .max();

    Ok(max.map_or(DEFAULT_START, |m| m + 1))
}

/// Renders the backend-specific DDL creating the migrated sequence at
/// its computed start value.
pub fn bootstrap_ddl(
    conn: &PooledConnection,
    dialect: &dyn SqlDialect,
    type_name: &str,
    attribute: &str,
    branch: Branch,
    sequence: &str,
) -> SequenceResult<(i64, String)> {
    let start = bootstrap_start(conn, type_name, attribute, branch, sequence)?;
    let ddl = dialect
        .create_sequence_ddl(sequence, start)
        .map_err(|e| SequenceError::failed(sequence, "bootstrap", e.message().to_string()))?;
    Ok((start, ddl))
}
