//! SQL dialect abstraction
//!
//! Translates logical identifiers into physical, backend-safe names and
//! renders backend-specific DDL. The default dialect targets the common
//! lower-case backends; the Oracle dialect upper-cases and truncates to
//! the 30-character identifier cap and uses Oracle sequence DDL.
//!
//! Rendered predicate text is diagnostic output (EXPLAIN-style); the
//! in-process scan evaluates the same filters natively.

mod errors;

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::store::{AttributeFilter, FilterOp, Value};

pub use errors::{DialectError, DialectErrorCode, DialectResult};

/// Logical identifiers: leading letter, then letters, digits, underscores.
fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[A-Za-z][A-Za-z0-9_]*$").expect("valid pattern"))
}

fn validate(identifier: &str) -> DialectResult<()> {
    if identifier_pattern().is_match(identifier) {
        Ok(())
    } else {
        Err(DialectError::invalid_identifier(identifier))
    }
}

/// Mangling and DDL for one SQL backend.
pub trait SqlDialect: fmt::Debug + Send + Sync {
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Physical table name for a type.
    fn table_name(&self, type_name: &str) -> DialectResult<String>;

    /// Physical column name for an attribute column.
    fn column_name(&self, column: &str) -> DialectResult<String>;

    /// Physical name for a named sequence.
    fn sequence_name(&self, sequence: &str) -> DialectResult<String>;

    /// Backend-specific DDL creating a sequence at a start value.
    fn create_sequence_ddl(&self, sequence: &str, start: i64) -> DialectResult<String>;

    /// Renders a pushed filter as SQL text against a type's table.
    fn render_filter(&self, type_name: &str, filter: &AttributeFilter) -> DialectResult<String> {
        let table = self.table_name(type_name)?;
        let column = self.column_name(&filter.attribute)?;
        let qualified = format!("\"{}\".\"{}\"", table, column);

        // Null needs IS [NOT] NULL; only equality shapes make sense.
        if filter.value.is_null() {
            return match filter.op {
                FilterOp::Eq => Ok(format!("{} IS NULL", qualified)),
                FilterOp::Ne => Ok(format!("{} IS NOT NULL", qualified)),
                _ => Err(DialectError::unsupported("ordering comparison with null")),
            };
        }

        let literal = render_literal(&filter.value)?;
        Ok(format!(
            "{} {} {}",
            qualified,
            filter.op.sql_symbol(),
            literal
        ))
    }
}

/// Renders a literal value as SQL text.
fn render_literal(value: &Value) -> DialectResult<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Str(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
        Value::Int(i) => Ok(i.to_string()),
        Value::Bool(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Ref(_) => Err(DialectError::unsupported("reference literal")),
    }
}

/// The common lower-case backend dialect.
#[derive(Debug, Default)]
pub struct DefaultDialect;

impl DefaultDialect {
    const MAX_IDENTIFIER: usize = 63;

    fn mangle(prefix: &str, identifier: &str) -> DialectResult<String> {
        validate(identifier)?;
        let mut name = format!("{}{}", prefix, identifier.to_lowercase());
        name.truncate(Self::MAX_IDENTIFIER);
        Ok(name)
    }
}

impl SqlDialect for DefaultDialect {
    fn name(&self) -> &'static str {
        "default"
    }

    fn table_name(&self, type_name: &str) -> DialectResult<String> {
        Self::mangle("t_", type_name)
    }

    fn column_name(&self, column: &str) -> DialectResult<String> {
        Self::mangle("c_", column)
    }

    fn sequence_name(&self, sequence: &str) -> DialectResult<String> {
        Self::mangle("s_", sequence)
    }

    fn create_sequence_ddl(&self, sequence: &str, start: i64) -> DialectResult<String> {
        let name = self.sequence_name(sequence)?;
        Ok(format!("CREATE SEQUENCE \"{}\" START {}", name, start))
    }
}

/// Oracle: upper-case identifiers, 30-character cap, Oracle sequence DDL.
#[derive(Debug, Default)]
pub struct OracleDialect;

impl OracleDialect {
    const MAX_IDENTIFIER: usize = 30;

    fn mangle(prefix: &str, identifier: &str) -> DialectResult<String> {
        validate(identifier)?;
        let mut name = format!("{}{}", prefix, identifier.to_uppercase());
        name.truncate(Self::MAX_IDENTIFIER);
        Ok(name)
    }
}

impl SqlDialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn table_name(&self, type_name: &str) -> DialectResult<String> {
        Self::mangle("T_", type_name)
    }

    fn column_name(&self, column: &str) -> DialectResult<String> {
        Self::mangle("C_", column)
    }

    fn sequence_name(&self, sequence: &str) -> DialectResult<String> {
        Self::mangle("S_", sequence)
    }

    fn create_sequence_ddl(&self, sequence: &str, start: i64) -> DialectResult<String> {
        let name = self.sequence_name(sequence)?;
        Ok(format!(
            "CREATE SEQUENCE \"{}\" START WITH {} INCREMENT BY 1 NOCACHE",
            name, start
        ))
    }
}
