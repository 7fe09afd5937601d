//! Event rewriting errors

use thiserror::Error;

/// Validation failures of a migration pipeline against the target
/// schema.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Rewriter filter names a type the schema does not declare
    #[error("unknown type '{0}' in rewriter filter")]
    UnknownType(String),

    /// Rewriter names an attribute the type does not declare
    #[error("type '{type_name}' has no attribute '{attribute}'")]
    UnknownAttribute {
        type_name: String,
        attribute: String,
    },

    /// Injected value does not fit the attribute
    #[error("attribute '{type_name}.{attribute}' cannot store a {kind} value")]
    IncompatibleValue {
        type_name: String,
        attribute: String,
        kind: &'static str,
    },
}

/// Result type for rewriter validation
pub type RewriteResult<T> = Result<T, RewriteError>;
