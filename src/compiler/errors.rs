//! Compiler error types
//!
//! Error codes:
//! - REV_UNRESOLVED_VARIABLE (ERROR)
//! - REV_UNBOUND_META (ERROR)
//! - REV_CYCLIC_BINDING (ERROR)
//! - REV_UNKNOWN_TYPE / REV_NO_SUCH_ATTRIBUTE (schema lookups)
//! - REV_INVALID_IDENTIFIER / REV_UNSUPPORTED_SQL (dialect rendering)

use std::fmt;

use crate::dialect::{DialectError, DialectErrorCode};
use crate::meta::{MetaError, MetaErrorCode};

/// Compiler error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorCode {
    /// Free variable without a definition in the call-site scope
    RevUnresolvedVariable,
    /// Meta-variable without a binding at compile time
    RevUnboundMeta,
    /// Meta-variable binding reaches itself
    RevCyclicBinding,
    /// Unknown type at lowering time
    RevUnknownType,
    /// Undeclared attribute in a scan predicate
    RevNoSuchAttribute,
    /// Attribute kind unfit for its use (e.g. navigating a non-reference)
    RevIncompatibleType,
    /// Identifier cannot be mangled by the dialect
    RevInvalidIdentifier,
    /// Construct has no SQL rendering
    RevUnsupportedSql,
}

impl CompileErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorCode::RevUnresolvedVariable => "REV_UNRESOLVED_VARIABLE",
            CompileErrorCode::RevUnboundMeta => "REV_UNBOUND_META",
            CompileErrorCode::RevCyclicBinding => "REV_CYCLIC_BINDING",
            CompileErrorCode::RevUnknownType => "REV_UNKNOWN_TYPE",
            CompileErrorCode::RevNoSuchAttribute => "REV_NO_SUCH_ATTRIBUTE",
            CompileErrorCode::RevIncompatibleType => "REV_INCOMPATIBLE_TYPE",
            CompileErrorCode::RevInvalidIdentifier => "REV_INVALID_IDENTIFIER",
            CompileErrorCode::RevUnsupportedSql => "REV_UNSUPPORTED_SQL",
        }
    }
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Compiler error with context
#[derive(Debug)]
pub struct CompileError {
    /// Error code
    code: CompileErrorCode,
    /// Human-readable message
    message: String,
}

impl CompileError {
    /// Create an unresolved variable error
    pub fn unresolved_variable(name: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::RevUnresolvedVariable,
            message: format!("Variable '{}' has no definition in scope", name.into()),
        }
    }

    /// Create an unbound meta-variable error
    pub fn unbound_meta(name: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::RevUnboundMeta,
            message: format!("Meta-variable '{}' is unbound", name.into()),
        }
    }

    /// Create a cyclic binding error
    pub fn cyclic_binding(name: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::RevCyclicBinding,
            message: format!(
                "Meta-variable '{}' binding reaches itself",
                name.into()
            ),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> CompileErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CompileError {}

impl From<MetaError> for CompileError {
    fn from(err: MetaError) -> Self {
        let code = match err.code() {
            MetaErrorCode::RevNoSuchAttribute => CompileErrorCode::RevNoSuchAttribute,
            MetaErrorCode::RevIncompatibleType => CompileErrorCode::RevIncompatibleType,
            _ => CompileErrorCode::RevUnknownType,
        };
        Self {
            code,
            message: err.message().to_string(),
        }
    }
}

impl From<DialectError> for CompileError {
    fn from(err: DialectError) -> Self {
        let code = match err.code() {
            DialectErrorCode::RevInvalidIdentifier => CompileErrorCode::RevInvalidIdentifier,
            DialectErrorCode::RevUnsupportedSql => CompileErrorCode::RevUnsupportedSql,
        };
        Self {
            code,
            message: err.message().to_string(),
        }
    }
}

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CompileError::unresolved_variable("x").code(),
            CompileErrorCode::RevUnresolvedVariable
        );
        assert_eq!(
            CompileError::unbound_meta("m").code(),
            CompileErrorCode::RevUnboundMeta
        );
    }

    #[test]
    fn test_meta_error_conversion() {
        let err: CompileError = MetaError::unknown_type("Ghost").into();
        assert_eq!(err.code(), CompileErrorCode::RevUnknownType);

        let err: CompileError = MetaError::no_such_attribute("Person", "ghost").into();
        assert_eq!(err.code(), CompileErrorCode::RevNoSuchAttribute);
    }

    #[test]
    fn test_dialect_error_conversion() {
        let err: CompileError = DialectError::invalid_identifier("1x").into();
        assert_eq!(err.code(), CompileErrorCode::RevInvalidIdentifier);
    }
}
