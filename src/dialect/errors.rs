//! Dialect error types
//!
//! Error codes:
//! - REV_INVALID_IDENTIFIER (ERROR)
//! - REV_UNSUPPORTED_SQL (ERROR)

use std::fmt;

/// Dialect error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectErrorCode {
    /// Logical identifier cannot be mangled to a physical name
    RevInvalidIdentifier,
    /// Construct has no SQL rendering in this dialect
    RevUnsupportedSql,
}

impl DialectErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            DialectErrorCode::RevInvalidIdentifier => "REV_INVALID_IDENTIFIER",
            DialectErrorCode::RevUnsupportedSql => "REV_UNSUPPORTED_SQL",
        }
    }
}

impl fmt::Display for DialectErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Dialect error with context
#[derive(Debug)]
pub struct DialectError {
    /// Error code
    code: DialectErrorCode,
    /// Human-readable message
    message: String,
}

impl DialectError {
    /// Create an invalid identifier error
    pub fn invalid_identifier(identifier: impl Into<String>) -> Self {
        Self {
            code: DialectErrorCode::RevInvalidIdentifier,
            message: format!("'{}' is not a valid logical identifier", identifier.into()),
        }
    }

    /// Create an unsupported construct error
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self {
            code: DialectErrorCode::RevUnsupportedSql,
            message: format!("No SQL rendering for {}", construct.into()),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> DialectErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DialectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for DialectError {}

/// Result type for dialect operations
pub type DialectResult<T> = Result<T, DialectError>;
