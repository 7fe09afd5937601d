//! Expression error types
//!
//! Error codes:
//! - REV_META_BOUND (ERROR): double bind of a meta-variable

use std::fmt;

/// Expression error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprErrorCode {
    /// Meta-variable already carries a binding
    RevMetaBound,
}

impl ExprErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ExprErrorCode::RevMetaBound => "REV_META_BOUND",
        }
    }
}

impl fmt::Display for ExprErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Expression error with context
#[derive(Debug)]
pub struct ExprError {
    /// Error code
    code: ExprErrorCode,
    /// Human-readable message
    message: String,
}

impl ExprError {
    /// Create a double-bind error
    pub fn meta_bound(name: impl Into<String>) -> Self {
        Self {
            code: ExprErrorCode::RevMetaBound,
            message: format!(
                "Meta-variable '{}' is already bound for this compilation pass",
                name.into()
            ),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> ExprErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ExprError {}

/// Result type for expression operations
pub type ExprResult<T> = Result<T, ExprError>;
