//! Diff error types
//!
//! Error codes:
//! - REV_DIFF_FAILED (ERROR): underlying read failure, wrapped with the
//!   diff operation and type it happened in

use std::fmt;

/// Diff error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffErrorCode {
    /// Read failure during diff computation
    RevDiffFailed,
}

impl DiffErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            DiffErrorCode::RevDiffFailed => "REV_DIFF_FAILED",
        }
    }
}

impl fmt::Display for DiffErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Diff error with operation context
#[derive(Debug)]
pub struct DiffError {
    /// Error code
    code: DiffErrorCode,
    /// Human-readable message naming the operation and type
    message: String,
}

impl DiffError {
    /// Wraps an underlying failure with the diff operation context.
    pub fn failed(operation: &str, type_name: &str, detail: impl fmt::Display) -> Self {
        Self {
            code: DiffErrorCode::RevDiffFailed,
            message: format!("{} on type '{}' failed: {}", operation, type_name, detail),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> DiffErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for DiffError {}

/// Result type for diff operations
pub type DiffResult<T> = Result<T, DiffError>;
