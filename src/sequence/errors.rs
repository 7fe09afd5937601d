//! Sequence error types
//!
//! Error codes:
//! - REV_NO_TRANSACTION (ERROR): allocation outside a transaction, a
//!   dedicated condition distinct from backend failures
//! - REV_SEQUENCE_FAILED (ERROR): backend failure with the sequence and
//!   operation in the message

use std::fmt;

/// Sequence error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceErrorCode {
    /// Allocation attempted with no active transaction
    RevNoTransaction,
    /// Backend failure during a sequence operation
    RevSequenceFailed,
}

impl SequenceErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SequenceErrorCode::RevNoTransaction => "REV_NO_TRANSACTION",
            SequenceErrorCode::RevSequenceFailed => "REV_SEQUENCE_FAILED",
        }
    }
}

impl fmt::Display for SequenceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Sequence error with context
#[derive(Debug)]
pub struct SequenceError {
    /// Error code
    code: SequenceErrorCode,
    /// Human-readable message
    message: String,
    /// Sequence name if applicable
    sequence: Option<String>,
}

impl SequenceError {
    /// Create a no-transaction error
    pub fn no_transaction(sequence: impl Into<String>) -> Self {
        let name = sequence.into();
        Self {
            code: SequenceErrorCode::RevNoTransaction,
            message: format!(
                "Sequence '{}' allocation requires an active transaction",
                name
            ),
            sequence: Some(name),
        }
    }

    /// Create a failed operation error with context
    pub fn failed(
        sequence: impl Into<String>,
        operation: &str,
        detail: impl Into<String>,
    ) -> Self {
        let name = sequence.into();
        Self {
            code: SequenceErrorCode::RevSequenceFailed,
            message: format!(
                "Sequence '{}' {} failed: {}",
                name,
                operation,
                detail.into()
            ),
            sequence: Some(name),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SequenceErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the sequence name if applicable
    pub fn sequence(&self) -> Option<&str> {
        self.sequence.as_deref()
    }
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SequenceError {}

/// Result type for sequence operations
pub type SequenceResult<T> = Result<T, SequenceError>;
