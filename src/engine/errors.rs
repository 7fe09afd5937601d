//! Engine error types
//!
//! Error codes:
//! - REV_ITERATOR_EXHAUSTED (ERROR): `next` on a drained stream
//! - REV_EXECUTION_FAILED (ERROR): store or evaluation failure, with the
//!   failing query part in the message
//! - REV_POOL_EXHAUSTED (ERROR): no connection available at open
//! - REV_NO_TRANSACTION (ERROR): effectful evaluation outside a
//!   transaction

use std::fmt;

use crate::pool::{PoolError, PoolErrorCode};
use crate::sequence::{SequenceError, SequenceErrorCode};
use crate::store::StoreError;

/// Engine error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorCode {
    /// `next` called on an exhausted or closed stream
    RevIteratorExhausted,
    /// Execution failed in the store or during evaluation
    RevExecutionFailed,
    /// Connection checkout failed
    RevPoolExhausted,
    /// Effectful evaluation requires an active transaction
    RevNoTransaction,
}

impl EngineErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            EngineErrorCode::RevIteratorExhausted => "REV_ITERATOR_EXHAUSTED",
            EngineErrorCode::RevExecutionFailed => "REV_EXECUTION_FAILED",
            EngineErrorCode::RevPoolExhausted => "REV_POOL_EXHAUSTED",
            EngineErrorCode::RevNoTransaction => "REV_NO_TRANSACTION",
        }
    }
}

impl fmt::Display for EngineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Engine error with context
#[derive(Debug)]
pub struct EngineError {
    /// Error code
    code: EngineErrorCode,
    /// Human-readable message
    message: String,
}

impl EngineError {
    /// Create an exhausted iterator error
    pub fn exhausted() -> Self {
        Self {
            code: EngineErrorCode::RevIteratorExhausted,
            message: "Stream is exhausted".to_string(),
        }
    }

    /// Create an execution failure with context
    pub fn execution_failed(context: &str, detail: impl Into<String>) -> Self {
        Self {
            code: EngineErrorCode::RevExecutionFailed,
            message: format!("{}: {}", context, detail.into()),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> EngineErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for EngineError {}

impl From<PoolError> for EngineError {
    fn from(err: PoolError) -> Self {
        let code = match err.code() {
            PoolErrorCode::RevPoolExhausted => EngineErrorCode::RevPoolExhausted,
            PoolErrorCode::RevConnectionClosed => EngineErrorCode::RevExecutionFailed,
        };
        Self {
            code,
            message: err.message().to_string(),
        }
    }
}

impl From<crate::meta::MetaError> for EngineError {
    fn from(err: crate::meta::MetaError) -> Self {
        Self {
            code: EngineErrorCode::RevExecutionFailed,
            message: format!("schema: {}", err),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        Self {
            code: EngineErrorCode::RevExecutionFailed,
            message: format!("store: {}", err),
        }
    }
}

impl From<SequenceError> for EngineError {
    fn from(err: SequenceError) -> Self {
        let code = match err.code() {
            SequenceErrorCode::RevNoTransaction => EngineErrorCode::RevNoTransaction,
            SequenceErrorCode::RevSequenceFailed => EngineErrorCode::RevExecutionFailed,
        };
        Self {
            code,
            message: err.message().to_string(),
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
