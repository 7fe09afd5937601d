//! Pool error types
//!
//! Error codes:
//! - REV_POOL_EXHAUSTED (ERROR)
//! - REV_CONNECTION_CLOSED (ERROR)
//!
//! Double-close is not an error: `close` is idempotent. Only use of a
//! connection after close surfaces here.

use std::fmt;

/// Pool error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolErrorCode {
    /// No connection available at checkout
    RevPoolExhausted,
    /// Connection used after close
    RevConnectionClosed,
}

impl PoolErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PoolErrorCode::RevPoolExhausted => "REV_POOL_EXHAUSTED",
            PoolErrorCode::RevConnectionClosed => "REV_CONNECTION_CLOSED",
        }
    }
}

impl fmt::Display for PoolErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Pool error with context
#[derive(Debug)]
pub struct PoolError {
    /// Error code
    code: PoolErrorCode,
    /// Human-readable message
    message: String,
}

impl PoolError {
    /// Create a pool exhausted error
    pub fn exhausted(capacity: usize) -> Self {
        Self {
            code: PoolErrorCode::RevPoolExhausted,
            message: format!("All {} pooled connections are borrowed", capacity),
        }
    }

    /// Create a use-after-close error
    pub fn closed() -> Self {
        Self {
            code: PoolErrorCode::RevConnectionClosed,
            message: "Connection was already closed".to_string(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PoolErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for PoolError {}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;
