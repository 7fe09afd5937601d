//! Store error types
//!
//! Error codes:
//! - REV_UNKNOWN_BRANCH (ERROR)
//! - REV_UNKNOWN_OBJECT (ERROR)
//! - REV_DUPLICATE_OBJECT (ERROR)
//! - REV_DANGLING_REFERENCE (ERROR)
//! - REV_NON_MONOTONIC_REVISION (FATAL)
//! - REV_TRANSACTION_ACTIVE (ERROR)
//! - REV_NO_TRANSACTION (ERROR)
//! - REV_UNKNOWN_TYPE / REV_NO_SUCH_ATTRIBUTE / REV_INCOMPATIBLE_TYPE
//!   (schema violations surfacing on the write path)

use std::fmt;

use crate::meta::{MetaError, MetaErrorCode};

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation failed but the store is healthy
    Error,
    /// The store must not continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Store error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Branch id not known to the store
    RevUnknownBranch,
    /// Object identity not alive at the addressed revision
    RevUnknownObject,
    /// Creation of an identity that is already alive
    RevDuplicateObject,
    /// Reference target missing at the addressed revision
    RevDanglingReference,
    /// Revision assignment went backwards
    RevNonMonotonicRevision,
    /// A second transaction was begun on one session
    RevTransactionActive,
    /// Operation requires an active transaction
    RevNoTransaction,
    /// Unknown type on the write path
    RevUnknownType,
    /// Undeclared attribute on the write path
    RevNoSuchAttribute,
    /// Value kind does not match the attribute
    RevIncompatibleType,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::RevUnknownBranch => "REV_UNKNOWN_BRANCH",
            StoreErrorCode::RevUnknownObject => "REV_UNKNOWN_OBJECT",
            StoreErrorCode::RevDuplicateObject => "REV_DUPLICATE_OBJECT",
            StoreErrorCode::RevDanglingReference => "REV_DANGLING_REFERENCE",
            StoreErrorCode::RevNonMonotonicRevision => "REV_NON_MONOTONIC_REVISION",
            StoreErrorCode::RevTransactionActive => "REV_TRANSACTION_ACTIVE",
            StoreErrorCode::RevNoTransaction => "REV_NO_TRANSACTION",
            StoreErrorCode::RevUnknownType => "REV_UNKNOWN_TYPE",
            StoreErrorCode::RevNoSuchAttribute => "REV_NO_SUCH_ATTRIBUTE",
            StoreErrorCode::RevIncompatibleType => "REV_INCOMPATIBLE_TYPE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::RevNonMonotonicRevision => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with operation context
#[derive(Debug)]
pub struct StoreError {
    /// Error code
    code: StoreErrorCode,
    /// Human-readable message
    message: String,
}

impl StoreError {
    /// Create an unknown branch error
    pub fn unknown_branch(branch_id: u32) -> Self {
        Self {
            code: StoreErrorCode::RevUnknownBranch,
            message: format!("Branch {} does not exist", branch_id),
        }
    }

    /// Create an unknown object error
    pub fn unknown_object(type_name: &str, object_name: &str) -> Self {
        Self {
            code: StoreErrorCode::RevUnknownObject,
            message: format!("Object '{}/{}' is not alive here", type_name, object_name),
        }
    }

    /// Create a duplicate object error
    pub fn duplicate_object(type_name: &str, object_name: &str) -> Self {
        Self {
            code: StoreErrorCode::RevDuplicateObject,
            message: format!("Object '{}/{}' already exists", type_name, object_name),
        }
    }

    /// Create a dangling reference error
    pub fn dangling_reference(type_name: &str, object_name: &str, detail: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::RevDanglingReference,
            message: format!(
                "Reference to '{}/{}' does not resolve: {}",
                type_name,
                object_name,
                detail.into()
            ),
        }
    }

    /// Create a non-monotonic revision error (FATAL)
    pub fn non_monotonic_revision(attempted: i64, highest: i64) -> Self {
        Self {
            code: StoreErrorCode::RevNonMonotonicRevision,
            message: format!(
                "Revision {} is not beyond the highest committed revision {}",
                attempted, highest
            ),
        }
    }

    /// Create a transaction-already-active error
    pub fn transaction_active() -> Self {
        Self {
            code: StoreErrorCode::RevTransactionActive,
            message: "Session already owns an active transaction".to_string(),
        }
    }

    /// Create a no-transaction error
    pub fn no_transaction(operation: &str) -> Self {
        Self {
            code: StoreErrorCode::RevNoTransaction,
            message: format!("Operation '{}' requires an active transaction", operation),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for StoreError {}

impl From<MetaError> for StoreError {
    /// Schema violations surfacing on the write path keep their code.
    fn from(err: MetaError) -> Self {
        let code = match err.code() {
            MetaErrorCode::RevUnknownType => StoreErrorCode::RevUnknownType,
            MetaErrorCode::RevNoSuchAttribute => StoreErrorCode::RevNoSuchAttribute,
            _ => StoreErrorCode::RevIncompatibleType,
        };
        Self {
            code,
            message: err.message().to_string(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
