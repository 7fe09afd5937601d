//! Meta-model error types
//!
//! Error codes:
//! - REV_DUPLICATE_TYPE (FATAL)
//! - REV_DUPLICATE_ATTRIBUTE (FATAL)
//! - REV_TYPE_FROZEN (FATAL)
//! - REV_TYPE_NOT_FROZEN (FATAL)
//! - REV_MALFORMED_SCHEMA (FATAL)
//! - REV_UNKNOWN_TYPE (REJECT)
//! - REV_NO_SUCH_ATTRIBUTE (REJECT)
//! - REV_INCOMPATIBLE_TYPE (REJECT)
//!
//! Schema-definition failures are fatal: they abort bootstrap and are never
//! retried. Lookup and value-kind failures are rejections; they can also
//! surface later from the compiler or a transaction write path.

use std::fmt;

/// Severity levels for meta-model errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller request rejected
    Reject,
    /// Bootstrap must abort
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Meta-model error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaErrorCode {
    /// Type name already registered
    RevDuplicateType,
    /// Attribute name already present on the type
    RevDuplicateAttribute,
    /// Mutation attempted after freeze
    RevTypeFrozen,
    /// Registration attempted before freeze
    RevTypeNotFrozen,
    /// Schema file unreadable or invalid
    RevMalformedSchema,
    /// Type name not registered
    RevUnknownType,
    /// Attribute name not declared on the type
    RevNoSuchAttribute,
    /// Value kind does not match the attribute kind
    RevIncompatibleType,
}

impl MetaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            MetaErrorCode::RevDuplicateType => "REV_DUPLICATE_TYPE",
            MetaErrorCode::RevDuplicateAttribute => "REV_DUPLICATE_ATTRIBUTE",
            MetaErrorCode::RevTypeFrozen => "REV_TYPE_FROZEN",
            MetaErrorCode::RevTypeNotFrozen => "REV_TYPE_NOT_FROZEN",
            MetaErrorCode::RevMalformedSchema => "REV_MALFORMED_SCHEMA",
            MetaErrorCode::RevUnknownType => "REV_UNKNOWN_TYPE",
            MetaErrorCode::RevNoSuchAttribute => "REV_NO_SUCH_ATTRIBUTE",
            MetaErrorCode::RevIncompatibleType => "REV_INCOMPATIBLE_TYPE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            MetaErrorCode::RevUnknownType
            | MetaErrorCode::RevNoSuchAttribute
            | MetaErrorCode::RevIncompatibleType => Severity::Reject,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for MetaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Meta-model error with full context
#[derive(Debug)]
pub struct MetaError {
    /// Error code
    code: MetaErrorCode,
    /// Human-readable message
    message: String,
    /// Type name if applicable
    type_name: Option<String>,
    /// Attribute name if applicable
    attribute: Option<String>,
}

impl MetaError {
    /// Create a duplicate type error
    pub fn duplicate_type(type_name: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: MetaErrorCode::RevDuplicateType,
            message: format!("Type '{}' is already defined", name),
            type_name: Some(name),
            attribute: None,
        }
    }

    /// Create a duplicate attribute error
    pub fn duplicate_attribute(
        type_name: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        let ty = type_name.into();
        let attr = attribute.into();
        Self {
            code: MetaErrorCode::RevDuplicateAttribute,
            message: format!("Type '{}' already declares attribute '{}'", ty, attr),
            type_name: Some(ty),
            attribute: Some(attr),
        }
    }

    /// Create a frozen type error
    pub fn type_frozen(type_name: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: MetaErrorCode::RevTypeFrozen,
            message: format!("Type '{}' is frozen and cannot be modified", name),
            type_name: Some(name),
            attribute: None,
        }
    }

    /// Create a not-frozen registration error
    pub fn type_not_frozen(type_name: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: MetaErrorCode::RevTypeNotFrozen,
            message: format!("Type '{}' must be frozen before registration", name),
            type_name: Some(name),
            attribute: None,
        }
    }

    /// Create a malformed schema error
    pub fn malformed_schema(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: MetaErrorCode::RevMalformedSchema,
            message: format!("Malformed schema '{}': {}", source.into(), reason.into()),
            type_name: None,
            attribute: None,
        }
    }

    /// Create an unknown type error
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        let name = type_name.into();
        Self {
            code: MetaErrorCode::RevUnknownType,
            message: format!("Type '{}' is not defined", name),
            type_name: Some(name),
            attribute: None,
        }
    }

    /// Create a no-such-attribute error
    pub fn no_such_attribute(
        type_name: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        let ty = type_name.into();
        let attr = attribute.into();
        Self {
            code: MetaErrorCode::RevNoSuchAttribute,
            message: format!("Type '{}' has no attribute '{}'", ty, attr),
            type_name: Some(ty),
            attribute: Some(attr),
        }
    }

    /// Create an incompatible type error
    pub fn incompatible_type(
        type_name: impl Into<String>,
        attribute: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let ty = type_name.into();
        let attr = attribute.into();
        Self {
            code: MetaErrorCode::RevIncompatibleType,
            message: format!(
                "Attribute '{}.{}' expects {}, got {}",
                ty,
                attr,
                expected.into(),
                actual.into()
            ),
            type_name: Some(ty),
            attribute: Some(attr),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> MetaErrorCode {
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

    /// Returns the type name if applicable
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Returns the attribute name if applicable
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for MetaError {
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

impl std::error::Error for MetaError {}

/// Result type for meta-model operations
pub type MetaResult<T> = Result<T, MetaError>;
