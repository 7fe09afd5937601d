//! Meta-model registry
//!
//! The frozen schema vocabulary of the store:
//! - `MetaObject` - a type: attributes plus indexes, terminal after freeze
//! - `MoAttribute` - a logical attribute mapping to physical columns
//! - `MoIndex` - an ordered attribute index
//! - `TypeRegistry` - the set of defined types
//! - `SchemaLoader` - JSON type definitions read at startup
//!
//! All definition-time failures are fatal; they surface at bootstrap and
//! are never retried.

mod attribute;
mod errors;
mod index;
mod loader;
mod object;
mod registry;

pub use attribute::{
    AttributeKind, BranchScope, DbColumn, HistoryType, MoAttribute, ReferenceSpec, SqlType,
    ValueKind,
};
pub use errors::{MetaError, MetaErrorCode, MetaResult, Severity};
pub use index::MoIndex;
pub use loader::SchemaLoader;
pub use object::MetaObject;
pub use registry::TypeRegistry;
