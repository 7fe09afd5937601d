//! Revision diff engine
//!
//! Exact deltas for one type between two `(branch, revision)`
//! coordinates: deleted identities, created objects, and the old/new
//! value of every changed attribute. Comparisons are strictly
//! endpoint-to-endpoint.

mod attributes;
mod deletion;
mod errors;

pub use attributes::{AttributeChange, DiffAttributesQuery, DiffRow};
pub use deletion::DiffDeletionQuery;
pub use errors::{DiffError, DiffErrorCode, DiffResult};
