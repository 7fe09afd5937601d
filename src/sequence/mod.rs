//! Sequence management
//!
//! Collision-free monotonic allocation of named identifiers under
//! concurrent transactions, plus the one-shot bootstrap utility for
//! migrating legacy serial columns to native sequences.

mod bootstrap;
mod errors;
mod manager;

pub use bootstrap::{bootstrap_ddl, bootstrap_start};
pub use errors::{SequenceError, SequenceErrorCode, SequenceResult};
pub use manager::{SequenceManager, DEFAULT_START};
