//! Observability
//!
//! Synchronous structured logging for store, pool and sequence events.

mod logger;

pub use logger::{LogSeverity, Logger};
