//! Store configuration
//!
//! Defaults work for embedded use; deployments load a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sequence::DEFAULT_START;

/// Default number of pooled read connections.
pub const DEFAULT_POOL_CAPACITY: usize = 8;

/// Configuration for one store instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of pooled read connections
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,
    /// Directory holding JSON type definitions; `None` skips loading
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,
    /// First value handed out by fresh sequences
    #[serde(default = "default_sequence_start")]
    pub sequence_start: i64,
}

fn default_pool_capacity() -> usize {
    DEFAULT_POOL_CAPACITY
}

fn default_sequence_start() -> i64 {
    DEFAULT_START
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            schema_dir: None,
            sequence_start: DEFAULT_START,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Invalid config '{}': {}", path.display(), e))
    }
}
