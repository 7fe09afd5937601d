//! Store startup
//!
//! Builds a ready-to-use store from configuration: loads the type
//! definitions, creates the knowledge base, the connection pool and the
//! sequence manager. Schema failures abort startup; they are fatal and
//! never retried.

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::meta::{MetaResult, SchemaLoader, TypeRegistry};
use crate::pool::ConnectionPool;
use crate::sequence::SequenceManager;
use crate::store::KnowledgeBase;

/// The handles one store instance hands to its callers.
#[derive(Debug)]
pub struct StoreHandles {
    /// The store itself
    pub kb: Arc<KnowledgeBase>,
    /// Read connections
    pub pool: ConnectionPool,
    /// Named identifier allocation
    pub sequences: SequenceManager,
}

/// Opens a store from configuration.
///
/// With a schema directory configured, every type definition file is
/// loaded and frozen before the store accepts work.
pub fn open(config: &StoreConfig) -> MetaResult<StoreHandles> {
    let mut registry = TypeRegistry::new();
    if let Some(schema_dir) = &config.schema_dir {
        SchemaLoader::new(schema_dir).load_all(&mut registry)?;
    }

    let kb = KnowledgeBase::new(registry);
    Ok(StoreHandles {
        pool: ConnectionPool::new(kb.clone(), config.pool_capacity),
        sequences: SequenceManager::with_start(config.sequence_start),
        kb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MetaErrorCode;
    use std::fs;

    #[test]
    fn test_open_with_defaults() {
        let handles = open(&StoreConfig::default()).unwrap();
        assert!(handles.kb.registry().is_empty());
        assert_eq!(handles.pool.capacity(), crate::config::DEFAULT_POOL_CAPACITY);
    }

    #[test]
    fn test_open_loads_schema_directory() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("person.json"),
            r#"{
                "name": "Person",
                "attributes": [{"name": "name", "kind": "str", "mandatory": true}]
            }"#,
        )
        .unwrap();

        let config = StoreConfig {
            pool_capacity: 2,
            schema_dir: Some(tmp.path().to_path_buf()),
            sequence_start: 10,
        };

        let handles = open(&config).unwrap();
        assert!(handles.kb.registry().contains("Person"));
        assert_eq!(handles.pool.capacity(), 2);

        let mut session = crate::store::Session::new(handles.kb.clone());
        session.begin(crate::store::Branch::TRUNK).unwrap();
        assert_eq!(
            handles
                .sequences
                .next_value(session.transaction(), "tickets")
                .unwrap(),
            10
        );
    }

    #[test]
    fn test_malformed_schema_aborts_startup() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("broken.json"), "{ nope").unwrap();

        let config = StoreConfig {
            schema_dir: Some(tmp.path().to_path_buf()),
            ..StoreConfig::default()
        };

        let err = open(&config).unwrap_err();
        assert_eq!(err.code(), MetaErrorCode::RevMalformedSchema);
        assert!(err.is_fatal());
    }
}
