//! Schema loader for reading type definitions from disk at startup
//!
//! One JSON file per type. Missing directories are tolerated (nothing to
//! load); malformed files are fatal and abort bootstrap. Loaded types are
//! frozen before registration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::attribute::{AttributeKind, MoAttribute};
use super::errors::{MetaError, MetaResult};
use super::index::MoIndex;
use super::object::MetaObject;
use super::registry::TypeRegistry;

/// On-disk attribute definition
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AttributeDef {
    name: String,
    #[serde(flatten)]
    kind: AttributeKind,
    #[serde(default)]
    mandatory: bool,
}

/// On-disk index definition
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexDef {
    name: String,
    attributes: Vec<String>,
    #[serde(default)]
    unique: bool,
}

/// On-disk type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TypeDef {
    name: String,
    attributes: Vec<AttributeDef>,
    #[serde(default)]
    indexes: Vec<IndexDef>,
}

/// Loads type definition files into a registry.
pub struct SchemaLoader {
    /// Directory containing type definition files
    schema_dir: PathBuf,
}

impl SchemaLoader {
    /// Creates a loader rooted at the given schema directory.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `.json` file in the schema directory into the registry.
    ///
    /// A missing directory loads nothing. Malformed files are fatal.
    pub fn load_all(&self, registry: &mut TypeRegistry) -> MetaResult<usize> {
        if !self.schema_dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            MetaError::malformed_schema(
                self.schema_dir.display().to_string(),
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut loaded = 0;
        for entry in entries {
            let entry = entry.map_err(|e| {
                MetaError::malformed_schema(
                    self.schema_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            self.load_file(&path, registry)?;
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Loads a single type definition file.
    fn load_file(&self, path: &Path, registry: &mut TypeRegistry) -> MetaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            MetaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        let def: TypeDef = serde_json::from_str(&content).map_err(|e| {
            MetaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        let mut ty = MetaObject::new(&def.name);
        for attr in def.attributes {
            ty.add_attribute(MoAttribute::new(attr.name, attr.kind, attr.mandatory))?;
        }
        for index in def.indexes {
            let idx = if index.unique {
                MoIndex::unique(index.name, index.attributes)
            } else {
                MoIndex::new(index.name, index.attributes)
            };
            ty.add_index(idx)?;
        }
        ty.freeze();

        registry.define(ty)?;
        Ok(())
    }
}
