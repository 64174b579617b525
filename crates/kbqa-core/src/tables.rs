//! Lookup tables
//!
//! Read-only tables produced by the knowledge-base extraction step:
//! entity id -> record (with at least a display name), and the optional
//! relation id -> description table used for diagnostics. Tables are
//! loaded once and shared behind `Arc` by every resolution call.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{KbqaError, ParserConfig, Result};

/// Record stored for a knowledge-base entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Display name
    pub name: String,

    /// Any other fields of the serialized record
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EntityRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Entity id -> record table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityNameTable {
    entries: HashMap<String, EntityRecord>,
}

impl EntityNameTable {
    /// Load a JSON object keyed by entity id
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let entries = read_json_map(path.as_ref())?;
        Ok(Self { entries })
    }

    /// Display name of an entity
    pub fn name(&self, entity_id: &str) -> Option<&str> {
        self.entries.get(entity_id).map(|r| r.name.as_str())
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityRecord> {
        self.entries.get(entity_id)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.entries.contains_key(entity_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, EntityRecord)> for EntityNameTable {
    fn from_iter<I: IntoIterator<Item = (K, EntityRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Relation id -> human-readable description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationDescriptionTable {
    entries: HashMap<String, String>,
}

impl RelationDescriptionTable {
    /// Load a JSON object keyed by relation id
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let entries = read_json_map(path.as_ref())?;
        Ok(Self { entries })
    }

    /// Description of a relation, or the identifier itself when unknown
    pub fn describe<'a>(&'a self, relation: &'a str) -> &'a str {
        self.entries
            .get(relation)
            .map(String::as_str)
            .unwrap_or(relation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RelationDescriptionTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The process-wide lookup tables, cheap to clone and share across workers
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entity_names: Arc<EntityNameTable>,
    relation_descriptions: Option<Arc<RelationDescriptionTable>>,
}

impl KnowledgeBase {
    pub fn new(
        entity_names: Arc<EntityNameTable>,
        relation_descriptions: Option<Arc<RelationDescriptionTable>>,
    ) -> Self {
        Self {
            entity_names,
            relation_descriptions,
        }
    }

    /// Load both tables from the locations named in the configuration
    pub fn load(config: &ParserConfig) -> Result<Self> {
        let entity_path = config.resolved_entity_names_path();
        let entity_names = EntityNameTable::from_path(&entity_path)?;
        tracing::info!(
            "Loaded {} entity names from {}",
            entity_names.len(),
            entity_path.display()
        );

        let relation_descriptions = match config.resolved_relation_descriptions_path() {
            Some(path) => {
                let table = RelationDescriptionTable::from_path(&path)?;
                tracing::info!(
                    "Loaded {} relation descriptions from {}",
                    table.len(),
                    path.display()
                );
                Some(Arc::new(table))
            }
            None => None,
        };

        Ok(Self::new(Arc::new(entity_names), relation_descriptions))
    }

    pub fn entity_names(&self) -> &EntityNameTable {
        &self.entity_names
    }

    pub fn relation_descriptions(&self) -> Option<&RelationDescriptionTable> {
        self.relation_descriptions.as_deref()
    }
}

/// Read a JSON object into a map; the file handle is closed on return
fn read_json_map<T: DeserializeOwned>(path: &Path) -> Result<HashMap<String, T>> {
    let file = File::open(path).map_err(|e| KbqaError::TableLoad {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| KbqaError::TableFormat {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
