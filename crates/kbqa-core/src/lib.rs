//! KBQA Core - Domain models, lookup tables and shared types
//!
//! This crate defines the core abstractions used by the answer parser:
//! - Triplets retrieved around a recognized entity, grouped per candidate entity
//! - Ranked relation lists produced from classifier scores
//! - Common error types
//! - Read-only lookup tables (entity names, relation descriptions)
//! - Configuration management and logging setup

pub mod config;
pub mod logging;
pub mod tables;

pub use config::{ConfigError, LoggingConfig, MalformedDatePolicy, ParserConfig};
pub use tables::{EntityNameTable, EntityRecord, KnowledgeBase, RelationDescriptionTable};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Display text used whenever no answer can be produced
pub const NOT_FOUND: &str = "Not Found";

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for KBQA operations
#[derive(Error, Debug)]
pub enum KbqaError {
    /// Integration mistake upstream (vocabulary/score mismatch, bad top-k, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Object looks like a date but is not a valid calendar date
    #[error("Malformed date {value:?}: {reason}")]
    MalformedDate { value: String, reason: String },

    /// Failure attributed to one question of a batch
    #[error("Question {index}: {source}")]
    Question {
        index: usize,
        #[source]
        source: Box<KbqaError>,
    },

    #[error("Failed to read lookup table {path}: {source}")]
    TableLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid lookup table {path}: {message}")]
    TableFormat { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KbqaError {
    /// Attach the batch position of the question that produced this error
    pub fn in_question(self, index: usize) -> Self {
        Self::Question {
            index,
            source: Box::new(self),
        }
    }

    /// Whether this error (or the error it wraps) is a malformed date
    pub fn is_malformed_date(&self) -> bool {
        match self {
            Self::MalformedDate { .. } => true,
            Self::Question { source, .. } => source.is_malformed_date(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, KbqaError>;

// ============================================================================
// Triplets
// ============================================================================

/// A (relation, object) pair anchored to the entity it was retrieved around
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TripletRepr")]
pub struct Triplet {
    /// Relation identifier (e.g., "P19")
    pub relation: String,

    /// Opaque object: entity id, date literal or other literal
    pub object: String,
}

impl Triplet {
    /// Create a new triplet
    pub fn new(relation: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            object: object.into(),
        }
    }
}

/// Accepted wire shapes for a triplet
#[derive(Deserialize)]
#[serde(untagged)]
enum TripletRepr {
    /// `["P19", "Q5"]` as emitted by the triplet retriever
    Pair(Vec<String>),
    /// `{"relation": "P19", "object": "Q5"}`
    Record { relation: String, object: String },
}

impl TryFrom<TripletRepr> for Triplet {
    type Error = String;

    fn try_from(repr: TripletRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            TripletRepr::Record { relation, object } => Ok(Self { relation, object }),
            TripletRepr::Pair(items) => {
                let mut items = items.into_iter();
                match (items.next(), items.next()) {
                    (Some(relation), Some(object)) => Ok(Self { relation, object }),
                    _ => Err("triplet needs at least a relation and an object".to_string()),
                }
            }
        }
    }
}

/// All candidate triplets of one question, grouped per candidate entity.
///
/// Order is significant: earlier entities, and earlier triplets within an
/// entity, win when several triplets carry the same relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripletGroup(Vec<Vec<Triplet>>);

impl TripletGroup {
    /// Create a group from per-entity triplet lists
    pub fn new(entities: Vec<Vec<Triplet>>) -> Self {
        Self(entities)
    }

    /// Per-entity triplet lists in retrieval order
    pub fn entities(&self) -> &[Vec<Triplet>] {
        &self.0
    }

    /// All triplets flattened in priority order (entity order, then triplet order)
    pub fn iter(&self) -> impl Iterator<Item = &Triplet> {
        self.0.iter().flatten()
    }

    /// Total number of triplets across all entities
    pub fn triplet_count(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// True when no entity contributes any triplet
    pub fn is_empty(&self) -> bool {
        self.triplet_count() == 0
    }
}

impl From<Vec<Vec<Triplet>>> for TripletGroup {
    fn from(entities: Vec<Vec<Triplet>>) -> Self {
        Self(entities)
    }
}

// ============================================================================
// Ranked Relations
// ============================================================================

/// Relation identifiers ordered from most to least confident.
///
/// Never contains the same identifier twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RankedRelations(Vec<String>);

impl RankedRelations {
    /// Create from relations in rank order; later duplicates are dropped
    pub fn new<I, S>(relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        Self(
            relations
                .into_iter()
                .map(Into::into)
                .filter(|r| seen.insert(r.clone()))
                .collect(),
        )
    }

    /// Relations in rank order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Zero-based rank of a relation, if present
    pub fn rank_of(&self, relation: &str) -> Option<usize> {
        self.0.iter().position(|r| r == relation)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for RankedRelations {
    fn from(relations: Vec<String>) -> Self {
        Self::new(relations)
    }
}

impl From<RankedRelations> for Vec<String> {
    fn from(ranked: RankedRelations) -> Self {
        ranked.0
    }
}

// ============================================================================
// Tests
// ============================================================================
