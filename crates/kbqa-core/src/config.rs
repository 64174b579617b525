//! KBQA Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with defaults matching the Wikidata answer parser setup.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Answer parser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Number of top-scoring relations tried per question
    pub top_k: usize,

    /// Relation identifiers, position-aligned with classifier scores
    pub relation_vocabulary: Vec<String>,

    /// Serialized entity id -> record table
    pub entity_names_path: PathBuf,

    /// Serialized relation id -> description table.
    /// Relative paths resolve against the entity table's directory.
    pub relation_descriptions_path: Option<PathBuf>,

    /// Log the ranked relations of every question
    pub debug: bool,

    /// Leading marker of knowledge-base entity identifiers
    pub entity_prefix: String,

    /// What to do with date-shaped objects that are not real dates
    pub malformed_dates: MalformedDatePolicy,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            relation_vocabulary: Vec::new(),
            entity_names_path: PathBuf::from("~/.kbqa/wikidata/q_to_name.json"),
            relation_descriptions_path: None,
            debug: false,
            entity_prefix: "Q".to_string(),
            malformed_dates: MalformedDatePolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ParserConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env()?;
        Ok(self)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(top_k) = std::env::var("KBQA_TOP_K") {
            self.top_k = top_k.parse().map_err(|_| ConfigError::InvalidValue {
                key: "KBQA_TOP_K".to_string(),
                value: top_k,
            })?;
        }

        // Comma-separated, order preserved
        if let Ok(vocabulary) = std::env::var("KBQA_RELATION_VOCABULARY") {
            self.relation_vocabulary = vocabulary
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(path) = std::env::var("KBQA_ENTITY_NAMES_PATH") {
            self.entity_names_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("KBQA_RELATION_DESCRIPTIONS_PATH") {
            self.relation_descriptions_path = Some(PathBuf::from(path));
        }

        if let Ok(debug) = std::env::var("KBQA_DEBUG") {
            self.debug = parse_bool(&debug).ok_or(ConfigError::InvalidValue {
                key: "KBQA_DEBUG".to_string(),
                value: debug,
            })?;
        }

        if let Ok(prefix) = std::env::var("KBQA_ENTITY_PREFIX") {
            self.entity_prefix = prefix;
        }

        if let Ok(policy) = std::env::var("KBQA_MALFORMED_DATES") {
            self.malformed_dates = policy.parse()?;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Check the settings the ranker and resolver rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: "top_k".to_string(),
                value: "0".to_string(),
            });
        }
        if self.relation_vocabulary.is_empty() {
            return Err(ConfigError::MissingRequired(
                "relation_vocabulary".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self
            .relation_vocabulary
            .iter()
            .find(|r| !seen.insert(r.as_str()))
        {
            return Err(ConfigError::InvalidValue {
                key: "relation_vocabulary".to_string(),
                value: format!("duplicate relation {dup}"),
            });
        }

        if self.entity_prefix.is_empty() {
            return Err(ConfigError::MissingRequired("entity_prefix".to_string()));
        }

        Ok(())
    }

    /// Entity table location with `~` expanded
    pub fn resolved_entity_names_path(&self) -> PathBuf {
        expand_home(&self.entity_names_path)
    }

    /// Relation description table location, next to the entity table when relative
    pub fn resolved_relation_descriptions_path(&self) -> Option<PathBuf> {
        let path = expand_home(self.relation_descriptions_path.as_ref()?);
        if path.is_absolute() {
            return Some(path);
        }

        let entity_path = self.resolved_entity_names_path();
        Some(match entity_path.parent() {
            Some(dir) => dir.join(path),
            None => path,
        })
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Handling of objects shaped like dates that fail to parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedDatePolicy {
    /// Abort the batch with a malformed date error
    #[default]
    Fail,
    /// Answer "Not Found" for that question and continue
    NotFound,
}

impl std::str::FromStr for MalformedDatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail" => Ok(Self::Fail),
            "not_found" => Ok(Self::NotFound),
            _ => Err(ConfigError::InvalidValue {
                key: "KBQA_MALFORMED_DATES".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
