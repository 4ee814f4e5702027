//! Engine configuration
//!
//! Loaded once by the host (the CLI reads it from a JSON file) and passed to
//! [`crate::operations::Engine::new`]. Every field has a default, so an empty JSON object
//! is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which persistence API package family generated annotations are imported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceNamespace {
    #[default]
    Jakarta,
    Javax,
}

impl PersistenceNamespace {
    /// Package holding `@Entity`, `@Id`, `@Column`, ...
    pub fn persistence_package(&self) -> &'static str {
        match self {
            PersistenceNamespace::Jakarta => "jakarta.persistence",
            PersistenceNamespace::Javax => "javax.persistence",
        }
    }

    /// Package holding `@NotNull`, `@Size`, ...
    pub fn validation_package(&self) -> &'static str {
        match self {
            PersistenceNamespace::Jakarta => "jakarta.validation.constraints",
            PersistenceNamespace::Javax => "javax.validation.constraints",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub namespace: PersistenceNamespace,
    /// Emit bean-validation annotations next to the persistence mapping.
    pub validation_annotations: bool,
    /// Member indentation. `None` detects it from the file, falling back to four spaces.
    pub indent: Option<String>,
    /// Number of parse trees kept in the content-addressed cache. 0 disables caching.
    pub parse_cache_capacity: usize,
    /// Whether `CreateType` marks new classes with `@Entity` unless told otherwise.
    pub entity_by_default: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            namespace: PersistenceNamespace::Jakarta,
            validation_annotations: true,
            indent: None,
            parse_cache_capacity: 64,
            entity_by_default: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Indentation used when the target file gives no hint.
    pub fn fallback_indent(&self) -> &str {
        self.indent.as_deref().unwrap_or("    ")
    }
}
