//! Errors raised while loading schema definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a [`SchemaRegistry`](crate::SchemaRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to read a definition file
    #[error("failed to read schema file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to list a definition directory
    #[error("failed to read schema directory '{path}': {source}")]
    ReadDir {
        /// Path of the directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Definition text is not valid TOML for the definition format
    #[error("invalid schema definitions in {origin}: {source}")]
    Toml {
        /// Where the text came from (file path or built-in name).
        origin: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A definition parsed but is inconsistent
    #[error("invalid definition '{item}' in {origin}: {reason}")]
    InvalidDefinition {
        /// Where the text came from.
        origin: String,
        /// Section, effect, or table the problem is in.
        item: String,
        /// What is wrong.
        reason: String,
    },

    /// Two effect schemas share a name
    #[error("effect type '{name}' is defined twice")]
    DuplicateEffect {
        /// The duplicated name.
        name: String,
    },

    /// Two effect-table entries share an index
    #[error("effect table '{group}' assigns index {index} twice")]
    DuplicateTableIndex {
        /// Group of the table.
        group: String,
        /// The duplicated index.
        index: u32,
    },
}

impl RegistryError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RegistryError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a read directory error.
    pub fn read_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RegistryError::ReadDir {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid definition error.
    pub fn invalid(origin: &str, item: &str, reason: impl Into<String>) -> Self {
        RegistryError::InvalidDefinition {
            origin: origin.to_string(),
            item: item.to_string(),
            reason: reason.into(),
        }
    }
}
