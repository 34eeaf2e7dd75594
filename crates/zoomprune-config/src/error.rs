//! Error types for the config store.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, querying or persisting the
/// configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file holds no JSON object after its prefix.
    #[error("no JSON object found in config file {0}")]
    MissingObject(PathBuf),

    /// The JSON object is malformed or lacks a required field.
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two tilesets share the same world path.
    #[error("world path listed more than once: {0}")]
    DuplicateWorld(String),

    /// No tileset has the requested world path.
    #[error("world not found in config: {0}")]
    WorldNotFound(String),

    /// A zoom depth outside `0..=u32::MAX` was requested.
    #[error("invalid zoom depth {0}: must be a non-negative integer")]
    InvalidDepth(i64),

    /// The configuration could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The config file could not be written.
    #[error("could not write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Convenience type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
