//! Error types for the zoom reducer.

use std::io;
use std::path::PathBuf;

/// Errors that abort the reduction of one world.
///
/// Failures to delete individual tiles are not errors; they are collected in
/// the [`ReduceReport`](crate::ReduceReport).
#[derive(Debug, thiserror::Error)]
pub enum ReduceError {
    /// The world root does not exist.
    #[error("world root not found: {0}")]
    RootNotFound(PathBuf),

    /// The world root exists but is not a directory.
    #[error("world root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The world root could not be read.
    #[error("cannot read world root {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// More levels were requested for removal than the world has.
    #[error("cannot remove {remove} zoom levels from a world of depth {current}")]
    DepthUnderflow { current: u32, remove: u32 },
}

/// Convenience alias used throughout the reducer crate.
pub type Result<T> = std::result::Result<T, ReduceError>;
