//! Zoom reducer for zoomprune.
//!
//! A rendered world is a pyramid of tiles where every zoom level adds one
//! directory of nesting below the world root. Shrinking the pyramid to a
//! smaller depth means deleting every tile nested deeper than that depth.
//!
//! # Key Types
//!
//! - [`ZoomReducer`] -- Walks a world root and deletes stale tiles
//! - [`ReduceOptions`] -- Dry run, empty-directory pruning, level convention
//! - [`ReduceReport`] -- What was removed, kept, or could not be removed
//! - [`ZoomConvention`] -- How a tile path maps to a zoom level
//! - [`TileRemover`] -- Filesystem seam used for deletions

pub mod error;
pub mod level;
pub mod reducer;
pub mod remover;

pub use error::{ReduceError, Result};
pub use level::{target_depth, ZoomConvention};
pub use reducer::{EntryError, ReduceOptions, ReduceReport, ZoomReducer};
pub use remover::{FsRemover, TileRemover};
