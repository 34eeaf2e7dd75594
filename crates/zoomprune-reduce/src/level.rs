//! Mapping tile paths to zoom levels.
//!
//! Tiles are laid out so that each zoom level adds one directory of nesting
//! under the world root:
//!
//! ```text
//! world/base.png        level 1
//! world/0.png           level 1
//! world/0/3.png         level 2
//! world/0/3/1.png       level 3
//! ```
//!
//! A tile's level is therefore the number of path components from the world
//! root down to and including the tile itself. A world of depth `d` holds
//! tiles of levels `1..=d`.

use std::path::Path;

use crate::error::{ReduceError, Result};

/// How a tile path is turned into a zoom level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZoomConvention {
    /// Count the components between the world root and the tile.
    #[default]
    RootRelative,
    /// Count the components of the world path as written in the
    /// configuration, plus the components from the world root to the tile.
    /// A relative world path `world` puts `world/0/1.png` at level 3 no
    /// matter where the configuration lives.
    PathSegments,
}

impl ZoomConvention {
    /// Zoom level of `tile`, a path yielded by walking `root`.
    ///
    /// `spelled_root` is the world path as written in the configuration;
    /// `root` is where it resolved to on disk. Returns `None` when `tile`
    /// does not lie under `root`.
    pub fn level(self, root: &Path, spelled_root: &Path, tile: &Path) -> Option<usize> {
        let depth = tile.strip_prefix(root).ok()?.components().count();
        match self {
            Self::RootRelative => Some(depth),
            Self::PathSegments => Some(spelled_root.components().count() + depth),
        }
    }
}

/// Depth of a world after removing `remove` levels from `current`.
///
/// Removing more levels than the world has is rejected rather than clamped
/// to zero.
pub fn target_depth(current: u32, remove: u32) -> Result<u32> {
    current
        .checked_sub(remove)
        .ok_or(ReduceError::DepthUnderflow { current, remove })
}
