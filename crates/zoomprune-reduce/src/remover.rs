//! The [`TileRemover`] trait: the filesystem operations the reducer mutates
//! through.

use std::fs;
use std::io;
use std::path::Path;

/// Deletes entries from a world's tile tree.
///
/// The reducer decides what to delete; implementations only carry out the
/// deletion and report the raw I/O outcome. A `NotFound` error is read as
/// "already gone".
pub trait TileRemover {
    /// Delete a single non-directory entry.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Delete a directory. Must fail if the directory is not empty.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;
}

/// Removes entries from the real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsRemover;

impl TileRemover for FsRemover {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}
