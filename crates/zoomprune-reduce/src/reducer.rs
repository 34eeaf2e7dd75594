//! The zoom reducer: walk a world root and delete tiles deeper than the
//! target depth.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{ReduceError, Result};
use crate::level::{target_depth, ZoomConvention};
use crate::remover::{FsRemover, TileRemover};

/// Settings for a reduction.
#[derive(Clone, Debug, Default)]
pub struct ReduceOptions {
    /// Report what would be removed without deleting anything.
    pub dry_run: bool,
    /// Remove directories below the root that are empty after the walk.
    pub prune_empty_dirs: bool,
    /// How tile paths map to zoom levels.
    pub convention: ZoomConvention,
}

/// An entry the reducer could not handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntryError {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of reducing one world.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ReduceReport {
    pub world_root: PathBuf,
    pub previous_depth: u32,
    pub new_depth: u32,
    /// Tiles deleted, or that would be deleted in a dry run.
    pub removed: Vec<PathBuf>,
    /// Stale tiles that were already gone when their deletion was attempted.
    pub vanished: usize,
    /// Tiles at or above the new depth.
    pub kept: usize,
    /// Stale tiles that could not be deleted.
    pub failures: Vec<EntryError>,
    /// Subtrees that could not be read and were skipped.
    pub skipped: Vec<EntryError>,
    /// Empty directories removed after the walk.
    pub pruned_dirs: usize,
    pub dry_run: bool,
}

impl ReduceReport {
    /// `true` if every stale tile found was dealt with.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }
}

/// Deletes tiles deeper than a target zoom depth.
///
/// All work is sequential; one world is walked and pruned before the call
/// returns.
#[derive(Debug)]
pub struct ZoomReducer<R = FsRemover> {
    options: ReduceOptions,
    remover: R,
}

impl ZoomReducer<FsRemover> {
    /// Create a reducer that deletes from the real filesystem.
    pub fn new(options: ReduceOptions) -> Self {
        Self::with_remover(options, FsRemover)
    }
}

impl<R: TileRemover> ZoomReducer<R> {
    /// Create a reducer that deletes through `remover`.
    pub fn with_remover(options: ReduceOptions, remover: R) -> Self {
        Self { options, remover }
    }

    pub fn options(&self) -> &ReduceOptions {
        &self.options
    }

    /// Remove `remove_count` zoom levels from the world rooted at
    /// `world_root`, which currently has depth `current_depth`.
    ///
    /// Fails without touching the filesystem if the new depth would be
    /// negative or the root cannot be read. Tiles that cannot be deleted are
    /// recorded in the report and do not stop the walk.
    pub fn reduce(
        &self,
        world_root: &Path,
        current_depth: u32,
        remove_count: u32,
    ) -> Result<ReduceReport> {
        self.reduce_world(world_root, world_root, current_depth, remove_count)
    }

    /// Like [`reduce`](Self::reduce), for a world whose configured path
    /// `spelled_root` was resolved to `world_root` on disk. Levels under
    /// [`ZoomConvention::PathSegments`] are counted from `spelled_root`.
    pub fn reduce_world(
        &self,
        world_root: &Path,
        spelled_root: &Path,
        current_depth: u32,
        remove_count: u32,
    ) -> Result<ReduceReport> {
        let new_depth = target_depth(current_depth, remove_count)?;
        check_root(world_root)?;

        info!(
            root = %world_root.display(),
            current_depth,
            new_depth,
            dry_run = self.options.dry_run,
            "reducing world"
        );

        let mut report = ReduceReport {
            world_root: world_root.to_path_buf(),
            previous_depth: current_depth,
            new_depth,
            dry_run: self.options.dry_run,
            ..ReduceReport::default()
        };

        self.remove_stale(world_root, spelled_root, new_depth, &mut report)?;

        if self.options.prune_empty_dirs && !self.options.dry_run {
            report.pruned_dirs = self.prune_empty_dirs(world_root);
        }

        if !report.failures.is_empty() || !report.skipped.is_empty() {
            warn!(
                root = %world_root.display(),
                failures = report.failures.len(),
                skipped = report.skipped.len(),
                "some tiles could not be removed"
            );
        }
        info!(
            root = %world_root.display(),
            removed = report.removed.len(),
            vanished = report.vanished,
            kept = report.kept,
            pruned_dirs = report.pruned_dirs,
            "world reduced"
        );
        Ok(report)
    }

    fn remove_stale(
        &self,
        root: &Path,
        spelled_root: &Path,
        new_depth: u32,
        report: &mut ReduceReport,
    ) -> Result<()> {
        let limit = new_depth as usize;

        for entry in WalkDir::new(root).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    let message = err.to_string();
                    return Err(ReduceError::RootUnreadable {
                        path: root.to_path_buf(),
                        source: err.into_io_error().unwrap_or_else(|| io::Error::other(message)),
                    });
                }
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    report.skipped.push(EntryError {
                        path,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let Some(level) = self.options.convention.level(root, spelled_root, entry.path()) else {
                warn!(path = %entry.path().display(), "entry outside world root; leaving it");
                continue;
            };

            if level <= limit {
                report.kept += 1;
                continue;
            }

            if self.options.dry_run {
                debug!(path = %entry.path().display(), level, "would remove tile");
                report.removed.push(entry.into_path());
                continue;
            }

            match self.remover.remove_file(entry.path()) {
                Ok(()) => {
                    debug!(path = %entry.path().display(), level, "removed tile");
                    report.removed.push(entry.into_path());
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %entry.path().display(), "tile already gone");
                    report.vanished += 1;
                }
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "could not delete tile");
                    report.failures.push(EntryError {
                        path: entry.into_path(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Remove empty directories below `root`, deepest first. The root itself
    /// is never removed.
    fn prune_empty_dirs(&self, root: &Path) -> usize {
        let mut pruned = 0;
        for entry in WalkDir::new(root)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_dir() {
                continue;
            }
            // Fails for non-empty directories, which is what we want.
            if self.remover.remove_dir(entry.path()).is_ok() {
                debug!(path = %entry.path().display(), "removed empty directory");
                pruned += 1;
            }
        }
        pruned
    }
}

fn check_root(root: &Path) -> Result<()> {
    let meta = fs::metadata(root).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ReduceError::RootNotFound(root.to_path_buf())
        } else {
            ReduceError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;

    if !meta.is_dir() {
        return Err(ReduceError::NotADirectory(root.to_path_buf()));
    }

    fs::read_dir(root).map_err(|source| ReduceError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(())
}
