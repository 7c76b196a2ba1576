//! Directory-by-directory traversal that plans pending copies.
//!
//! [`TreeWalker::batches`] visits the source tree in pre-order, one directory
//! at a time, and yields a [`SpecCopyBatch`] per directory. Files whose
//! destination already exists are filtered out here, which is what makes a
//! re-run resume where an interrupted run stopped.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::spec::{SpecCopyBatch, SpecCopyTask, SpecRootPair, WalkError};
use crate::util::{derive_mirrored_path, derive_relative_path};

#[derive(Debug, Clone)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
    name_dir: OsString,
}

#[derive(Debug, Clone)]
struct SpecFileEntry {
    name_file: OsString,
}

/// Source tree walker bound to one [`SpecRootPair`].
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root_pair: SpecRootPair,
}

impl TreeWalker {
    pub fn new(root_pair: SpecRootPair) -> Self {
        Self { root_pair }
    }

    /// Start a fresh traversal of the source root.
    pub fn batches(&self) -> IterCopyBatches<'_> {
        IterCopyBatches {
            root_pair: &self.root_pair,
            l_dirs_pending: vec![(self.root_pair.path_dir_src.clone(), 0)],
        }
    }
}

/// Finite, single-pass sequence of per-directory batches.
///
/// A directory that cannot be listed yields `Err` and the walk moves on to
/// the next pending directory.
#[derive(Debug)]
pub struct IterCopyBatches<'a> {
    root_pair: &'a SpecRootPair,
    /// Stack of `(directory, depth)`; the top is visited next.
    l_dirs_pending: Vec<(PathBuf, usize)>,
}

impl Iterator for IterCopyBatches<'_> {
    type Item = Result<SpecCopyBatch, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (path_dir, n_depth) = self.l_dirs_pending.pop()?;
        Some(self.visit_directory(&path_dir, n_depth))
    }
}

impl IterCopyBatches<'_> {
    fn visit_directory(
        &mut self,
        path_dir: &Path,
        n_depth: usize,
    ) -> Result<SpecCopyBatch, WalkError> {
        let path_dir_rel = derive_relative_path(path_dir, &self.root_pair.path_dir_src);
        debug!(
            "base_path: {}, root: {}, src_root: {}",
            path_dir_rel.display(),
            path_dir.display(),
            self.root_pair.path_dir_src.display()
        );

        let (mut l_dirs, mut l_files) = list_directory(path_dir).map_err(|e| WalkError {
            path: path_dir.to_path_buf(),
            depth: n_depth,
            source: e,
        })?;

        l_dirs.sort_by(|a, b| a.name_dir.cmp(&b.name_dir));
        l_files.sort_by(|a, b| a.name_file.cmp(&b.name_file));

        // Reverse so the smallest name is popped first.
        for spec_dir_entry in l_dirs.into_iter().rev() {
            self.l_dirs_pending
                .push((spec_dir_entry.path_dir_src_sub, n_depth + 1));
        }

        let mut spec_batch = SpecCopyBatch {
            path_dir_rel,
            ..SpecCopyBatch::default()
        };
        for spec_file_entry in l_files {
            spec_batch.cnt_scanned += 1;
            let path_file_src = derive_mirrored_path(
                &self.root_pair.path_dir_src,
                &spec_batch.path_dir_rel,
                &spec_file_entry.name_file,
            );
            let path_file_dst = derive_mirrored_path(
                &self.root_pair.path_dir_dst,
                &spec_batch.path_dir_rel,
                &spec_file_entry.name_file,
            );
            if path_file_dst.exists() {
                info!("already copied {}", path_file_src.display());
                spec_batch.cnt_skipped += 1;
                continue;
            }
            spec_batch.l_tasks_file_copy.push(SpecCopyTask {
                path_file_src,
                path_file_dst,
            });
        }
        Ok(spec_batch)
    }
}

/// Split the entries of `path_dir` into subdirectories to descend into and
/// everything else.
///
/// Symlinks to directories are neither descended into nor copied.
fn list_directory(
    path_dir: &Path,
) -> Result<(Vec<SpecDirEntry>, Vec<SpecFileEntry>), std::io::Error> {
    let mut l_dirs: Vec<SpecDirEntry> = Vec::new();
    let mut l_files: Vec<SpecFileEntry> = Vec::new();

    for _entry_res in fs::read_dir(path_dir)? {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    "Failed to read directory entry under {} ({e})",
                    path_dir.display()
                );
                continue;
            }
        };

        let path_entry = entry.path();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to inspect {} ({e})", path_entry.display());
                continue;
            }
        };

        if cfg_file_type.is_dir() {
            l_dirs.push(SpecDirEntry {
                path_dir_src_sub: path_entry,
                name_dir: entry.file_name(),
            });
        } else if cfg_file_type.is_symlink() && path_entry.is_dir() {
            debug!("not following directory symlink {}", path_entry.display());
        } else {
            l_files.push(SpecFileEntry {
                name_file: entry.file_name(),
            });
        }
    }

    Ok((l_dirs, l_files))
}
