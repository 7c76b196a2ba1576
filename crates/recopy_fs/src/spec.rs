//! Recovery copy models and error types.

use std::io;
use std::path::{Path, PathBuf};

use crate::util::{absolutize_path, is_destination_inside_source};

////////////////////////////////////////////////////////////////////////////////
// #region StructsInit

/// Absolute source/destination roots fixed for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRootPair {
    /// Absolute, lexically normalized source root.
    pub path_dir_src: PathBuf,
    /// Absolute, lexically normalized destination root.
    pub path_dir_dst: PathBuf,
}

impl SpecRootPair {
    /// Resolve both roots to absolute form.
    ///
    /// Relative inputs are joined onto the current working directory; `.` and
    /// `..` are folded without touching the filesystem.
    pub fn resolve<P, Q>(dir_source: P, dir_destination: Q) -> Result<Self, RecoverTreeError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        Ok(Self {
            path_dir_src: absolutize_path(dir_source.as_ref())?,
            path_dir_dst: absolutize_path(dir_destination.as_ref())?,
        })
    }

    /// Reject roots that can never produce a usable run.
    pub fn validate(&self) -> Result<(), RecoverTreeError> {
        if !self.path_dir_src.is_dir() {
            return Err(RecoverTreeError::SourceNotDirectory(
                self.path_dir_src.clone(),
            ));
        }
        if is_destination_inside_source(&self.path_dir_src, &self.path_dir_dst) {
            return Err(RecoverTreeError::SourceDestinationOverlap {
                path_dir_src: self.path_dir_src.clone(),
                path_dir_dst: self.path_dir_dst.clone(),
            });
        }
        Ok(())
    }
}

/// One file that is not yet present at the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyTask {
    pub path_file_src: PathBuf,
    pub path_file_dst: PathBuf,
}

/// Pending copies for the files directly inside one source directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecCopyBatch {
    /// Directory path relative to the source root (empty for the root).
    pub path_dir_rel: PathBuf,
    /// Non-directory entries seen in this directory.
    pub cnt_scanned: u64,
    /// Entries dropped because the destination already exists.
    pub cnt_skipped: u64,
    pub l_tasks_file_copy: Vec<SpecCopyTask>,
}

impl SpecCopyBatch {
    pub fn is_empty(&self) -> bool {
        self.l_tasks_file_copy.is_empty()
    }

    pub fn len(&self) -> usize {
        self.l_tasks_file_copy.len()
    }
}

/// One failure item with path + error text, as written to the error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source file or source directory.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failure of a single copy task. Always keyed by the source path.
#[derive(Debug, thiserror::Error)]
pub enum CopyTaskError {
    /// Destination parent directory could not be created.
    #[error("{source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Source resolves to a FIFO, socket, device or directory.
    #[error("not a regular file")]
    NotRegularFile { path: PathBuf },
    /// Content or metadata copy failed.
    #[error("{source}")]
    CopyFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CopyTaskError {
    /// Source path the failure is recorded under.
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateDirectory { path, .. }
            | Self::NotRegularFile { path }
            | Self::CopyFile { path, .. } => path,
        }
    }

    pub fn into_spec_error(self) -> SpecCopyError {
        let exception = self.to_string();
        let path = match self {
            Self::CreateDirectory { path, .. }
            | Self::NotRegularFile { path }
            | Self::CopyFile { path, .. } => path,
        };
        SpecCopyError { path, exception }
    }
}

/// A source directory could not be listed.
#[derive(Debug, thiserror::Error)]
#[error("Failed to read directory {} ({source})", path.display())]
pub struct WalkError {
    pub path: PathBuf,
    /// Distance from the source root; `0` is the root itself.
    pub depth: usize,
    #[source]
    pub source: io::Error,
}

/// "Top-level call failed" errors: the run cannot start or cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum RecoverTreeError {
    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),
    #[error("Source root is unreadable: {}", .0.path.display())]
    SourceUnreadable(#[source] WalkError),
    /// Destination lies strictly below the source, so the walk would reach
    /// its own output.
    #[error(
        "Destination directory is inside the source: {} (source {})",
        path_dir_dst.display(),
        path_dir_src.display()
    )]
    SourceDestinationOverlap {
        path_dir_src: PathBuf,
        path_dir_dst: PathBuf,
    },
    /// Relative root given but the working directory is unknown.
    #[error("Failed to resolve current directory for {}: {source}", path.display())]
    CurrentDirUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::{CopyTaskError, RecoverTreeError, SpecRootPair};

    #[test]
    fn copy_task_error_message_is_os_text() {
        let err = CopyTaskError::CopyFile {
            path: PathBuf::from("/src/a.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        };
        assert_eq!(err.path(), PathBuf::from("/src/a.txt"));

        let spec_error = err.into_spec_error();
        assert_eq!(spec_error.path, PathBuf::from("/src/a.txt"));
        assert_eq!(spec_error.exception, "Permission denied");
    }

    #[test]
    fn root_pair_rejects_missing_source() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root_pair = SpecRootPair::resolve(tmp.path().join("absent"), tmp.path().join("dst"))
            .expect("resolve");
        assert!(matches!(
            root_pair.validate(),
            Err(RecoverTreeError::SourceNotDirectory(_))
        ));
    }

    #[test]
    fn root_pair_rejects_nested_destination() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir src");

        let root_pair = SpecRootPair::resolve(&src, src.join("backup")).expect("resolve");
        assert!(matches!(
            root_pair.validate(),
            Err(RecoverTreeError::SourceDestinationOverlap { .. })
        ));
    }

    #[test]
    fn root_pair_accepts_source_nested_in_destination() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_data = tmp.path().join("data");
        std::fs::create_dir_all(path_data.join("photos")).expect("mkdir photos");

        let root_pair =
            SpecRootPair::resolve(path_data.join("photos"), &path_data).expect("resolve");
        root_pair.validate().expect("source below destination is allowed");
    }

    #[test]
    fn root_pair_accepts_identical_roots() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir src");

        let mut src_trailing = src.clone().into_os_string();
        src_trailing.push("/.");
        let root_pair = SpecRootPair::resolve(&src, &src_trailing).expect("resolve");
        root_pair.validate().expect("identical roots are allowed");
    }

    #[test]
    fn not_regular_file_message_omits_path() {
        let err = CopyTaskError::NotRegularFile {
            path: PathBuf::from("/src/sock"),
        };
        assert_eq!(err.path(), PathBuf::from("/src/sock"));
        assert_eq!(err.into_spec_error().exception, "not a regular file");
    }
}
