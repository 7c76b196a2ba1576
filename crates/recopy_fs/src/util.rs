use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::spec::RecoverTreeError;

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _is_relative_to_base(path: &Path, base: &Path) -> bool {
    path.starts_with(base)
}

/// Canonicalize the deepest existing ancestor and re-attach the remainder.
fn _normalize_path(path: &Path) -> PathBuf {
    let path_lexical = _normalize_lexically(path);
    let mut path_existing = path_lexical.as_path();
    let mut l_parts_missing = Vec::new();
    loop {
        if let Ok(resolved) = fs::canonicalize(path_existing) {
            return l_parts_missing
                .iter()
                .rev()
                .fold(resolved, |acc: PathBuf, part| acc.join(part));
        }
        match (path_existing.parent(), path_existing.file_name()) {
            (Some(parent), Some(name)) => {
                l_parts_missing.push(name.to_os_string());
                path_existing = parent;
            }
            _ => return path_lexical,
        }
    }
}

/// Fold `.` and `..` without consulting the filesystem.
fn _normalize_lexically(path: &Path) -> PathBuf {
    let mut path_out = PathBuf::new();
    for part in path.components() {
        match part {
            Component::CurDir => {}
            Component::ParentDir => {
                if !path_out.pop() && !path_out.has_root() {
                    path_out.push("..");
                }
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                path_out.push(part.as_os_str());
            }
        }
    }
    path_out
}

/// Absolute, lexically normalized form of `path`.
pub(crate) fn absolutize_path(path: &Path) -> Result<PathBuf, RecoverTreeError> {
    if path.is_absolute() {
        return Ok(_normalize_lexically(path));
    }
    let path_cwd =
        std::env::current_dir().map_err(|e| RecoverTreeError::CurrentDirUnavailable {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(_normalize_lexically(&path_cwd.join(path)))
}

/// `true` when `dst` lies strictly below `src` once symlinks are resolved.
///
/// Equal roots and a source nested inside the destination are accepted.
pub(crate) fn is_destination_inside_source(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    dst_resolved != src_resolved && _is_relative_to_base(&dst_resolved, &src_resolved)
}

/// Path of `path_dir` relative to `path_dir_root`.
///
/// Only the exact root prefix is removed; a directory reported outside the
/// root is returned unchanged.
pub(crate) fn derive_relative_path(path_dir: &Path, path_dir_root: &Path) -> PathBuf {
    path_dir
        .strip_prefix(path_dir_root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path_dir.to_path_buf())
}

/// Mirror `path_item_name` inside `path_dir_rel` under `path_dir_root`.
///
/// # Examples
/// ```ignore
/// use std::path::Path;
/// let path_dst = derive_mirrored_path(Path::new("/dst"), Path::new("sub"), "b.txt");
/// assert_eq!(path_dst, Path::new("/dst/sub/b.txt"));
///
/// // Root directory: empty relative path.
/// let path_dst = derive_mirrored_path(Path::new("/dst"), Path::new(""), "a.txt");
/// assert_eq!(path_dst, Path::new("/dst/a.txt"));
/// ```
pub(crate) fn derive_mirrored_path(
    path_dir_root: &Path,
    path_dir_rel: &Path,
    path_item_name: &std::ffi::OsStr,
) -> PathBuf {
    path_dir_root.join(path_dir_rel).join(path_item_name)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileOperations

/// Create the parent directory of `path_file_dst` (and its ancestors) if absent.
pub(crate) fn ensure_parent_dir(path_file_dst: &Path) -> Result<(), io::Error> {
    let Some(path_parent_dst) = path_file_dst.parent() else {
        return Ok(());
    };
    if path_parent_dst.as_os_str().is_empty() || path_parent_dst.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path_parent_dst)
}

/// `true` when `path` resolves (through symlinks) to a regular file.
pub(crate) fn is_regular_file(path: &Path) -> Result<bool, io::Error> {
    Ok(fs::metadata(path)?.file_type().is_file())
}

/// Copy bytes, permission bits, access/modification times and (Linux) xattrs.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    fs::copy(path_file_src, path_file_dst)?;
    apply_metadata(path_file_src, path_file_dst)?;
    #[cfg(target_os = "linux")]
    {
        let cnt_xattrs = copy_xattrs_linux(path_file_src, path_file_dst);
        if cnt_xattrs > 0 {
            tracing::trace!(
                "{cnt_xattrs} xattr(s) carried to {}",
                path_file_dst.display()
            );
        }
    }
    Ok(())
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)
}

/// Best-effort xattr transfer; returns how many attributes landed on `dst`.
///
/// A destination filesystem without xattr support is not a copy failure.
#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) -> usize {
    let names = xattr::list(path_file_src)
        .inspect_err(|e| {
            tracing::debug!("No xattrs read from {} ({e})", path_file_src.display());
        })
        .into_iter()
        .flatten();

    names
        .filter_map(|name| {
            let value = xattr::get(path_file_src, &name).ok().flatten()?;
            Some((name, value))
        })
        .filter(|(name, value)| match xattr::set(path_file_dst, name, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Skipped xattr {name:?} on {} ({e})", path_file_dst.display());
                false
            }
        })
        .count()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
