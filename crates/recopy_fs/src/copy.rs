//! Copy execution and recovery run orchestration.

use std::path::Path;

use recopy_log::ErrorLog;
use tracing::{debug, info, warn};

use crate::report::{ReportRecover, ReportRecoverBuilder};
use crate::spec::{
    CopyTaskError, RecoverTreeError, SpecCopyBatch, SpecCopyTask, SpecRootPair, WalkError,
};
use crate::util::{copy_file_with_metadata, ensure_parent_dir, is_regular_file};
use crate::walk::TreeWalker;

/// Materialize one pending copy.
///
/// 1. Create the destination's parent directory when it is missing.
/// 2. Copy content, permission bits and timestamps from the source.
///
/// Failures are returned, never logged here; they are keyed by the source
/// path. The destination is not re-checked for existence, the walker already
/// filtered it.
pub fn execute_copy_task(spec_task: &SpecCopyTask) -> Result<(), CopyTaskError> {
    let path_file_src = &spec_task.path_file_src;
    let path_file_dst = &spec_task.path_file_dst;

    ensure_parent_dir(path_file_dst).map_err(|e| CopyTaskError::CreateDirectory {
        path: path_file_src.clone(),
        source: e,
    })?;

    let b_is_regular = is_regular_file(path_file_src).map_err(|e| CopyTaskError::CopyFile {
        path: path_file_src.clone(),
        source: e,
    })?;
    if !b_is_regular {
        return Err(CopyTaskError::NotRegularFile {
            path: path_file_src.clone(),
        });
    }

    info!(
        "preparing to copy {} -> {}",
        path_file_src.display(),
        path_file_dst.display()
    );
    copy_file_with_metadata(path_file_src, path_file_dst).map_err(|e| {
        CopyTaskError::CopyFile {
            path: path_file_src.clone(),
            source: e,
        }
    })?;
    info!(
        "copied {} -> {}",
        path_file_src.display(),
        path_file_dst.display()
    );
    Ok(())
}

/// Copy every file under `dir_source` that is missing below `dir_destination`.
///
/// This function performs:
/// 1. Root resolution and validation.
/// 2. A pre-order walk producing one batch of pending copies per directory.
/// 3. Sequential execution of each batch, routing failures to `error_log`.
/// 4. Report aggregation.
///
/// Returns [`ReportRecover`] when the walk completes, however many files
/// failed. Returns [`RecoverTreeError`] only when the roots are unusable or
/// the source root cannot be listed.
pub fn recover_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    error_log: &mut ErrorLog,
) -> Result<ReportRecover, RecoverTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let root_pair = SpecRootPair::resolve(dir_source, dir_destination)?;
    root_pair.validate()?;
    info!(
        "recovering {} -> {}",
        root_pair.path_dir_src.display(),
        root_pair.path_dir_dst.display()
    );

    let walker = TreeWalker::new(root_pair);
    let mut builder_report = ReportRecoverBuilder::default();
    drain_batches(walker.batches(), error_log, &mut builder_report)?;
    Ok(builder_report.build())
}

/// Execute every batch, folding outcomes into `builder_report`.
///
/// A listing failure below the root is one error-log line keyed by the
/// directory; the root itself failing aborts the run.
fn drain_batches<I>(
    iter_batches: I,
    error_log: &mut ErrorLog,
    builder_report: &mut ReportRecoverBuilder,
) -> Result<(), RecoverTreeError>
where
    I: Iterator<Item = Result<SpecCopyBatch, WalkError>>,
{
    for res_batch in iter_batches {
        let spec_batch = match res_batch {
            Ok(v) => v,
            Err(e) if e.depth == 0 => return Err(RecoverTreeError::SourceUnreadable(e)),
            Err(e) => {
                warn!("{e}");
                let exception = e.source.to_string();
                error_log.record(&e.path, &exception);
                builder_report.add_error(e.path, exception);
                continue;
            }
        };
        builder_report.add_batch(spec_batch.cnt_scanned, spec_batch.cnt_skipped);

        for spec_task in &spec_batch.l_tasks_file_copy {
            debug!(
                "trying to copy {} -> {}",
                spec_task.path_file_src.display(),
                spec_task.path_file_dst.display()
            );
            match execute_copy_task(spec_task) {
                Ok(()) => builder_report.add_copied(),
                Err(e) => {
                    let spec_error = e.into_spec_error();
                    error_log.record(&spec_error.path, &spec_error.exception);
                    builder_report.add_error(spec_error.path, spec_error.exception);
                }
            }
        }
    }
    Ok(())
}
