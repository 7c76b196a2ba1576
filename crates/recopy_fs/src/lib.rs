//! `recopy_fs` v1:
//! Resumable recursive copy engine.
//!
//! - `walk`   : per-directory traversal yielding batches of pending copies
//! - `copy`   : single-copy execution and run orchestration
//! - `spec`   : roots/tasks/batches and error types
//! - `report` : run-time report model
//! - `util`   : shared path and metadata helpers

pub mod copy;
pub mod report;
pub mod spec;
mod util;
pub mod walk;

pub use copy::{execute_copy_task, recover_tree};
pub use report::{ReportRecover, ReportRecoverBuilder};
pub use spec::{
    CopyTaskError, RecoverTreeError, SpecCopyBatch, SpecCopyError, SpecCopyTask, SpecRootPair,
    WalkError,
};
pub use walk::{IterCopyBatches, TreeWalker};
