//! Recovery run report model and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecCopyError;

/// Aggregate counters and diagnostics for one `recover_tree` run.
#[derive(Debug, Default, Clone)]
pub struct ReportRecover {
    /// Source directories visited (including the root).
    pub cnt_dirs: u64,
    /// Non-directory entries seen across all batches.
    pub cnt_scanned: u64,
    /// Files copied during this run.
    pub cnt_copied: u64,
    /// Files skipped because the destination already existed.
    pub cnt_skipped: u64,
    /// Failures routed to the error log, in order.
    pub errors: Vec<SpecCopyError>,
}

impl ReportRecover {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_dirs".to_string(), self.cnt_dirs);
        dict_counts.insert("cnt_scanned".to_string(), self.cnt_scanned);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_skipped".to_string(), self.cnt_skipped);
        dict_counts.insert("cnt_errors".to_string(), self.error_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} dirs={} scanned={} copied={} skipped={} errors={}",
            self.cnt_dirs,
            self.cnt_scanned,
            self.cnt_copied,
            self.cnt_skipped,
            self.error_count()
        )
    }
}

impl fmt::Display for ReportRecover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[RECOVER]"))
    }
}

/// Mutable accumulator for recovery statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportRecoverBuilder {
    report: ReportRecover,
}

impl ReportRecoverBuilder {
    /// Fold the walker-side counters of one batch.
    pub fn add_batch(&mut self, cnt_scanned: u64, cnt_skipped: u64) {
        self.report.cnt_dirs += 1;
        self.report.cnt_scanned += cnt_scanned;
        self.report.cnt_skipped += cnt_skipped;
    }

    pub fn add_copied(&mut self) {
        self.report.cnt_copied += 1;
    }

    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.report.errors.push(SpecCopyError { path, exception });
    }

    pub fn build(self) -> ReportRecover {
        self.report
    }
}
