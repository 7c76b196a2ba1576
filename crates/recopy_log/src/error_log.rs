//! Append-only failure log shared by every copy in one run.

use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{error, warn};

/// File name used when the caller does not choose one.
pub const DEFAULT_ERROR_LOG_NAME: &str = "copyerrors.log";

/// Durable record of paths that could not be copied.
///
/// The file is opened in append mode on the first [`ErrorLog::record`] call
/// and kept open until [`ErrorLog::close`] (or drop). Earlier runs are never
/// truncated, so the file accumulates the history of every failed path.
#[derive(Debug)]
pub struct ErrorLog {
    path_log: PathBuf,
    writer: Option<LineWriter<File>>,
    cnt_records: u64,
    if_open_failed: bool,
}

impl ErrorLog {
    /// Create a sink backed by `path_log`. Nothing touches the filesystem yet.
    pub fn new<P: AsRef<Path>>(path_log: P) -> Self {
        Self {
            path_log: path_log.as_ref().to_path_buf(),
            writer: None,
            cnt_records: 0,
            if_open_failed: false,
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path_log
    }

    /// Number of failures recorded through this instance.
    pub fn cnt_records(&self) -> u64 {
        self.cnt_records
    }

    /// Append `<path> <message>` and emit an error event.
    ///
    /// A failure to open or write the backing file is reported as a warning;
    /// the console event above still carries the record.
    pub fn record<P: AsRef<Path>>(&mut self, path: P, message: &str) {
        let path = path.as_ref();
        self.cnt_records += 1;
        error!("Error copying {} - {message}", path.display());

        let res_write = self
            .writer_mut()
            .and_then(|writer| writeln!(writer, "{} {message}", path.display()));
        if let Err(e) = res_write {
            warn!(
                "Failed to append to error log {} ({e})",
                self.path_log.display()
            );
        }
    }

    /// Flush and release the file handle. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(mut writer) = self.writer.take()
            && let Err(e) = writer.flush()
        {
            warn!(
                "Failed to flush error log {} ({e})",
                self.path_log.display()
            );
        }
    }

    fn writer_mut(&mut self) -> io::Result<&mut LineWriter<File>> {
        if self.writer.is_none() {
            if self.if_open_failed {
                return Err(io::Error::other("error log could not be opened earlier"));
            }
            let fh = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path_log)
                .inspect_err(|_| self.if_open_failed = true)?;
            self.writer = Some(LineWriter::new(fh));
        }
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::other("error log writer missing"))
    }
}

impl Drop for ErrorLog {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorLog;

    #[test]
    fn error_log_is_not_created_without_records() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_log = tmp.path().join("copyerrors.log");

        let mut error_log = ErrorLog::new(&path_log);
        error_log.close();
        error_log.close();

        assert_eq!(error_log.cnt_records(), 0);
        assert!(!path_log.exists());
    }

    #[test]
    fn error_log_appends_across_instances() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_log = tmp.path().join("copyerrors.log");

        let mut first = ErrorLog::new(&path_log);
        first.record("/src/a.txt", "Permission denied (os error 13)");
        first.close();

        let mut second = ErrorLog::new(&path_log);
        second.record("/src/b.txt", "No such file or directory (os error 2)");
        drop(second);

        let txt = std::fs::read_to_string(&path_log).expect("read log");
        assert_eq!(
            txt,
            "/src/a.txt Permission denied (os error 13)\n\
             /src/b.txt No such file or directory (os error 2)\n"
        );
    }

    #[test]
    fn error_log_counts_records_when_file_cannot_open() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_log = tmp.path().join("missing_dir").join("copyerrors.log");

        let mut error_log = ErrorLog::new(&path_log);
        error_log.record("/src/a.txt", "boom");
        error_log.record("/src/b.txt", "boom");

        assert_eq!(error_log.cnt_records(), 2);
        assert!(!path_log.exists());
    }
}
