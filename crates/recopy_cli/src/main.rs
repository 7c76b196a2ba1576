use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use recopy_fs::recover_tree;
use recopy_log::{DEFAULT_ERROR_LOG_NAME, EnumLogLevel, ErrorLog, init_tracing};
use tracing::info;

/// Copy a directory tree, skipping files that already exist at the
/// destination. Per-file failures go to the error log; re-run to resume.
#[derive(Debug, Parser)]
#[command(name = "recopy", version)]
struct Cli {
    /// Source root directory.
    source: PathBuf,
    /// Destination root directory (created as needed).
    destination: PathBuf,
    /// Append-only log of paths that failed to copy.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_ERROR_LOG_NAME)]
    error_log: PathBuf,
    /// Show debug output (`-vv` for trace).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
    /// Only show errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(EnumLogLevel::from_flags(cli.quiet, cli.verbose))
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    let mut error_log = ErrorLog::new(&cli.error_log);
    let res_report = recover_tree(&cli.source, &cli.destination, &mut error_log);
    error_log.close();

    let report = res_report.with_context(|| {
        format!(
            "cannot copy {} -> {}",
            cli.source.display(),
            cli.destination.display()
        )
    })?;
    info!("{report}");
    if report.error_count() > 0 {
        info!(
            "{} failure(s) appended to {}",
            report.error_count(),
            error_log.path().display()
        );
    }
    Ok(())
}
