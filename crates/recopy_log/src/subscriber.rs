//! Console logging setup.
//!
//! Events go to stderr with a timestamp and a level prefix. `RUST_LOG`
//! takes precedence over the level chosen by the caller.

use tracing_subscriber::{EnvFilter, fmt};

/// Console severity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumLogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl EnumLogLevel {
    /// Map `-q` / `-v` counts onto a threshold, starting from `Info`.
    pub fn from_flags(if_quiet: bool, n_verbose: u8) -> Self {
        if if_quiet {
            return Self::Error;
        }
        match n_verbose {
            0 => Self::Info,
            1 => Self::Debug,
            _ => Self::Trace,
        }
    }

    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Install the global stderr subscriber.
///
/// Returns an error when a global subscriber is already set.
pub fn init_tracing(
    enum_level: EnumLogLevel,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(enum_level.as_directive()));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
}
