//! `recopy_log` v1:
//! Failure sink and console logging for the recovery copy tools.
//!
//! - `error_log`  : append-only `<path> <message>` failure file
//! - `subscriber` : stderr `tracing` subscriber setup

pub mod error_log;
pub mod subscriber;

pub use error_log::{DEFAULT_ERROR_LOG_NAME, ErrorLog};
pub use subscriber::{EnumLogLevel, init_tracing};
