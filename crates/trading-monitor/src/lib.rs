//! Logging setup and log retention.

mod logging;
pub mod retention;

pub use logging::{setup_logging, LogFormat, LogRotation, LoggingConfig};
pub use retention::prune_rotated_logs;
