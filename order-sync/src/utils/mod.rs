//! Utility functions and helpers

pub mod logger;

pub use logger::{RECONCILE_TARGET, cleanup_old_logs, init_logger, init_logger_with_file};
