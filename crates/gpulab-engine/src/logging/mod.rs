//! Logging utilities.
//!
//! Demos log through the standard `log` facade; `init_logging` wires it to
//! `env_logger` once per process.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
