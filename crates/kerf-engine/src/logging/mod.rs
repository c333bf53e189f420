//! Logging utilities.
//!
//! Centralizes logger initialization on top of the `log` facade. Library
//! code only ever logs through `log`; binaries call [`init_logging`] once.

mod init;

pub use init::{DEFAULT_FILTER, LoggingConfig, init_logging};
