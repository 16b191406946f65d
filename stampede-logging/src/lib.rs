//! Logging setup for the Stampede binaries
//!
//! Both binaries log through `tracing`. The CLI writes to stdout alongside
//! its own output; the MCP server must keep stdout for protocol frames and
//! logs to stderr instead.

pub mod init;

pub use init::{init_tracing, LogLevel, LogTarget, LoggingOptions};
