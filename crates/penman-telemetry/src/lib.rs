//! Logging bootstrap for penman services.
//!
//! Structured logging via the `tracing` ecosystem, with human-readable and
//! JSON output modes selected by the binary at startup.

pub mod logging;
