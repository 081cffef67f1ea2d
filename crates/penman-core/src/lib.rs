//! Core configuration and domain types for penman.
//!
//! This is the leaf crate of the workspace: it defines the agent/task/stats
//! data model shared by the registry, the task runner, and the HTTP layer,
//! plus the environment-based service configuration.

pub mod config;
pub mod types;
