//! Agent registry and task runner for penman.
//!
//! This crate holds the only stateful part of the system:
//! - [`manager::AgentManager`] — the in-memory registry of agent records,
//!   per-agent task queues, and process-wide stats counters
//! - [`officer::ContentOfficer`] — the per-agent task runner that drives
//!   status transitions and calls the completion provider
//! - [`events::EventBus`] — a broadcast channel carrying agent lifecycle
//!   notifications to whoever subscribes (the daemon logs them)
//! - [`rollover`] — the daily completed-count reset at local midnight

pub mod events;
pub mod manager;
pub mod officer;
pub mod rollover;
