//! HTTP bridge exposing the penman agent system.
//!
//! Axum-based JSON API over the agent registry and task runner:
//! - [`http_api`] — router, handlers, and shared [`http_api::ApiState`]
//! - [`api_error`] — unified error-to-response mapping

pub mod api_error;
pub mod http_api;
