//! Harness — completion-provider abstraction for the penman agent runtime.
//!
//! Sits between the agent task runner and the external hosted LLM API.
//! The boundary contract is deliberately thin: send a message list plus
//! generation parameters, get back text or an error.

pub mod provider;
