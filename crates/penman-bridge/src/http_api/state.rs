use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use penman_agents::manager::AgentManager;
use penman_agents::officer::ContentOfficer;
use penman_core::config::Config;
use penman_harness::provider::{CompletionConfig, CompletionProvider};

use crate::api_error::ApiError;

/// Shared application state for all HTTP handlers.
///
/// Built once at the composition root (the daemon) and handed to the
/// router in an `Arc`. Owns the registry handle, the officer lookup used
/// by task submission, and the completion provider for the legacy
/// single-shot content endpoint.
pub struct ApiState {
    pub manager: Arc<AgentManager>,
    pub provider: Arc<dyn CompletionProvider>,
    pub config: Config,
    pub start_time: Instant,
    officers: RwLock<HashMap<String, Arc<ContentOfficer>>>,
}

impl ApiState {
    pub fn new(
        manager: Arc<AgentManager>,
        provider: Arc<dyn CompletionProvider>,
        config: Config,
    ) -> Self {
        Self {
            manager,
            provider,
            config,
            start_time: Instant::now(),
            officers: RwLock::new(HashMap::new()),
        }
    }

    /// Make an officer addressable by task submissions.
    pub async fn register_officer(&self, officer: Arc<ContentOfficer>) {
        let mut officers = self.officers.write().await;
        officers.insert(officer.id().to_string(), officer);
    }

    /// Look up the officer owning the given agent id.
    pub async fn officer(&self, agent_id: &str) -> Option<Arc<ContentOfficer>> {
        let officers = self.officers.read().await;
        officers.get(agent_id).cloned()
    }

    /// Generation parameters from the service configuration.
    pub fn completion_config(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.config.provider.model.clone(),
            max_tokens: self.config.provider.max_tokens,
            temperature: self.config.provider.temperature,
        }
    }

    /// Wrap an upstream failure as a 500, exposing the underlying message
    /// only outside production.
    pub(crate) fn internal_error(&self, err: impl std::fmt::Display) -> ApiError {
        if self.config.server.is_production() {
            ApiError::Internal("Internal server error".to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}
