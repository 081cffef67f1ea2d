use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use super::state::ApiState;
use crate::api_error::ApiError;

/// GET /api/agent/agents -- safe views of all registered agents.
pub(crate) async fn list_agents(State(state): State<Arc<ApiState>>) -> Json<serde_json::Value> {
    let agents = state.manager.list().await;
    Json(json!({ "agents": agents }))
}

/// GET /api/agent/agents/{id} -- one agent's safe view, or 404.
pub(crate) async fn get_agent(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let agent = state
        .manager
        .agent(&id)
        .await
        .ok_or_else(|| ApiError::NotFound("agent not found".to_string()))?;
    Ok(Json(json!({ "agent": agent })))
}
