use axum::{extract::State, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use penman_core::types::TaskSpec;

use super::state::ApiState;
use crate::api_error::ApiError;

/// POST /api/agent/tasks -- submit a task to a named agent.
///
/// Body: `{ "agentId": "...", "task": { "type": "...", "parameters": {...} } }`.
/// The body is validated by hand so a missing `agentId`, `task`, or prompt
/// is reported as a 400 with a pointed message rather than a generic
/// deserialization failure.
pub(crate) async fn submit_task(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let agent_id = body
        .get("agentId")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::BadRequest("Missing agentId in request body".to_string()))?;

    let task_value = body
        .get("task")
        .cloned()
        .ok_or_else(|| ApiError::BadRequest("Missing task in request body".to_string()))?;
    let task: TaskSpec = serde_json::from_value(task_value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid task: {}", e)))?;

    if task.parameters.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Missing prompt in task parameters".to_string(),
        ));
    }

    let officer = state
        .officer(agent_id)
        .await
        .ok_or_else(|| ApiError::NotFound("agent not found".to_string()))?;

    info!(agent_id = %agent_id, task_type = %task.task_type, "task submitted");
    let result = officer
        .submit(task)
        .await
        .map_err(|e| state.internal_error(e))?;

    Ok(Json(json!({ "result": result })))
}
