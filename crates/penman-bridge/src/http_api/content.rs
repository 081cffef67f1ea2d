use axum::{extract::State, Json};
use serde_json::json;
use std::sync::Arc;

use penman_harness::provider::Message;

use super::state::ApiState;
use crate::api_error::ApiError;

/// System instruction for the legacy agent-independent endpoint.
const CONTENT_SYSTEM_PROMPT: &str = "You are a Content Officer AI that specializes in \
     creating short, engaging blog posts and social media content.";

/// POST /api/agent/content -- legacy single-shot content generation.
///
/// Kept for backward compatibility with older dashboard builds: bypasses
/// the registry entirely and talks to the completion API directly with a
/// hardcoded system instruction. Body: `{ "prompt": "..." }`.
pub(crate) async fn generate_content(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let prompt = body
        .get("prompt")
        .and_then(|v| v.as_str())
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing prompt in request body".to_string()))?;

    let messages = vec![
        Message::system(CONTENT_SYSTEM_PROMPT),
        Message::user(prompt),
    ];

    let completion = state
        .provider
        .complete(&messages, &state.completion_config())
        .await
        .map_err(|e| state.internal_error(e))?;

    Ok(Json(json!({ "result": completion.content })))
}
