use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use super::state::ApiState;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusResponse {
    version: String,
    uptime_seconds: u64,
    agent_count: usize,
}

/// GET /api/agent/stats -- process-wide stats snapshot.
pub(crate) async fn get_stats(State(state): State<Arc<ApiState>>) -> Json<serde_json::Value> {
    let stats = state.manager.stats().await;
    Json(json!({ "stats": stats }))
}

/// GET /api/health -- basic liveness plus configuration echo.
pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running",
        "environment": state.config.server.env,
        "model": state.config.provider.model,
    }))
}

/// GET /api/status -- version, uptime, and registry size.
pub(crate) async fn get_status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        agent_count: state.manager.agent_count().await,
    })
}
