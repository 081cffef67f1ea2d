// ---------------------------------------------------------------------------
// HTTP API module directory
// ---------------------------------------------------------------------------
//
// Domain-oriented handler modules wired together by the router below.
// Route paths mirror the dashboard's existing API surface
// (`/api/agent/...` + `/api/health`).

mod agents;
mod content;
mod misc;
pub mod state;
mod tasks;

pub use state::ApiState;

pub use self::router::api_router;

// ---------------------------------------------------------------------------
// Router + middleware
// ---------------------------------------------------------------------------

mod router {
    use super::*;
    use axum::{
        routing::{get, post},
        Router,
    };
    use std::sync::Arc;
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    /// Build the full API router.
    ///
    /// CORS is wide open, matching the original server's `cors()` default;
    /// there is no authentication layer.
    pub fn api_router(state: Arc<ApiState>) -> Router {
        Router::new()
            .route("/api/agent/agents", get(agents::list_agents))
            .route("/api/agent/agents/{id}", get(agents::get_agent))
            .route("/api/agent/stats", get(misc::get_stats))
            .route("/api/agent/tasks", post(tasks::submit_task))
            .route("/api/agent/content", post(content::generate_content))
            .route("/api/health", get(misc::health))
            .route("/api/status", get(misc::get_status))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
