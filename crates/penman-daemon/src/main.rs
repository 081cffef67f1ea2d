//! penman daemon — composition root for the agent service.
//!
//! Loads configuration, wires the registry, provider, and default content
//! officer together, and serves the HTTP API.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use penman_agents::events::EventBus;
use penman_agents::manager::AgentManager;
use penman_agents::officer::ContentOfficer;
use penman_agents::rollover;
use penman_bridge::http_api::{api_router, ApiState};
use penman_core::config::Config;
use penman_harness::provider::{CompletionProvider, OpenAiProvider};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    penman_telemetry::logging::init_logging("penman-daemon", "info");

    // Missing API key aborts startup here.
    let config = Config::from_env().context("invalid configuration")?;
    info!(
        model = %config.provider.model,
        port = config.server.port,
        env = %config.server.env,
        "penman daemon starting"
    );

    let bus = EventBus::new();
    let manager = Arc::new(AgentManager::new(bus.clone()));
    rollover::spawn_daily_rollover(manager.clone());

    // Log every agent lifecycle event the registry publishes.
    let events = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv_async().await {
            debug!(?event, "agent event");
        }
    });

    let provider: Arc<dyn CompletionProvider> =
        Arc::new(OpenAiProvider::new(config.provider.api_key.clone()));

    let state = Arc::new(ApiState::new(
        manager.clone(),
        provider.clone(),
        config.clone(),
    ));

    // The dashboard expects one content officer out of the box.
    let officer = ContentOfficer::spawn(
        "Content Officer",
        manager,
        provider,
        state.completion_config(),
    )
    .await
    .context("failed to register default agent")?;
    info!(agent_id = %officer.id(), "content officer registered");
    state.register_officer(officer).await;

    let app = api_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.server.port))?;
    info!(port = config.server.port, env = %config.server.env, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("penman daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
