mod config;
mod courses;
mod errors;
mod llm_client;
mod resume;
mod roadmap;
mod routes;
mod skills;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::courses::{load_course_catalog, CourseCatalog};
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::skills::SkillRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on invalid numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pathfinder API v{}", env!("CARGO_PKG_VERSION"));

    // Compile the skill table up front
    info!(
        "Skill registry loaded ({} skills)",
        SkillRegistry::builtin().entries().len()
    );

    // Initialize the text generator (Disabled when no credentials are set)
    let llm = LlmClient::from_config(&config)?;
    if llm.is_configured() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        warn!("ANTHROPIC_API_KEY not set; generation will use heuristic fallbacks");
    }

    // Load the course catalog (bounded read; failures degrade to empty)
    let catalog = load_course_catalog(
        config.course_catalog_path.as_deref(),
        Duration::from_millis(config.catalog_read_timeout_ms),
    )
    .await;
    if catalog.is_empty() {
        warn!("Course catalog is empty; course suggestions will be empty");
    }

    // Build app state
    let state = AppState::new(config.clone(), Arc::new(llm), Arc::new(catalog));

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the web client has a fixed domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
