//! Form UI and JSON API.

pub mod error;
pub mod handlers;
pub mod page;

use crate::config::Config;
use crate::core::{ModelGateway, ModelOptions};
use crate::presets::PresetStore;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ModelGateway>,
    pub presets: PresetStore,
    pub options: ModelOptions,
    pub default_preset_id: String,
}

impl AppState {
    pub fn new(config: &Config, gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            gateway,
            presets: PresetStore::new(&config.presets_dir),
            options: ModelOptions::from_config(config),
            default_preset_id: config.default_preset_id.clone(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/summarize", post(handlers::summarize_form))
        .route("/api/summarize", post(handlers::api_summarize))
        .route("/api/infer-schema", post(handlers::api_infer_schema))
        .route(
            "/api/presets",
            get(handlers::list_presets).post(handlers::save_preset),
        )
        .route("/api/presets/:id", get(handlers::get_preset))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received shutdown signal");
    }
}
