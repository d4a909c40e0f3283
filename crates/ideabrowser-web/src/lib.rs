//! IdeaBrowser Web Server
//!
//! Axum-based request gateway in front of the process bridge.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use ideabrowser_core::{ProcessBridge, ServerConfig};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub use error::ApiError;
pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/analyze", post(routes::analyze::analyze))
        .with_state(state);

    Router::new()
        .route("/", get(routes::index::index))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Run the web server until Ctrl+C.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let bridge = ProcessBridge::new(config.bridge.clone());
    let app = create_router(AppState::new(Arc::new(bridge)));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for Ctrl+C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
