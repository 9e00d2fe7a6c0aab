//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::{future::Future, sync::Arc};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/resume", post(resume_handler))
        .route("/pause", post(pause_handler))
        .route("/toggle", post(toggle_handler))
        .route("/reset", post(reset_handler))
        .route("/status", get(status_handler))
        .route("/stages", get(stages_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve `app` until `shutdown` resolves or the server fails, then tear down
/// the stage timer. Teardown runs on every exit path.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    state: Arc<AppState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let server = axum::serve(listener, app);

    let outcome = tokio::select! {
        result = server => {
            if let Err(e) = &result {
                error!("Server error: {}", e);
            }
            result
        }
        result = shutdown => {
            match &result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Failed to listen for shutdown signals: {}", e),
            }
            result
        }
    };

    state.teardown().await;
    outcome
}
