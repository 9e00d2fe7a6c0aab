//! Breathe Timer - A guided 4-7-8 breathing timer
//! 
//! This is the main entry point for the breathe-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use breathe_timer::{
    api::{create_router, serve_until},
    config::Config,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("breathe_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting breathe-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, start_running={}",
          config.host, config.port, config.start_running);

    // Create application state, which spawns the stage timer task
    let state = Arc::new(AppState::new(config.port, config.host.clone(), config.start_running));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /resume - Start or continue the countdown");
    info!("  POST /pause  - Freeze the countdown");
    info!("  POST /toggle - Pause or resume");
    info!("  POST /reset  - Back to Get Ready, paused");
    info!("  GET  /status - Current stage, countdown and animation");
    info!("  GET  /stages - Stage table");
    info!("  GET  /events - Server-sent stream of state changes");
    info!("  GET  /health - Health check");

    // Serve until a shutdown signal, then stop the stage timer
    serve_until(listener, app, state, shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}
