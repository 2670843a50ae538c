use std::net::SocketAddr;
use tokio::signal;

use vulnscan_api::{config, create_router, middleware, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first
    let config = config::Settings::new()?;

    // Initialize structured logging with configuration
    middleware::init_logging(&config.log_level, &config.log_format)?;

    tracing::info!("Starting vulnscan API v{}", env!("CARGO_PKG_VERSION"));

    let addr = SocketAddr::new(config.host.parse()?, config.port);

    // Create application state with dependency injection
    let app_state = AppState::new(config);
    let app = create_router(app_state);

    // Run the server with graceful shutdown
    tracing::info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
