use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    config::Settings,
    services::{ScanService, Scanner, TrivyCli},
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub scanner: Arc<dyn Scanner>,
    pub scan_service: Arc<ScanService>,
}

impl AppState {
    /// Create application state with the production scanner
    pub fn new(config: Settings) -> Self {
        let scanner: Arc<dyn Scanner> = Arc::new(TrivyCli::new(&config));
        Self::with_scanner(config, scanner)
    }

    /// Create application state around an explicit scanner implementation.
    /// Tests inject a scripted scanner here.
    pub fn with_scanner(config: Settings, scanner: Arc<dyn Scanner>) -> Self {
        let scan_service = Arc::new(ScanService::new(scanner.clone()));
        Self {
            config: Arc::new(config),
            scanner,
            scan_service,
        }
    }
}

/// Build the API router with all middleware layers applied.
/// Shared by the binary and the integration tests.
pub fn create_router(app_state: AppState) -> Router {
    let cors_layer = middleware::create_cors_layer(app_state.config.cors_allow_origins.clone());

    Router::new()
        // Health check endpoints
        .route("/api/health", get(handlers::health_check))
        .route("/api/health/simple", get(handlers::health_check_simple))
        .route("/api/health/ready", get(handlers::readiness_check))
        .route("/api/health/live", get(handlers::liveness_check))
        // Scan endpoint
        .route("/api/scan", post(handlers::run_scan))
        .with_state(app_state)
        // Apply middleware layers (global)
        .layer(axum::middleware::from_fn(
            middleware::request_logging_middleware,
        ))
        .layer(middleware::create_logging_layer())
        .layer(cors_layer)
}
