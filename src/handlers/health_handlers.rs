use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::{error::ApiError, AppState};

/// Enhanced health check endpoint with scanner availability check
pub async fn health_check(State(app_state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let scanner_status = check_scanner_health(&app_state).await;
    let healthy = scanner_status["healthy"].as_bool().unwrap_or(false);

    let health_status = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "vulnscan-api",
        "checks": {
            "scanner": scanner_status,
        }
    });

    if !healthy {
        return Err(ApiError::internal("Service is unhealthy"));
    }

    Ok(Json(health_status))
}

/// Simple health check endpoint for load balancers
pub async fn health_check_simple() -> Result<&'static str, StatusCode> {
    Ok("OK")
}

/// Readiness check endpoint for Kubernetes
pub async fn readiness_check(State(app_state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let scanner_status = check_scanner_health(&app_state).await;
    if !scanner_status["healthy"].as_bool().unwrap_or(false) {
        return Err(ApiError::internal("Scanner binary is not available"));
    }

    Ok(Json(json!({
        "status": "ready",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "checks": {
            "scanner": scanner_status,
        }
    })))
}

/// Liveness check endpoint for Kubernetes
pub async fn liveness_check() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Probe the scanner with its version query and report availability
async fn check_scanner_health(app_state: &AppState) -> Value {
    match app_state.scanner.version().await {
        Ok(version) if !version.trim().is_empty() => json!({
            "healthy": true,
            "message": "Scanner available",
            "version": version,
        }),
        Ok(_) => json!({
            "healthy": false,
            "message": "Scanner produced no version output",
        }),
        Err(e) => {
            tracing::error!("Scanner health check failed: {}", e);
            json!({
                "healthy": false,
                "message": "Scanner unavailable",
                "error": e.to_string(),
            })
        }
    }
}
