use axum::{body::Bytes, extract::State, response::Json};

use crate::{
    error::ApiError,
    models::{ScanOptions, ScanReport, ScanRequest},
    AppState,
};

/// Run a vulnerability scan against a container image.
///
/// The body is optional; a missing or empty body behaves as an empty request
/// and every field falls back to its default. A non-empty body must be valid
/// JSON.
pub async fn run_scan(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<Json<ScanReport>, ApiError> {
    let request: ScanRequest = if body.is_empty() {
        ScanRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::validation(format!("invalid request body: {}", err)))?
    };
    let options = ScanOptions::resolve(request, &app_state.config.default_image)?;
    let report = app_state.scan_service.execute(options).await?;
    Ok(Json(report))
}
