use axum::http::{HeaderName, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Create CORS layer with configurable origins from settings.
///
/// Every response, success or error, must carry cross-origin headers; the
/// layer wraps the whole router so error envelopes are covered too. An
/// empty list or `*` permits any origin.
pub fn create_cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let allowed_headers = vec![HeaderName::from_static("content-type")];
    let allowed_methods = [Method::GET, Method::POST, Method::OPTIONS];

    if allowed_origins.is_empty() || allowed_origins.contains(&"*".to_string()) {
        tracing::debug!("CORS: Allowing all origins");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(allowed_methods)
            .allow_headers(allowed_headers)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(parsed) => {
                    tracing::debug!("CORS: Allowing origin: {}", origin);
                    Some(parsed)
                }
                Err(e) => {
                    tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                    None
                }
            })
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS: No valid origins configured, falling back to permissive mode");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(allowed_methods)
                .allow_headers(allowed_headers)
        } else {
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(allowed_methods)
                .allow_headers(allowed_headers)
        }
    }
}
