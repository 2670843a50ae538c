use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Create structured logging layer for HTTP request tracing
pub fn create_logging_layer(
) -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
        .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(Level::DEBUG))
        .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::DEBUG))
}

/// Request/response logging middleware with proper correlation IDs
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start_time = Instant::now();

    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let remote_addr = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            request
                .headers()
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
        })
        .unwrap_or("unknown");

    tracing::debug!(
        correlation_id = %correlation_id,
        method = %method,
        uri = %uri,
        user_agent = %user_agent,
        remote_addr = %remote_addr,
        "incoming request"
    );

    let response = next.run(request).await;

    let duration = start_time.elapsed();
    let status = response.status();

    tracing::debug!(
        correlation_id = %correlation_id,
        method = %method,
        uri = %uri,
        status = %status,
        duration_ms = duration.as_millis(),
        "request completed"
    );

    response
}

/// Initialize structured logging with JSON or plain format based on settings
pub fn init_logging(log_level: &str, log_format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let level = match log_level.to_uppercase().as_str() {
        "TRACE" => Level::TRACE,
        "DEBUG" => Level::DEBUG,
        "INFO" => Level::INFO,
        "WARN" | "WARNING" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO", log_level);
            Level::INFO
        }
    };

    // Build filter string from configured log level
    // This ensures LOG_LEVEL from config always takes precedence over RUST_LOG env var
    let filter_string = format!("vulnscan_api={},tower_http=info", level);
    let env_filter = tracing_subscriber::EnvFilter::new(filter_string);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match log_format.to_lowercase().as_str() {
        "json" => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true);

            subscriber.with(json_layer).init();
        }
        "plain" | "text" => {
            let plain_layer = tracing_subscriber::fmt::layer().with_target(true);

            subscriber.with(plain_layer).init();
        }
        _ => {
            eprintln!("Invalid log format '{}', defaulting to JSON", log_format);
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true);

            subscriber.with(json_layer).init();
        }
    }

    Ok(())
}
