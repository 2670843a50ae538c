pub mod health_handlers;
pub mod scan_handlers;

pub use health_handlers::{health_check, health_check_simple, liveness_check, readiness_check};
pub use scan_handlers::run_scan;
