use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::ApiError,
    models::{ScanOptions, ScanReport, TrivyReport},
    services::{
        normalizer,
        scanner::{Scanner, ScannerError},
    },
};

pub const SCANNER_NAME: &str = "Trivy";
/// Reported when the version query fails for any reason; version reporting
/// is best-effort and never fails the scan response.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Orchestrates the scan pipeline: invoke → parse → normalize → summarize.
///
/// One call is one linear pipeline; the service holds no mutable state, so
/// the runtime may execute it concurrently for different requests. Failed
/// scans are reported immediately, never retried.
pub struct ScanService {
    scanner: Arc<dyn Scanner>,
}

impl ScanService {
    pub fn new(scanner: Arc<dyn Scanner>) -> Self {
        Self { scanner }
    }

    pub async fn execute(&self, options: ScanOptions) -> Result<ScanReport, ApiError> {
        let output = self
            .scanner
            .run_scan(&options)
            .await
            .map_err(|err| match err {
                ScannerError::TimedOut(timeout) => ApiError::ScanTimeout {
                    image: options.image.clone(),
                    timeout_secs: timeout.as_secs(),
                },
                ScannerError::Launch(err) => {
                    ApiError::internal(format!("failed to launch scanner: {err}"))
                }
            })?;

        // A non-zero exit with JSON on stdout means "vulnerabilities found",
        // not a failed scan. Only a non-zero exit with nothing on stdout is
        // a failure.
        if !output.success() && output.stdout.trim().is_empty() {
            return Err(ApiError::ScanFailed {
                image: options.image.clone(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        let raw: TrivyReport = if output.stdout.trim().is_empty() {
            TrivyReport::default()
        } else {
            serde_json::from_str(&output.stdout).map_err(|source| ApiError::ParseFailed {
                image: options.image.clone(),
                source,
            })?
        };

        let vulnerabilities = normalizer::normalize(&raw);
        let summary = normalizer::summarize(&vulnerabilities);
        tracing::info!(
            image = %options.image,
            total = summary.total,
            critical = summary.critical,
            high = summary.high,
            "scan completed"
        );

        let trivy_version = match self.scanner.version().await {
            Ok(version) if !version.trim().is_empty() => version,
            Ok(_) => UNKNOWN_VERSION.to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "trivy version query failed");
                UNKNOWN_VERSION.to_string()
            }
        };

        Ok(ScanReport {
            scanner: SCANNER_NAME.to_string(),
            image: options.image,
            scan_time: Utc::now(),
            vulnerabilities,
            summary,
            live_data: true,
            trivy_version,
        })
    }
}
