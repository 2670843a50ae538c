use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Severity labels the scanner is asked to report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

impl Severity {
    /// Default filter when a request does not name one. `UNKNOWN` is
    /// deliberately excluded; it still appears verbatim on findings the
    /// scanner reports without a severity.
    pub const DEFAULT_FILTER: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Ok(Severity::Critical),
            "HIGH" => Ok(Severity::High),
            "MEDIUM" => Ok(Severity::Medium),
            "LOW" => Ok(Severity::Low),
            "UNKNOWN" => Ok(Severity::Unknown),
            other => Err(format!("unknown severity label: {other}")),
        }
    }
}

/// Raw scan request body. Every field is optional; defaults are applied
/// when resolving into [`ScanOptions`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanRequest {
    pub image: Option<String>,
    /// Comma-separated severity labels, e.g. `"CRITICAL,HIGH"`.
    pub severity: Option<String>,
    pub ignore_unfixed: Option<bool>,
}

/// A validated scan request with all defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub image: String,
    pub severity: Vec<Severity>,
    pub ignore_unfixed: bool,
}

impl ScanOptions {
    /// Resolve a raw request into concrete options.
    ///
    /// A missing or blank image falls back to `default_image`; a missing
    /// severity filter falls back to [`Severity::DEFAULT_FILTER`]. A filter
    /// containing a label outside the severity enumeration is rejected.
    pub fn resolve(request: ScanRequest, default_image: &str) -> Result<Self, ApiError> {
        let image = request
            .image
            .filter(|image| !image.trim().is_empty())
            .unwrap_or_else(|| default_image.to_string());

        let severity = match request.severity {
            Some(filter) => {
                let labels: Vec<Severity> = filter
                    .split(',')
                    .filter(|label| !label.trim().is_empty())
                    .map(|label| label.parse::<Severity>())
                    .collect::<Result<_, _>>()
                    .map_err(ApiError::validation)?;
                if labels.is_empty() {
                    Severity::DEFAULT_FILTER.to_vec()
                } else {
                    labels
                }
            }
            None => Severity::DEFAULT_FILTER.to_vec(),
        };

        Ok(Self {
            image,
            severity,
            ignore_unfixed: request.ignore_unfixed.unwrap_or(false),
        })
    }

    /// The comma-separated form passed to the scanner's `--severity` flag.
    pub fn severity_flag(&self) -> String {
        self.severity
            .iter()
            .map(Severity::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One normalized vulnerability finding.
///
/// Absent values are replaced with explicit sentinels so the response shape
/// is stable: `N/A` for a missing CVE id, `Unknown` for package fields, and
/// `No fix available` when the scanner reports no fixed version. A
/// `cvss_score` of `0.0` means no authoritative score was found, not zero
/// severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub cve_id: String,
    pub package: String,
    pub installed_version: String,
    pub fixed_version: String,
    pub severity: String,
    pub cvss_score: f64,
    pub description: String,
    pub layer: String,
    pub references: Vec<String>,
}

/// Per-severity finding counts, always derived from the finding list.
///
/// Findings whose severity is outside the four named buckets count toward
/// `total` only; they are never silently dropped from the finding list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// The full scan response body.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scanner: String,
    pub image: String,
    pub scan_time: DateTime<Utc>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub summary: ScanSummary,
    /// Always true: this service only ever reports freshly scanned data,
    /// never cached or demo data.
    pub live_data: bool,
    pub trivy_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_applies_defaults() {
        let options = ScanOptions::resolve(ScanRequest::default(), "nginx:latest").unwrap();
        assert_eq!(options.image, "nginx:latest");
        assert_eq!(options.severity, Severity::DEFAULT_FILTER.to_vec());
        assert!(!options.ignore_unfixed);
    }

    #[test]
    fn test_resolve_blank_image_falls_back_to_default() {
        let request = ScanRequest {
            image: Some("   ".to_string()),
            ..Default::default()
        };
        let options = ScanOptions::resolve(request, "nginx:latest").unwrap();
        assert_eq!(options.image, "nginx:latest");
    }

    #[test]
    fn test_resolve_parses_severity_filter() {
        let request = ScanRequest {
            severity: Some("critical, HIGH".to_string()),
            ..Default::default()
        };
        let options = ScanOptions::resolve(request, "nginx:latest").unwrap();
        assert_eq!(options.severity, vec![Severity::Critical, Severity::High]);
        assert_eq!(options.severity_flag(), "CRITICAL,HIGH");
    }

    #[test]
    fn test_resolve_rejects_unknown_severity_label() {
        let request = ScanRequest {
            severity: Some("CRITICAL,BOGUS".to_string()),
            ..Default::default()
        };
        let err = ScanOptions::resolve(request, "nginx:latest").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_severity_flag_default() {
        let options = ScanOptions::resolve(ScanRequest::default(), "nginx:latest").unwrap();
        assert_eq!(options.severity_flag(), "CRITICAL,HIGH,MEDIUM,LOW");
    }
}
