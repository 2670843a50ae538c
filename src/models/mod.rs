pub mod scan;
pub mod trivy;

// Re-export commonly used types
pub use scan::{ScanOptions, ScanReport, ScanRequest, ScanSummary, Severity, Vulnerability};
pub use trivy::{CvssEntry, TrivyReport, TrivyResult, TrivyVulnerability};
