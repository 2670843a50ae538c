//! Pure transformation of the scanner's raw report into normalized findings.
//!
//! The raw report groups findings by scan target; normalization flattens all
//! targets into one ordered sequence, preserving target-group order and the
//! within-group order emitted by the scanner.

use std::collections::HashMap;

use crate::models::{
    CvssEntry, ScanSummary, Severity, TrivyReport, TrivyVulnerability, Vulnerability,
};

/// Upper bound on the description field, counted in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;
/// Upper bound on the references list; order is preserved.
pub const MAX_REFERENCES: usize = 3;
/// Sentinel for findings the scanner reports no fix for. Semantically
/// distinct from `Unknown`.
pub const NO_FIX_AVAILABLE: &str = "No fix available";

/// Advisory sources in preference order: the national database first, then
/// secondary sources. The first source present wins, even if it carries no
/// score.
const CVSS_SOURCE_PREFERENCE: [&str; 3] = ["nvd", "redhat", "ghsa"];

pub fn normalize(report: &TrivyReport) -> Vec<Vulnerability> {
    let mut findings = Vec::new();
    for result in &report.results {
        let layer = result.target.as_deref().unwrap_or("Unknown");
        for vuln in &result.vulnerabilities {
            findings.push(normalize_finding(vuln, layer));
        }
    }
    findings
}

fn normalize_finding(vuln: &TrivyVulnerability, layer: &str) -> Vulnerability {
    Vulnerability {
        cve_id: vuln
            .vulnerability_id
            .clone()
            .unwrap_or_else(|| "N/A".to_string()),
        package: vuln.pkg_name.clone().unwrap_or_else(|| "Unknown".to_string()),
        installed_version: vuln
            .installed_version
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        fixed_version: vuln
            .fixed_version
            .clone()
            .unwrap_or_else(|| NO_FIX_AVAILABLE.to_string()),
        severity: vuln
            .severity
            .clone()
            .unwrap_or_else(|| Severity::Unknown.to_string()),
        cvss_score: extract_cvss_score(&vuln.cvss),
        description: truncate_chars(
            vuln.description.as_deref().unwrap_or_default(),
            MAX_DESCRIPTION_CHARS,
        ),
        layer: layer.to_string(),
        references: vuln
            .references
            .iter()
            .take(MAX_REFERENCES)
            .cloned()
            .collect(),
    }
}

/// Select a CVSS score from the first preferred source present, taking the
/// v3 score over the v2 score within that source. Returns `0.0` when no
/// source yields a score; callers must read that as "no authoritative score
/// found", not zero severity.
pub fn extract_cvss_score(cvss: &HashMap<String, CvssEntry>) -> f64 {
    for source in CVSS_SOURCE_PREFERENCE {
        if let Some(entry) = cvss.get(source) {
            return entry.v3_score.or(entry.v2_score).unwrap_or(0.0);
        }
    }
    0.0
}

/// Count findings per severity bucket in a single pass. Labels outside the
/// named buckets increment `total` only.
pub fn summarize(findings: &[Vulnerability]) -> ScanSummary {
    let mut summary = ScanSummary::default();
    for finding in findings {
        summary.total += 1;
        match finding.severity.parse::<Severity>() {
            Ok(Severity::Critical) => summary.critical += 1,
            Ok(Severity::High) => summary.high += 1,
            Ok(Severity::Medium) => summary.medium += 1,
            Ok(Severity::Low) => summary.low += 1,
            Ok(Severity::Unknown) | Err(_) => {}
        }
    }
    summary
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
