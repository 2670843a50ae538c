//! serde mirrors of the scanner's raw JSON output.
//!
//! Only the fields the normalizer consumes are modeled; everything else in
//! the report is ignored during deserialization. None of these types
//! outlive normalization.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrivyReport {
    #[serde(rename = "Results", default)]
    pub results: Vec<TrivyResult>,
}

/// One scan target (an image layer, filesystem path, or artifact unit).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrivyResult {
    #[serde(rename = "Target")]
    pub target: Option<String>,
    #[serde(rename = "Vulnerabilities", default)]
    pub vulnerabilities: Vec<TrivyVulnerability>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrivyVulnerability {
    #[serde(rename = "VulnerabilityID")]
    pub vulnerability_id: Option<String>,
    #[serde(rename = "PkgName")]
    pub pkg_name: Option<String>,
    #[serde(rename = "InstalledVersion")]
    pub installed_version: Option<String>,
    #[serde(rename = "FixedVersion")]
    pub fixed_version: Option<String>,
    #[serde(rename = "Severity")]
    pub severity: Option<String>,
    /// Scores keyed by advisory source (`nvd`, `redhat`, `ghsa`, ...).
    #[serde(rename = "CVSS", default)]
    pub cvss: HashMap<String, CvssEntry>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "References", default)]
    pub references: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CvssEntry {
    #[serde(rename = "V3Score")]
    pub v3_score: Option<f64>,
    #[serde(rename = "V2Score")]
    pub v2_score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_report_with_unknown_fields() {
        let raw = serde_json::json!({
            "SchemaVersion": 2,
            "ArtifactName": "alpine:3.19",
            "Results": [
                {
                    "Target": "alpine:3.19 (alpine 3.19.1)",
                    "Class": "os-pkgs",
                    "Vulnerabilities": [
                        {
                            "VulnerabilityID": "CVE-2024-0001",
                            "PkgName": "openssl",
                            "InstalledVersion": "3.1.4-r5",
                            "Severity": "HIGH",
                            "CVSS": {
                                "nvd": { "V3Score": 7.5, "V3Vector": "CVSS:3.1/..." }
                            }
                        }
                    ]
                }
            ]
        });
        let report: TrivyReport = serde_json::from_value(raw).unwrap();
        assert_eq!(report.results.len(), 1);
        let vuln = &report.results[0].vulnerabilities[0];
        assert_eq!(vuln.vulnerability_id.as_deref(), Some("CVE-2024-0001"));
        assert_eq!(vuln.cvss["nvd"].v3_score, Some(7.5));
        assert_eq!(vuln.fixed_version, None);
    }

    #[test]
    fn test_deserialize_result_without_vulnerabilities() {
        let raw = serde_json::json!({
            "Results": [ { "Target": "usr/share/app" } ]
        });
        let report: TrivyReport = serde_json::from_value(raw).unwrap();
        assert!(report.results[0].vulnerabilities.is_empty());
    }
}
