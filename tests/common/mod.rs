use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use tokio::sync::Mutex;

use vulnscan_api::{
    config::Settings,
    create_router,
    models::ScanOptions,
    services::{ScanOutput, Scanner, ScannerError},
    AppState,
};

/// Scripted scanner for integration tests. Scan outcomes are consumed in
/// order; the version behavior is fixed per instance.
pub struct MockScanner {
    scans: Mutex<Vec<Result<ScanOutput, ScannerError>>>,
    version: Option<String>,
    pub seen_options: Mutex<Vec<ScanOptions>>,
}

impl MockScanner {
    pub fn new() -> Self {
        Self {
            scans: Mutex::new(Vec::new()),
            version: Some("Version: 0.52.0".to_string()),
            seen_options: Mutex::new(Vec::new()),
        }
    }

    pub fn with_scan(self, outcome: Result<ScanOutput, ScannerError>) -> Self {
        self.scans.try_lock().unwrap().push(outcome);
        self
    }

    pub fn without_version(mut self) -> Self {
        self.version = None;
        self
    }
}

#[async_trait]
impl Scanner for MockScanner {
    async fn run_scan(&self, options: &ScanOptions) -> Result<ScanOutput, ScannerError> {
        self.seen_options.lock().await.push(options.clone());
        self.scans.lock().await.remove(0)
    }

    async fn version(&self) -> Result<String, ScannerError> {
        match &self.version {
            Some(version) => Ok(version.clone()),
            None => Err(ScannerError::TimedOut(Duration::from_secs(10))),
        }
    }
}

/// Test configuration with deterministic values, bypassing the environment
pub fn test_settings() -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        trivy_path: "/usr/local/bin/trivy".to_string(),
        trivy_cache_dir: "/tmp/trivy-cache".to_string(),
        scan_timeout_seconds: 280,
        version_timeout_seconds: 10,
        default_image: "nginx:latest".to_string(),
        cors_allow_origins: vec!["*".to_string()],
        log_level: "error".to_string(),
        log_format: "plain".to_string(),
    }
}

/// Create a test application instance around a scripted scanner
pub fn create_test_app(scanner: Arc<MockScanner>) -> Router {
    let app_state = AppState::with_scanner(test_settings(), scanner);
    create_router(app_state)
}

pub async fn extract_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body")
        .to_vec()
}

/// Build a POST /api/scan request with a JSON body
pub fn scan_request(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri("/api/scan")
        .method(Method::POST)
        .header("content-type", "application/json")
        .header("origin", "http://dashboard.example.com")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn scan_output(exit_code: i32, stdout: &str, stderr: &str) -> ScanOutput {
    ScanOutput {
        exit_code: Some(exit_code),
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

/// A realistic two-target scanner report fixture
pub fn sample_trivy_json() -> String {
    serde_json::json!({
        "SchemaVersion": 2,
        "ArtifactName": "nginx:latest",
        "Results": [
            {
                "Target": "nginx:latest (debian 12.5)",
                "Class": "os-pkgs",
                "Vulnerabilities": [
                    {
                        "VulnerabilityID": "CVE-2024-0001",
                        "PkgName": "openssl",
                        "InstalledVersion": "3.0.11-1",
                        "FixedVersion": "3.0.13-1",
                        "Severity": "CRITICAL",
                        "Description": "A flaw was found in OpenSSL.",
                        "CVSS": {
                            "nvd": { "V3Score": 9.8 },
                            "redhat": { "V3Score": 9.1 }
                        },
                        "References": [
                            "https://nvd.nist.gov/vuln/detail/CVE-2024-0001",
                            "https://access.redhat.com/security/cve/CVE-2024-0001"
                        ]
                    },
                    {
                        "VulnerabilityID": "CVE-2024-0002",
                        "PkgName": "zlib",
                        "InstalledVersion": "1.2.13-1",
                        "Severity": "HIGH",
                        "Description": "Heap overflow in inflate.",
                        "CVSS": {
                            "redhat": { "V2Score": 6.8 }
                        },
                        "References": []
                    }
                ]
            },
            {
                "Target": "usr/share/nginx/html/app",
                "Class": "lang-pkgs",
                "Vulnerabilities": [
                    {
                        "VulnerabilityID": "CVE-2024-0003",
                        "PkgName": "lodash",
                        "InstalledVersion": "4.17.20",
                        "Severity": "MEDIUM",
                        "Description": "Prototype pollution."
                    }
                ]
            }
        ]
    })
    .to_string()
}
