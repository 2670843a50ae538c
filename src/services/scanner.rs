use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{config::Settings, models::ScanOptions};

#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("scanner did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("failed to launch scanner: {0}")]
    Launch(#[from] std::io::Error),
}

/// Captured output of one scanner invocation. Output is fully buffered;
/// nothing is streamed.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// Exit code, or `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ScanOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// The subprocess seam of the scan pipeline.
///
/// The pipeline depends on this trait rather than on a concrete binary so
/// tests can inject a scripted implementation and so the scanner handle is
/// passed explicitly instead of read from ambient process state.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Run a full image scan, bounded by the primary timeout.
    async fn run_scan(&self, options: &ScanOptions) -> Result<ScanOutput, ScannerError>;

    /// Query the tool version, bounded by the short secondary timeout.
    /// Callers treat any failure here as non-fatal.
    async fn version(&self) -> Result<String, ScannerError>;
}

/// Production scanner invoking the Trivy CLI.
pub struct TrivyCli {
    binary: String,
    cache_dir: String,
    scan_timeout: Duration,
    version_timeout: Duration,
}

impl TrivyCli {
    pub fn new(settings: &Settings) -> Self {
        Self {
            binary: settings.trivy_path.clone(),
            cache_dir: settings.trivy_cache_dir.clone(),
            scan_timeout: Duration::from_secs(settings.scan_timeout_seconds),
            version_timeout: Duration::from_secs(settings.version_timeout_seconds),
        }
    }

    fn scan_args(options: &ScanOptions, cache_dir: &str) -> Vec<String> {
        let mut args = vec![
            "image".to_string(),
            "--format".to_string(),
            "json".to_string(),
            "--quiet".to_string(),
            "--severity".to_string(),
            options.severity_flag(),
            "--cache-dir".to_string(),
            cache_dir.to_string(),
        ];
        if options.ignore_unfixed {
            args.push("--ignore-unfixed".to_string());
        }
        args.push(options.image.clone());
        args
    }

    async fn run(&self, args: &[String], timeout: Duration) -> Result<ScanOutput, ScannerError> {
        let mut cmd = Command::new(&self.binary);
        // kill_on_drop ensures an elapsed timeout terminates the child
        cmd.args(args).kill_on_drop(true);

        let output = tokio::time::timeout(timeout, cmd.output())
            .await
            .map_err(|_| ScannerError::TimedOut(timeout))??;

        Ok(ScanOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[async_trait]
impl Scanner for TrivyCli {
    async fn run_scan(&self, options: &ScanOptions) -> Result<ScanOutput, ScannerError> {
        let args = Self::scan_args(options, &self.cache_dir);
        tracing::debug!(
            image = %options.image,
            severity = %options.severity_flag(),
            ignore_unfixed = options.ignore_unfixed,
            "invoking trivy"
        );
        self.run(&args, self.scan_timeout).await
    }

    async fn version(&self) -> Result<String, ScannerError> {
        let output = self.run(&["--version".to_string()], self.version_timeout).await?;
        Ok(output
            .stdout
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}
