pub mod normalizer;
pub mod scan_service;
pub mod scanner;

// Re-export commonly used types
pub use scan_service::ScanService;
pub use scanner::{ScanOutput, Scanner, ScannerError, TrivyCli};
