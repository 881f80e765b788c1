//! Constants for the download module.

/// Timeout for initiating a download, i.e. until response headers
/// arrive (100 seconds). Body streaming has no timeout once started.
pub const DOWNLOAD_INIT_TIMEOUT_SECS: u64 = 100;

/// Formats downloaded when neither the caller nor the configuration
/// names any.
pub const DEFAULT_FORMATS: &[&str] = &["pdf", "mobi", "epub", "code"];

/// Extension used when saving the companion source-code archive.
pub const CODE_ARCHIVE_EXTENSION: &str = "zip";
