use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - no issues detected, or all below the fail-on severity
    Success = 0,
    /// Issues at or above the configured fail-on severity were detected
    IssuesDetected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (configuration, network, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::IssuesDetected => write!(f, "Issues Detected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Scan orchestration errors.
///
/// Every variant except `CacheDirectory` is scoped to a single scan manager
/// and is logged at the manager boundary instead of being propagated to the
/// registry.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Vulnerability service is not configured: {reason}\n\n💡 Hint: Set the server URL and credentials in workspace-scan.config.yml or via WORKSPACE_SCAN_URL / WORKSPACE_SCAN_USER / WORKSPACE_SCAN_PASSWORD")]
    Configuration { reason: String },

    #[error("Failed to resolve {ecosystem} dependencies in {path}\nDetails: {details}\n\n💡 Hint: Verify that the {ecosystem} tooling is installed and that the project builds locally")]
    Discovery {
        ecosystem: String,
        path: PathBuf,
        details: String,
    },

    #[error("Vulnerability service request failed: {0}")]
    Service(#[from] ServiceError),

    #[error("Failed to create cache directory: {path}\nDetails: {details}\n\n💡 Hint: Please verify that you have write permissions or choose another cache_dir")]
    CacheDirectory { path: PathBuf, details: String },

    #[error("Invalid workspace path: {path}\nReason: {reason}\n\n💡 Hint: Please specify a valid workspace directory")]
    InvalidWorkspacePath { path: PathBuf, reason: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Dependency tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Scan was cancelled")]
    Cancelled,
}

impl ScanError {
    /// Cancellation is reported as a normal return to idle, not as a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ScanError::Cancelled)
    }
}

/// Failures reported by the vulnerability-intelligence service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("could not connect to {url}: {details}\n\n💡 Hint: Please check your network connection and proxy settings")]
    Connection { url: String, details: String },

    #[error("authentication failed against {url} (HTTP {status})\n\n💡 Hint: Please verify the configured username, password or access token")]
    Authentication { url: String, status: u16 },

    #[error("unsupported server version {found} (minimum required: {required})\n\n💡 Hint: Please upgrade the vulnerability service")]
    UnsupportedVersion { found: String, required: String },

    #[error("unexpected response from {url}: {details}")]
    InvalidResponse { url: String, details: String },
}

/// Structural errors of the dependency tree arena.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node {child} already exists under parent {parent}")]
    DuplicateChild { parent: String, child: String },

    #[error("tree is sealed: structural changes are not allowed once merge has started")]
    Sealed,

    #[error("node {0} is already attached to a parent")]
    AlreadyAttached(String),

    #[error("attaching {0} would create a cycle")]
    Cycle(String),

    #[error("unknown node id {0}")]
    UnknownNode(usize),
}
