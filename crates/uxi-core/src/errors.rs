//! Error types for the installation pipeline
//!
//! Every failure a step can hit is expressed as an [`InstallerError`]. The
//! orchestrator catches these at the step boundary, logs them together with
//! their remediation hint and turns them into an exit code. Nothing here is
//! ever allowed to escape the process as an unhandled error.

use thiserror::Error;

/// Errors that can occur while installing the application
#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("Installation cancelled by user: {prompt}")]
    UserDeclined { prompt: String },

    #[error("Environment error: {message}")]
    Environment { message: String },

    #[error("Required tool '{tool}' is not available: {reason}")]
    ToolMissing { tool: String, reason: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Command '{command}' failed with exit code {exit_code}: {output}")]
    Subprocess {
        command: String,
        exit_code: i32,
        output: String,
    },

    #[error("Shortcut registration failed: {reason}")]
    Shortcut { reason: String },

    #[error("Platform not supported: {platform}")]
    PlatformNotSupported { platform: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("I/O error during installation: {message}")]
    Io { message: String },

    #[error("Network error: {message}")]
    Network { message: String },
}

/// Release-feed and download failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Release feed {url} is unreachable: {reason}")]
    FeedUnreachable { url: String, reason: String },

    #[error("Release feed returned status code {status}")]
    FeedStatus { status: u16 },

    #[error("Release feed response could not be parsed: {reason}")]
    MalformedFeed { reason: String },

    #[error("No asset ending in '{extension}' found in the latest release")]
    NoMatchingAsset { extension: String },

    #[error("Failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error(
        "Downloaded file is too small ({size} bytes, expected at least {minimum}), \
         likely not a valid artifact"
    )]
    FileTooSmall { size: u64, minimum: u64 },
}

impl InstallerError {
    /// User-facing hint logged after the error itself
    pub fn remediation(&self, product: &str) -> Option<String> {
        match self {
            InstallerError::Environment { .. } => Some(format!(
                "Please close any applications using {} and try again",
                product
            )),
            InstallerError::Fetch(_) | InstallerError::Network { .. } => {
                Some("Please check your internet connection and try again".to_string())
            }
            InstallerError::Subprocess { .. } => {
                Some("Please check the logs for details".to_string())
            }
            _ => None,
        }
    }

    /// Whether the error terminates the run.
    ///
    /// Shortcut failures are the only warnings in the taxonomy.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, InstallerError::Shortcut { .. })
    }

    /// Create an environment error from anything displayable
    pub fn environment(message: impl Into<String>) -> Self {
        InstallerError::Environment {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for InstallerError {
    fn from(err: std::io::Error) -> Self {
        InstallerError::Io {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for InstallerError {
    fn from(err: reqwest::Error) -> Self {
        InstallerError::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for installation operations
pub type InstallationResult<T> = Result<T, InstallerError>;
