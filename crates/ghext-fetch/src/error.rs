//! Fetch error types.

use std::path::PathBuf;

/// Errors from contents API access and tree materialization.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Only part of the credential pair is configured, or none of it.
    /// Callers log this and continue anonymously.
    #[error("no API credentials: {missing} not set")]
    AuthConfigurationMissing {
        /// Names of the unset environment variables.
        missing: String,
    },

    /// The repository path or the reference does not exist remotely.
    #[error("'{repo_path}' not found at reference '{reference}' (HTTP {status})")]
    RemoteNotFound {
        /// Repository path that was searched.
        repo_path: String,
        /// Branch, tag, or commit that was searched.
        reference: String,
        /// HTTP status returned by the host.
        status: u16,
    },

    /// The API answered with a body of unexpected shape.
    #[error("malformed response from {url}: {message}")]
    MalformedResponse {
        /// Requested URL.
        url: String,
        /// Underlying parse error.
        message: String,
    },

    /// Transport failure or an unexpected HTTP status.
    #[error("request to {url} failed: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// Failure description.
        message: String,
    },

    /// HTTP client construction failed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// A configured root or derived URL could not be parsed.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
        /// Parse error.
        message: String,
    },

    /// A listing entry points outside the requested subtree.
    #[error("unsafe remote path: {path}")]
    UnsafePath {
        /// The offending entry path.
        path: String,
    },

    /// Extension name failed validation.
    #[error("invalid extension name '{name}': {reason}")]
    InvalidExtension {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Git reference failed validation.
    #[error("invalid reference '{reference}': {reason}")]
    InvalidReference {
        /// The rejected reference.
        reference: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Local filesystem failure while writing the tree.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path being created or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Whether this error means the remote path or reference does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RemoteNotFound { .. })
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
