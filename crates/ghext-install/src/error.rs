//! Install error types.

use ghext_fetch::FetchError;

/// Errors from the run pipeline and the installer collaborator.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Extension name or reference failed validation.
    #[error(transparent)]
    Invalid(FetchError),

    /// The extension tree could not be fetched.
    #[error(
        "could not find extension in repository: searched repo path '{repo_path}' for reference '{reference}'"
    )]
    Fetch {
        /// Repository path that was searched.
        repo_path: String,
        /// Branch, tag, or commit that was searched.
        reference: String,
        /// Underlying fetch error.
        #[source]
        source: FetchError,
    },

    /// A scratch directory could not be created.
    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    /// The installer could not be spawned or exited unsuccessfully.
    #[error("installer '{command}' failed: {message}")]
    InstallerFailure {
        /// Installer command.
        command: String,
        /// Exit status, if the process ran to completion.
        code: Option<i32>,
        /// Failure description.
        message: String,
    },
}

impl InstallError {
    /// Process exit status to report for this error.
    ///
    /// Installer exit codes pass through when they fit a `u8`; everything
    /// else is 1.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InstallerFailure {
                code: Some(code), ..
            } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

/// Result type for install operations.
pub type InstallResult<T> = Result<T, InstallError>;
