//! One run: validate, optionally fetch, then hand over to the installer.
//!
//! Removals and installs from the default reference go straight to the
//! installer, which resolves the extension by name. Any other reference
//! is fetched into a scratch directory owned by the caller's [`RunScope`]
//! and passed to the installer as a local source path.

use std::path::PathBuf;

use ghext_fetch::{
    ContentsClient, ExtensionPath, FetchRequest, FetchSummary, TreeFetcher, resolve_top_level,
    validate_extension_name, validate_git_ref,
};
use tracing::{debug, info};

use crate::error::{InstallError, InstallResult};
use crate::installer::{InstallRequest, Installer, Operation};
use crate::scope::RunScope;


/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Extension name, e.g. `i.sentinel`.
    pub extension: String,
    /// Add or remove.
    pub operation: Operation,
    /// Branch, tag, or commit to install from.
    pub reference: String,
    /// Install for all users.
    pub system_wide: bool,
    /// Remove without confirmation.
    pub force_remove: bool,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The request handed to the installer.
    pub install: InstallRequest,
    /// Fetch statistics, when a tree was fetched.
    pub fetched: Option<FetchSummary>,
}

/// Drives fetch and install for single runs.
#[derive(Debug, Clone)]
pub struct Pipeline<I> {
    client: ContentsClient,
    installer: I,
    default_reference: String,
    top_level: String,
    legacy_layout_lookup: bool,
}

impl<I: Installer> Pipeline<I> {
    /// Create a pipeline with default reference `main` and top-level
    /// directory `src`.
    #[must_use]
    pub fn new(client: ContentsClient, installer: I) -> Self {
        Self {
            client,
            installer,
            default_reference: "main".to_string(),
            top_level: "src".to_string(),
            legacy_layout_lookup: false,
        }
    }

    /// Reference the installer can resolve on its own.
    #[must_use]
    pub fn with_default_reference(mut self, reference: impl Into<String>) -> Self {
        self.default_reference = reference.into();
        self
    }

    /// Top-level source directory used when no lookup applies.
    #[must_use]
    pub fn with_top_level(mut self, top_level: impl Into<String>) -> Self {
        self.top_level = top_level.into();
        self
    }

    /// Look up the top-level directory from the reference's commit.
    #[must_use]
    pub fn with_legacy_layout_lookup(mut self, enabled: bool) -> Self {
        self.legacy_layout_lookup = enabled;
        self
    }

    /// The installer in use.
    #[must_use]
    pub fn installer(&self) -> &I {
        &self.installer
    }

    /// Whether `request` is handled by the installer alone.
    #[must_use]
    pub fn bypasses_fetch(&self, request: &RunRequest) -> bool {
        match request.operation {
            Operation::Remove => true,
            Operation::Add => request.reference == self.default_reference,
        }
    }

    /// Execute one run. Scratch directories are registered in `scope`;
    /// dropping the scope removes them.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Invalid`] for a bad extension name or
    /// reference, [`InstallError::Fetch`] if the tree cannot be fetched
    /// (the installer is not run), and [`InstallError::InstallerFailure`]
    /// if the installer fails.
    pub fn execute(&self, request: &RunRequest, scope: &mut RunScope) -> InstallResult<RunOutcome> {
        validate_extension_name(&request.extension).map_err(InstallError::Invalid)?;

        if self.bypasses_fetch(request) {
            debug!(
                extension = %request.extension,
                operation = %request.operation,
                "installer resolves extension by name"
            );
            let install = install_request(request, None);
            self.installer.run(&install)?;
            return Ok(RunOutcome {
                install,
                fetched: None,
            });
        }

        validate_git_ref(&request.reference).map_err(InstallError::Invalid)?;

        let top_level = if self.legacy_layout_lookup {
            resolve_top_level(&self.client, &request.reference, &self.top_level)
        } else {
            self.top_level.clone()
        };
        let path = ExtensionPath::new(top_level, request.extension.as_str());
        let repo_path = path.repo_path();
        let scratch = scope.scratch_dir()?;

        let fetcher = TreeFetcher::new(self.client.clone(), path.strip_components());
        let summary = fetcher
            .fetch(&FetchRequest::new(&repo_path, &request.reference), &scratch)
            .map_err(|source| InstallError::Fetch {
                repo_path: repo_path.clone(),
                reference: request.reference.clone(),
                source,
            })?;
        info!(
            extension = %request.extension,
            reference = %request.reference,
            files = summary.files,
            "extension fetched"
        );

        let install = install_request(request, Some(summary.root.clone()));
        self.installer.run(&install)?;
        Ok(RunOutcome {
            install,
            fetched: Some(summary),
        })
    }
}

fn install_request(request: &RunRequest, source_path: Option<PathBuf>) -> InstallRequest {
    InstallRequest {
        extension: request.extension.clone(),
        operation: request.operation,
        source_path,
        system_wide: request.system_wide,
        force_remove: request.force_remove,
    }
}
