//! The package manager that performs the actual install or removal.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::str::FromStr;

use tracing::{debug, info};

use crate::error::{InstallError, InstallResult};

/// What the installer should do with the extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Operation {
    /// Install (or reinstall) the extension.
    #[default]
    Add,
    /// Remove an installed extension.
    Remove,
}

impl Operation {
    /// The installer's name for this operation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            other => Err(format!("unknown operation '{other}' (expected add or remove)")),
        }
    }
}

/// One installer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Extension name, e.g. `i.sentinel`.
    pub extension: String,
    /// Add or remove.
    pub operation: Operation,
    /// Local source tree. `None` lets the installer resolve the extension
    /// by name itself.
    pub source_path: Option<PathBuf>,
    /// Install for all users.
    pub system_wide: bool,
    /// Remove without confirmation.
    pub force_remove: bool,
}

/// Performs installs and removals.
pub trait Installer {
    /// Run one request to completion.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::InstallerFailure`] if the installer cannot be
    /// started or reports failure.
    fn run(&self, request: &InstallRequest) -> InstallResult<()>;
}

/// Runs an external `g.extension`-style command.
///
/// The command line is `<command> [-sf] extension=<name> operation=<op>
/// [url=<source_path>]`, with stdio inherited from this process.
#[derive(Debug, Clone)]
pub struct ProcessInstaller {
    command: String,
}

impl ProcessInstaller {
    /// Create an installer running `command`.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The configured command.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Arguments passed to the command for `request`.
    #[must_use]
    pub fn arguments(request: &InstallRequest) -> Vec<String> {
        let mut args = Vec::with_capacity(4);

        let mut flags = String::new();
        if request.system_wide {
            flags.push('s');
        }
        if request.force_remove {
            flags.push('f');
        }
        if !flags.is_empty() {
            args.push(format!("-{flags}"));
        }

        args.push(format!("extension={}", request.extension));
        args.push(format!("operation={}", request.operation));
        if let Some(path) = &request.source_path {
            args.push(format!("url={}", path.display()));
        }
        args
    }

    fn failure(&self, code: Option<i32>, message: impl Into<String>) -> InstallError {
        InstallError::InstallerFailure {
            command: self.command.clone(),
            code,
            message: message.into(),
        }
    }
}

impl Installer for ProcessInstaller {
    fn run(&self, request: &InstallRequest) -> InstallResult<()> {
        let program = which::which(&self.command)
            .map_err(|e| self.failure(None, format!("not found on PATH: {e}")))?;
        let args = Self::arguments(request);

        info!(
            extension = %request.extension,
            operation = %request.operation,
            "running installer"
        );
        debug!(program = %program.display(), ?args, "installer command line");

        let status = Command::new(&program)
            .args(&args)
            .status()
            .map_err(|e| self.failure(None, format!("failed to start: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(self.failure(status.code(), format!("exited with {status}")))
        }
    }
}
