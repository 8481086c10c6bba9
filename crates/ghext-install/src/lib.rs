//! Installer collaborator and run pipeline.
//!
//! A run validates its input, fetches the extension tree when the
//! installer cannot resolve it by name, and invokes the installer once.
//! [`RunScope`] owns the scratch directories and removes them when the run
//! ends, successfully or not.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod installer;
pub mod pipeline;
pub mod scope;

pub use error::{InstallError, InstallResult};
pub use installer::{InstallRequest, Installer, Operation, ProcessInstaller};
pub use pipeline::{Pipeline, RunOutcome, RunRequest};
pub use scope::RunScope;
