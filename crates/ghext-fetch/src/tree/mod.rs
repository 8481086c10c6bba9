//! Recursive materialization of a remote subtree.
//!
//! The contents API lists one directory per call. Directories are walked
//! depth-first in listing order and every file is written under the
//! destination with its leading path components stripped, so that
//! `src/imagery/i.sentinel/Makefile` lands at `<dest>/i.sentinel/Makefile`
//! when two components are stripped.
//!
//! Directories are only created as parents of written files; an empty
//! remote directory leaves nothing behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::client::ContentsClient;
use crate::error::{FetchError, FetchResult};

#[cfg(test)]
mod tests;

/// What to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Repository-relative directory, e.g. `src/imagery/i.sentinel`.
    pub repo_path: String,
    /// Branch, tag, or commit hash.
    pub reference: String,
}

impl FetchRequest {
    /// Create a request.
    #[must_use]
    pub fn new(repo_path: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
            reference: reference.into(),
        }
    }
}

/// Outcome of a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    /// Local directory corresponding to the requested repository path.
    pub root: PathBuf,
    /// Number of files written.
    pub files: usize,
    /// Number of remote directories listed, including the root.
    pub directories: usize,
}

/// Walks a remote directory and mirrors its files locally.
#[derive(Debug, Clone)]
pub struct TreeFetcher {
    client: ContentsClient,
    strip_components: usize,
}

impl TreeFetcher {
    /// Create a fetcher that drops `strip_components` leading components
    /// from every remote path.
    #[must_use]
    pub fn new(client: ContentsClient, strip_components: usize) -> Self {
        Self {
            client,
            strip_components,
        }
    }

    /// Fetch every file under `request.repo_path` into `destination`.
    ///
    /// Stops at the first failure. Files already written stay on disk;
    /// removing the destination is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns the first listing, download, path-safety, or write error.
    pub fn fetch(&self, request: &FetchRequest, destination: &Path) -> FetchResult<FetchSummary> {
        let repo_path = request.repo_path.trim_matches('/');
        let root = match strip(repo_path, self.strip_components)? {
            Some(relative) => destination.join(relative),
            None => destination.to_path_buf(),
        };

        info!(
            repo_path,
            reference = %request.reference,
            destination = %destination.display(),
            authenticated = self.client.is_authenticated(),
            "fetching extension tree"
        );

        let mut summary = FetchSummary {
            root,
            files: 0,
            directories: 0,
        };
        self.walk(repo_path, &request.reference, destination, &mut summary)?;

        info!(
            files = summary.files,
            directories = summary.directories,
            root = %summary.root.display(),
            "fetch complete"
        );
        Ok(summary)
    }

    fn walk(
        &self,
        dir: &str,
        reference: &str,
        destination: &Path,
        summary: &mut FetchSummary,
    ) -> FetchResult<()> {
        let entries = self.client.list(dir, reference)?;
        summary.directories = summary.directories.saturating_add(1);
        debug!(dir, entries = entries.len(), "listed directory");

        for entry in entries {
            if entry.is_dir() {
                check_entry(&entry.path, dir, self.strip_components)?;
                self.walk(&entry.path, reference, destination, summary)?;
                continue;
            }

            let target = destination.join(local_relative(&entry.path, dir, self.strip_components)?);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|source| FetchError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            let bytes = self.client.raw(&entry.path, reference)?;
            fs::write(&target, &bytes).map_err(|source| FetchError::Io {
                path: target.clone(),
                source,
            })?;
            summary.files = summary.files.saturating_add(1);
            trace!(path = %entry.path, bytes = bytes.len(), "wrote file");
        }
        Ok(())
    }
}

/// Reject an entry that [`local_relative`] would not map to a local path.
///
/// Directories are checked before they are listed so that a foreign or
/// traversing path never reaches the API.
fn check_entry(entry_path: &str, dir: &str, strip_components: usize) -> FetchResult<()> {
    local_relative(entry_path, dir, strip_components).map(drop)
}

/// Local path of a listing entry, relative to the destination.
///
/// The entry must be a direct child of `dir` and keep at least one
/// component after stripping.
fn local_relative(entry_path: &str, dir: &str, strip_components: usize) -> FetchResult<PathBuf> {
    let unsafe_path = || FetchError::UnsafePath {
        path: entry_path.to_string(),
    };

    let name = entry_path
        .strip_prefix(dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(unsafe_path)?;
    if name.is_empty() || name.contains('/') {
        return Err(unsafe_path());
    }

    strip(entry_path, strip_components)?.ok_or_else(unsafe_path)
}

/// Drop `count` leading components. `None` if nothing remains.
fn strip(path: &str, count: usize) -> FetchResult<Option<PathBuf>> {
    let components: Vec<&str> = path.split('/').collect();
    if components
        .iter()
        .any(|c| c.is_empty() || *c == "." || *c == ".." || c.contains('\\'))
    {
        return Err(FetchError::UnsafePath {
            path: path.to_string(),
        });
    }
    Ok(components
        .get(count..)
        .filter(|rest| !rest.is_empty())
        .map(|rest| rest.iter().collect()))
}
