//! Response bodies of the contents and commit-detail APIs.

use serde::Deserialize;

/// One element of a contents listing.
///
/// Only `path` and `download_url` are consulted; the API's `type` field is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListingEntry {
    /// Full repository-relative path.
    pub path: String,
    /// Raw download location. `None` (null or absent) marks a directory.
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ListingEntry {
    /// Whether this entry is a directory to descend into.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.download_url.is_none()
    }
}

/// The subset of a commit-detail response used for layout detection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitDetail {
    /// Files touched by the commit.
    #[serde(default)]
    pub files: Vec<CommitFile>,
}

/// One changed file of a commit.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitFile {
    /// Repository-relative path.
    pub filename: String,
}
