//! Top-level source directory detection for older repository layouts.
//!
//! The repository kept its sources under `grass6/`, `grass7/` and later
//! `src/`. For a commit reference, the files that commit touched reveal
//! which of these existed at the time. The lookup is one request and never
//! fails the run: anything inconclusive keeps the default.

use tracing::{debug, warn};

use crate::client::ContentsClient;

/// Top-level directory names the repository has used over time.
pub const KNOWN_TOP_LEVELS: &[&str] = &["src", "grass8", "grass7", "grass6"];

/// First known top-level directory among `files`, in listing order.
#[must_use]
pub fn pick_top_level<S: AsRef<str>>(files: &[S]) -> Option<&'static str> {
    files.iter().find_map(|file| {
        let first = file.as_ref().split('/').next()?;
        KNOWN_TOP_LEVELS.iter().copied().find(|known| *known == first)
    })
}

/// Resolve the top-level directory for `reference`, falling back to
/// `default` on any error or an inconclusive file list.
#[must_use]
pub fn resolve_top_level(client: &ContentsClient, reference: &str, default: &str) -> String {
    match client.commit_files(reference) {
        Ok(files) => match pick_top_level(&files) {
            Some(top_level) => {
                debug!(reference, top_level, "detected source layout");
                top_level.to_string()
            },
            None => {
                debug!(reference, default, "commit touches no known source dir");
                default.to_string()
            },
        },
        Err(e) => {
            warn!(reference, default, error = %e, "layout lookup failed; using default");
            default.to_string()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientOptions, Endpoints};
    use ghext_test::{MockRepo, SENTINEL_COMMIT};

    fn client_for(repo: &MockRepo) -> ContentsClient {
        ContentsClient::new(ClientOptions {
            endpoints: Endpoints {
                api_root: repo.api_root(),
                raw_root: repo.raw_root(),
                commits_root: repo.commits_root(),
            },
            user_agent: "ghext-test".to_string(),
            timeout: None,
            credentials: None,
        })
        .unwrap()
    }

    #[test]
    fn picks_first_known_dir() {
        let files = ["README.md", "grass7/vector/v.in.gbif/main.py", "src/x"];
        assert_eq!(pick_top_level(&files), Some("grass7"));
    }

    #[test]
    fn nothing_known() {
        let files = ["README.md", "tools/build.sh"];
        assert_eq!(pick_top_level(&files), None);
        assert_eq!(pick_top_level::<&str>(&[]), None);
    }

    #[test]
    fn prefix_must_be_whole_component() {
        assert_eq!(pick_top_level(&["srcs/a"]), None);
    }

    #[test]
    fn resolves_from_commit() {
        let mut repo = MockRepo::new();
        repo.commit(SENTINEL_COMMIT, &["grass7/imagery/i.sentinel/Makefile"]);
        let top = resolve_top_level(&client_for(&repo), SENTINEL_COMMIT, "src");
        assert_eq!(top, "grass7");
    }

    #[test]
    fn inconclusive_commit_keeps_default() {
        let mut repo = MockRepo::new();
        repo.commit(SENTINEL_COMMIT, &["README.md"]);
        assert_eq!(resolve_top_level(&client_for(&repo), SENTINEL_COMMIT, "src"), "src");
    }

    #[test]
    fn failed_lookup_keeps_default() {
        let repo = MockRepo::new();
        assert_eq!(resolve_top_level(&client_for(&repo), "deadbeef", "src"), "src");
    }
}
