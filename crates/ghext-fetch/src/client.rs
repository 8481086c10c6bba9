//! Blocking client for the contents, raw and commit-detail endpoints.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::listing::{CommitDetail, ListingEntry};

/// HTTP Basic credentials for the hosting API.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from explicit values.
    #[must_use]
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    /// Read credentials through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::AuthConfigurationMissing`] unless both variables
    /// resolve to non-empty values.
    pub fn from_lookup<F>(username_var: &str, token_var: &str, lookup: F) -> FetchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        match (get(username_var), get(token_var)) {
            (Some(username), Some(token)) => Ok(Self { username, token }),
            (user, token) => {
                let missing: Vec<&str> = [(username_var, user.is_none()), (token_var, token.is_none())]
                    .into_iter()
                    .filter_map(|(name, absent)| absent.then_some(name))
                    .collect();
                Err(FetchError::AuthConfigurationMissing {
                    missing: missing.join(" and "),
                })
            },
        }
    }

    /// Resolve credentials from the environment, logging and falling back
    /// to anonymous access when they are incomplete.
    #[must_use]
    pub fn resolve_or_anonymous(username_var: &str, token_var: &str) -> Option<Self> {
        Self::resolve_with(username_var, token_var, |name| std::env::var(name).ok())
    }

    /// [`Self::resolve_or_anonymous`] with an explicit variable lookup.
    #[must_use]
    pub fn resolve_with<F>(username_var: &str, token_var: &str, lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let partial = lookup(username_var).is_some() || lookup(token_var).is_some();
        match Self::from_lookup(username_var, token_var, lookup) {
            Ok(credentials) => {
                debug!(username = %credentials.username, "using authenticated API access");
                Some(credentials)
            },
            Err(e) if partial => {
                warn!(error = %e, "incomplete API credentials; using anonymous access");
                None
            },
            Err(e) => {
                info!(error = %e, "using anonymous API access (rate limits apply)");
                None
            },
        }
    }
}

/// Base URLs of the three endpoints the fetcher talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Contents listing API root; listings live at `{api_root}/{path}?ref=..`.
    pub api_root: String,
    /// Raw file root; files live at `{raw_root}/{ref}/{path}`.
    pub raw_root: String,
    /// Commit-detail API root; commits live at `{commits_root}/{ref}`.
    pub commits_root: String,
}

/// Builder-style options for [`ContentsClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Endpoint roots.
    pub endpoints: Endpoints,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Per-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// Basic credentials, or `None` for anonymous access.
    pub credentials: Option<Credentials>,
}

/// Synchronous client for the hosting service.
#[derive(Debug, Clone)]
pub struct ContentsClient {
    http: Client,
    endpoints: Endpoints,
    credentials: Option<Credentials>,
}

impl ContentsClient {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be created.
    pub fn new(options: ClientOptions) -> FetchResult<Self> {
        let mut builder = Client::builder()
            .user_agent(options.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10));
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoints: options.endpoints,
            credentials: options.credentials,
        })
    }

    /// Whether requests carry credentials.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// List the entries of `repo_path` at `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RemoteNotFound`] for 404/422 responses,
    /// [`FetchError::MalformedResponse`] if the body is not a JSON array of
    /// entries, and [`FetchError::Http`] for transport failures or other
    /// non-success statuses.
    pub fn list(&self, repo_path: &str, reference: &str) -> FetchResult<Vec<ListingEntry>> {
        let mut url = endpoint_url(&self.endpoints.api_root, repo_path.split('/'))?;
        url.query_pairs_mut().append_pair("ref", reference);

        debug!(%url, "listing directory");
        let response = self.send(&url, repo_path, reference)?;
        read_json(response, &url)
    }

    /// Download the raw bytes of the file at `path` and `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::RemoteNotFound`] if the file is absent and
    /// [`FetchError::Http`] for any other failure.
    pub fn raw(&self, path: &str, reference: &str) -> FetchResult<Vec<u8>> {
        let url = endpoint_url(
            &self.endpoints.raw_root,
            reference.split('/').chain(path.split('/')),
        )?;

        let response = self.send(&url, path, reference)?;
        let bytes = response.bytes().map_err(|e| FetchError::Http {
            url: url.to_string(),
            message: format!("failed to read body: {e}"),
        })?;
        Ok(bytes.to_vec())
    }

    /// File paths changed by the commit `reference` points at.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::list`].
    pub fn commit_files(&self, reference: &str) -> FetchResult<Vec<String>> {
        let url = endpoint_url(&self.endpoints.commits_root, reference.split('/'))?;

        debug!(%url, "looking up commit");
        let response = self.send(&url, "<commit>", reference)?;
        let detail: CommitDetail = read_json(response, &url)?;
        Ok(detail.files.into_iter().map(|f| f.filename).collect())
    }

    /// Send a GET and classify the status.
    fn send(&self, url: &Url, repo_path: &str, reference: &str) -> FetchResult<Response> {
        let mut request = self.http.get(url.clone());
        if let Some(c) = &self.credentials {
            request = request.basic_auth(&c.username, Some(&c.token));
        }

        let response = request.send().map_err(|e| FetchError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(FetchError::RemoteNotFound {
                repo_path: repo_path.to_string(),
                reference: reference.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                message: format!("HTTP {status}"),
            });
        }
        Ok(response)
    }
}

fn parse_url(raw: &str) -> FetchResult<Url> {
    Url::parse(raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })
}

/// `root` with `segments` appended, each percent-encoded as one path
/// segment.
fn endpoint_url<'a>(root: &str, segments: impl IntoIterator<Item = &'a str>) -> FetchResult<Url> {
    let mut url = parse_url(root)?;
    url.path_segments_mut()
        .map_err(|()| FetchError::InvalidUrl {
            url: root.to_string(),
            message: "cannot be a base URL".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn read_json<T: DeserializeOwned>(response: Response, url: &Url) -> FetchResult<T> {
    let body = response.bytes().map_err(|e| FetchError::Http {
        url: url.to_string(),
        message: format!("failed to read body: {e}"),
    })?;
    serde_json::from_slice(&body).map_err(|e| FetchError::MalformedResponse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn credentials_need_both_vars() {
        let c = Credentials::from_lookup("U", "T", lookup(&[("U", "me"), ("T", "secret")]));
        assert!(c.is_ok());

        let err = Credentials::from_lookup("U", "T", lookup(&[("U", "me")])).unwrap_err();
        assert!(matches!(err, FetchError::AuthConfigurationMissing { ref missing } if missing == "T"));

        let err = Credentials::from_lookup("U", "T", lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("U and T"));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let c = Credentials::from_lookup("U", "T", lookup(&[("U", "me"), ("T", "")]));
        assert!(c.is_err());
    }

    #[test]
    fn resolve_falls_back_to_anonymous() {
        assert!(Credentials::resolve_with("U", "T", lookup(&[("T", "secret")])).is_none());
        assert!(Credentials::resolve_with("U", "T", lookup(&[("U", "a"), ("T", "b")])).is_some());
    }

    #[test]
    fn debug_redacts_token() {
        let c = Credentials::new("me", "hunter2");
        let shown = format!("{c:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("me"));
    }

    #[test]
    fn list_url_carries_ref_query() {
        let mut url =
            endpoint_url("https://api.example.com/contents", "src/imagery/i.sentinel".split('/'))
                .unwrap();
        url.query_pairs_mut().append_pair("ref", "feature/x y");
        assert_eq!(
            url.as_str(),
            "https://api.example.com/contents/src/imagery/i.sentinel?ref=feature%2Fx+y"
        );
    }

    #[test]
    fn path_segments_are_escaped() {
        let url = endpoint_url(
            "https://raw.example.com/repo",
            ["main", "src", "a#b?c d%41.txt"],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://raw.example.com/repo/main/src/a%23b%3Fc%20d%2541.txt"
        );
        assert!(url.fragment().is_none());
        assert!(url.query().is_none());
    }

    #[test]
    fn trailing_slash_on_root_is_tolerated() {
        let url = endpoint_url("https://api.example.com/commits/", ["abc"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/commits/abc");
    }

    #[test]
    fn non_base_root_is_rejected() {
        let err = endpoint_url("mailto:someone@example.com", ["x"]).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
