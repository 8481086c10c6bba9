//! In-process stand-in for the hosting service.
//!
//! Serves the three endpoints the fetcher uses under one mock server:
//!
//! - `{url}/contents/<dir>?ref=<reference>`: directory listings
//! - `{url}/raw/<reference>/<path>`: file bytes
//! - `{url}/commits/<reference>`: commit details
//!
//! Mock paths are registered percent-encoded, the way the client sends
//! them. Requests that match no registered mock get mockito's 501 response.

use std::collections::{BTreeMap, BTreeSet};

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{Value, json};
use url::Url;

/// A mock repository server with registered listings and files.
pub struct MockRepo {
    server: ServerGuard,
    mocks: Vec<Mock>,
    auth: Option<Matcher>,
}

impl Default for MockRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRepo {
    /// Start a fresh server.
    #[must_use]
    pub fn new() -> Self {
        Self {
            server: Server::new(),
            mocks: Vec::new(),
            auth: None,
        }
    }

    /// Base URL of the server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Root of the contents listing endpoint.
    #[must_use]
    pub fn api_root(&self) -> String {
        format!("{}/contents", self.url())
    }

    /// Root of the raw file endpoint.
    #[must_use]
    pub fn raw_root(&self) -> String {
        format!("{}/raw", self.url())
    }

    /// Root of the commit-detail endpoint.
    #[must_use]
    pub fn commits_root(&self) -> String {
        format!("{}/commits", self.url())
    }

    /// Require a Basic `Authorization` header on every mock registered
    /// after this call.
    pub fn require_basic_auth(&mut self) -> &mut Self {
        self.auth = Some(Matcher::Regex("^Basic .+".to_string()));
        self
    }

    /// Register a full tree rooted at `root`.
    ///
    /// `files` maps paths relative to `root` to file contents. A path with a
    /// trailing `/` registers an empty directory and its contents are
    /// ignored. Every intermediate directory gets a listing.
    pub fn tree(&mut self, reference: &str, root: &str, files: &[(&str, &str)]) -> &mut Self {
        let mut dirs: BTreeMap<String, BTreeSet<(String, bool)>> = BTreeMap::new();
        dirs.entry(root.to_string()).or_default();

        for (relative, contents) in files {
            let empty_dir = relative.ends_with('/');
            let parts: Vec<&str> = relative.trim_end_matches('/').split('/').collect();
            let mut parent = root.to_string();
            for (i, part) in parts.iter().enumerate() {
                let child = format!("{parent}/{part}");
                let is_dir = empty_dir || i.saturating_add(1) < parts.len();
                dirs.entry(parent.clone())
                    .or_default()
                    .insert((child.clone(), is_dir));
                if is_dir {
                    dirs.entry(child.clone()).or_default();
                }
                parent = child;
            }
            if !empty_dir {
                self.file(reference, &format!("{root}/{relative}"), contents);
            }
        }

        for (dir, children) in dirs {
            let entries: Vec<Value> = children
                .iter()
                .map(|(path, is_dir)| self.entry_json(reference, path, *is_dir))
                .collect();
            self.listing(reference, &dir, 200, &Value::Array(entries).to_string());
        }
        self
    }

    /// Register a listing for `dir` with an arbitrary status and body.
    pub fn listing(&mut self, reference: &str, dir: &str, status: usize, body: &str) -> &mut Self {
        let mock = self
            .server
            .mock("GET", encoded_path(["contents"].into_iter().chain(dir.split('/'))).as_str())
            .match_query(Matcher::UrlEncoded("ref".to_string(), reference.to_string()))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body);
        let mock = self.with_auth(mock).create();
        self.mocks.push(mock);
        self
    }

    /// Register the raw bytes of one file.
    pub fn file(&mut self, reference: &str, path: &str, contents: &str) -> &mut Self {
        let mock = self
            .server
            .mock(
                "GET",
                encoded_path(
                    ["raw"]
                        .into_iter()
                        .chain(reference.split('/'))
                        .chain(path.split('/')),
                )
                .as_str(),
            )
            .with_status(200)
            .with_body(contents);
        let mock = self.with_auth(mock).create();
        self.mocks.push(mock);
        self
    }

    /// Answer the listing of `dir` at `reference` with 404.
    pub fn missing(&mut self, reference: &str, dir: &str) -> &mut Self {
        self.listing(reference, dir, 404, r#"{"message": "Not Found"}"#)
    }

    /// Register a commit whose diff touches `files`.
    pub fn commit(&mut self, reference: &str, files: &[&str]) -> &mut Self {
        let body = json!({
            "sha": reference,
            "files": files
                .iter()
                .map(|f| json!({"filename": f, "status": "modified"}))
                .collect::<Vec<_>>(),
        });
        let mock = self
            .server
            .mock(
                "GET",
                encoded_path(["commits"].into_iter().chain(reference.split('/'))).as_str(),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string());
        let mock = self.with_auth(mock).create();
        self.mocks.push(mock);
        self
    }

    /// Expect no request at all. Use on an otherwise empty server.
    pub fn forbid_all(&mut self) -> &mut Self {
        let mock = self
            .server
            .mock("GET", Matcher::Any)
            .with_status(500)
            .expect(0)
            .create();
        self.mocks.push(mock);
        self
    }

    /// Assert that every registered mock saw its expected requests.
    pub fn assert_all(&self) {
        for mock in &self.mocks {
            mock.assert();
        }
    }

    fn with_auth(&self, mock: Mock) -> Mock {
        match &self.auth {
            Some(matcher) => mock.match_header("authorization", matcher.clone()),
            None => mock,
        }
    }

    fn entry_json(&self, reference: &str, path: &str, is_dir: bool) -> Value {
        let name = path.rsplit('/').next().unwrap_or(path);
        if is_dir {
            json!({"name": name, "path": path, "type": "dir", "download_url": null})
        } else {
            json!({
                "name": name,
                "path": path,
                "type": "file",
                "download_url": format!(
                    "{}{}",
                    self.url(),
                    encoded_path(
                        ["raw"]
                            .into_iter()
                            .chain(reference.split('/'))
                            .chain(path.split('/')),
                    ),
                ),
            })
        }
    }
}

/// Percent-encoded request path made of `segments`.
fn encoded_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut url = Url::parse("http://mock.invalid/").expect("static base URL");
    url.path_segments_mut()
        .expect("http URLs have a path")
        .pop_if_empty()
        .extend(segments);
    url.path().to_string()
}
