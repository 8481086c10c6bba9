//! Configuration types.
//!
//! Every struct implements [`Default`] with the production values from
//! `defaults.toml`, so a bare `[section]` header in TOML still produces a
//! working configuration.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote hosting endpoints and fetch behaviour.
    pub remote: RemoteSection,
    /// Where credentials for the hosting API are read from.
    pub auth: AuthSection,
    /// The package manager command that installs and removes extensions.
    pub installer: InstallerSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// RemoteSection
// ---------------------------------------------------------------------------

/// Endpoints of the extension repository on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSection {
    /// Root of the contents listing API, e.g.
    /// `https://api.github.com/repos/OSGeo/grass-addons/contents`.
    pub api_root: String,
    /// Root of the raw file host; files live at `{raw_root}/{ref}/{path}`.
    pub raw_root: String,
    /// Root of the commit-detail API used by the legacy layout lookup.
    pub commits_root: String,
    /// Primary branch. Adding at this reference skips the fetch entirely.
    pub default_reference: String,
    /// Top-level source directory of the repository.
    pub top_level: String,
    /// Inspect the reference's commit to pick a historical top-level name.
    pub legacy_layout_lookup: bool,
    /// Request timeout. `None` keeps the transport default.
    pub timeout_secs: Option<u64>,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            api_root: "https://api.github.com/repos/OSGeo/grass-addons/contents".to_owned(),
            raw_root: "https://raw.githubusercontent.com/OSGeo/grass-addons".to_owned(),
            commits_root: "https://api.github.com/repos/OSGeo/grass-addons/commits".to_owned(),
            default_reference: "main".to_owned(),
            top_level: "src".to_owned(),
            legacy_layout_lookup: false,
            timeout_secs: None,
            user_agent: concat!("ghext/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthSection
// ---------------------------------------------------------------------------

/// Names of the environment variables holding HTTP Basic credentials.
///
/// The credentials themselves are never stored in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Variable holding the account name.
    pub username_env: String,
    /// Variable holding the access token.
    pub token_env: String,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            username_env: "GITHUB_USERNAME".to_owned(),
            token_env: "GITHUB_TOKEN".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// InstallerSection
// ---------------------------------------------------------------------------

/// Package manager invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSection {
    /// Command name or path.
    pub command: String,
}

impl Default for InstallerSection {
    fn default() -> Self {
        Self {
            command: "g.extension".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Level filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Output format (`pretty`, `compact`, `json`, `full`).
    pub format: String,
    /// Extra filter directives, e.g. `ghext_fetch=trace`.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
