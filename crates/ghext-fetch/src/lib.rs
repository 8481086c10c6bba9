//! Contents API client and recursive tree fetcher.
//!
//! Given a repository path and a reference, [`TreeFetcher`] walks the
//! hosting service's directory listings and writes every file beneath the
//! path into a local directory, dropping a fixed number of leading path
//! components. [`ExtensionPath`] maps an extension name such as
//! `i.sentinel` to its repository path and strip count.
//!
//! # Example
//!
//! ```rust,no_run
//! use ghext_fetch::{
//!     ClientOptions, ContentsClient, Endpoints, ExtensionPath, FetchRequest, TreeFetcher,
//! };
//!
//! # fn main() -> Result<(), ghext_fetch::FetchError> {
//! let client = ContentsClient::new(ClientOptions {
//!     endpoints: Endpoints {
//!         api_root: "https://api.github.com/repos/OSGeo/grass-addons/contents".into(),
//!         raw_root: "https://raw.githubusercontent.com/OSGeo/grass-addons".into(),
//!         commits_root: "https://api.github.com/repos/OSGeo/grass-addons/commits".into(),
//!     },
//!     user_agent: "ghext".into(),
//!     timeout: None,
//!     credentials: None,
//! })?;
//!
//! let path = ExtensionPath::new("src", "i.sentinel");
//! let fetcher = TreeFetcher::new(client, path.strip_components());
//! let summary = fetcher.fetch(
//!     &FetchRequest::new(path.repo_path(), "grass8"),
//!     std::path::Path::new("/tmp/ghext"),
//! )?;
//! println!("{} files under {}", summary.files, summary.root.display());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod category;
pub mod client;
pub mod error;
pub mod layout;
pub mod listing;
pub mod tree;
pub mod validate;

pub use category::{ExtensionPath, category_for, module_class};
pub use client::{ClientOptions, ContentsClient, Credentials, Endpoints};
pub use error::{FetchError, FetchResult};
pub use layout::{KNOWN_TOP_LEVELS, pick_top_level, resolve_top_level};
pub use listing::ListingEntry;
pub use tree::{FetchRequest, FetchSummary, TreeFetcher};
pub use validate::{validate_extension_name, validate_git_ref};
