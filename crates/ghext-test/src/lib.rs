//! ghext Test - Shared test utilities for the ghext crates.
//!
//! Provides an in-process stand-in for the hosting service and helpers for
//! inspecting fetched trees. Use it as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! ghext-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! let mut repo = MockRepo::new();
//! repo.tree("main", "src/imagery/i.sentinel", &[("Makefile", "all:\n")]);
//! let endpoints = Endpoints {
//!     api_root: repo.api_root(),
//!     raw_root: repo.raw_root(),
//!     commits_root: repo.commits_root(),
//! };
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mock_repo;

pub use fixtures::*;
pub use mock_repo::*;
