#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for `ghext`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use ghext_config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("contents API: {}", config.remote.api_root);
//! ```
//!
//! # Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment variables** (`GHEXT_*`)
//! 2. **User** (`<config dir>/ghext/config.toml`, or an explicit `--config` file)
//! 3. **System** (`/etc/ghext/config.toml`)
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)

/// Environment variable overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// `explicit_path` replaces the user-level file when given; unlike the
    /// discovered user file it must exist.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit_path: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(explicit_path)
    }

    /// Load configuration from a single file layered over the defaults only.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
