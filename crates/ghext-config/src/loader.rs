//! Config file discovery and layered loading.
//!
//! 1. Parse `defaults.toml` → base
//! 2. Merge `/etc/ghext/config.toml` (system)
//! 3. Merge the user file (or the explicit `--config` file)
//! 4. Apply `GHEXT_*` environment overrides
//! 5. Deserialize merged tree → `Config`
//! 6. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// System-wide config file.
const SYSTEM_CONFIG_PATH: &str = "/etc/ghext/config.toml";

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// One config file to merge, in precedence order.
#[derive(Debug, Clone)]
pub struct Layer {
    /// File location.
    pub path: PathBuf,
    /// A required layer fails the load when the file is missing.
    pub required: bool,
}

impl Layer {
    /// A layer that is skipped when the file does not exist.
    #[must_use]
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: false,
        }
    }

    /// A layer that must exist.
    #[must_use]
    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
        }
    }
}

/// Load the configuration from the standard locations.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, an explicit
/// file is missing, or the final configuration fails validation.
pub fn load(explicit_path: Option<&Path>) -> ConfigResult<Config> {
    let mut layers = vec![Layer::optional(SYSTEM_CONFIG_PATH)];
    match explicit_path {
        Some(path) => layers.push(Layer::required(path)),
        None => {
            if let Some(path) = user_config_path() {
                layers.push(Layer::optional(path));
            }
        },
    }
    load_layers(&layers, &collect_env_vars())
}

/// Load a single file layered over the embedded defaults. Environment
/// overrides are not applied.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    load_layers(&[Layer::required(path)], &HashMap::new())
}

/// Merge `layers` over the defaults, apply `env_vars`, and validate.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any layer is malformed, a required layer is
/// missing, an env var cannot be coerced, or validation fails.
pub fn load_layers<S: ::std::hash::BuildHasher>(
    layers: &[Layer],
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<Config> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    for layer in layers {
        if let Some(overlay) = try_load_file(&layer.path, layer.required)? {
            deep_merge(&mut merged, &overlay);
            info!(path = %layer.path.display(), "loaded config");
        }
    }

    let env_count = apply_env_overrides(&mut merged, env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable overrides");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;
    Ok(config)
}

/// User-level config file, `<config dir>/ghext/config.toml`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "ghext").map(|d| d.config_dir().join("config.toml"))
}

/// Read and parse one file. Missing optional files yield `None`.
///
/// Uses a single read to avoid a TOCTOU window between an existence check
/// and the read.
fn try_load_file(path: &Path, required: bool) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len(),
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Recursively deep-merge `overlay` into `base`.
///
/// Tables merge per field; scalars and arrays from the overlay replace the
/// base value.
fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}
