//! `GHEXT_*` environment variable overrides.
//!
//! Environment variables sit above every config file: a variable that is set
//! always wins over the value a file provided.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Prefix shared by every recognised variable.
pub const ENV_PREFIX: &str = "GHEXT_";

/// Value type a field expects, used to coerce the raw string.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Str,
    Bool,
    Int,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: FieldKind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "GHEXT_API_ROOT",
        field_path: "remote.api_root",
        kind: FieldKind::Str,
    },
    EnvMapping {
        var_name: "GHEXT_RAW_ROOT",
        field_path: "remote.raw_root",
        kind: FieldKind::Str,
    },
    EnvMapping {
        var_name: "GHEXT_COMMITS_ROOT",
        field_path: "remote.commits_root",
        kind: FieldKind::Str,
    },
    EnvMapping {
        var_name: "GHEXT_REFERENCE",
        field_path: "remote.default_reference",
        kind: FieldKind::Str,
    },
    EnvMapping {
        var_name: "GHEXT_TOP_LEVEL",
        field_path: "remote.top_level",
        kind: FieldKind::Str,
    },
    EnvMapping {
        var_name: "GHEXT_LEGACY_LAYOUT_LOOKUP",
        field_path: "remote.legacy_layout_lookup",
        kind: FieldKind::Bool,
    },
    EnvMapping {
        var_name: "GHEXT_TIMEOUT_SECS",
        field_path: "remote.timeout_secs",
        kind: FieldKind::Int,
    },
    EnvMapping {
        var_name: "GHEXT_INSTALLER",
        field_path: "installer.command",
        kind: FieldKind::Str,
    },
    EnvMapping {
        var_name: "GHEXT_LOG_LEVEL",
        field_path: "logging.level",
        kind: FieldKind::Str,
    },
    EnvMapping {
        var_name: "GHEXT_LOG_FORMAT",
        field_path: "logging.format",
        kind: FieldKind::Str,
    },
];

/// Snapshot the `GHEXT_*` variables of the current process.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .collect()
}

/// Write every set variable into the merged TOML tree.
///
/// Returns the number of variables applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] when a boolean or numeric variable
/// cannot be parsed.
pub fn apply_env_overrides<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };
        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var override"
        );
        let value = coerce(mapping, raw)?;
        set_field(merged, mapping.field_path, value);
        count = count.saturating_add(1);
    }

    Ok(count)
}

fn coerce(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    let err = |message: String| ConfigError::EnvError {
        var_name: mapping.var_name.to_owned(),
        message,
    };
    match mapping.kind {
        FieldKind::Str => Ok(toml::Value::String(raw.to_owned())),
        FieldKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(toml::Value::Boolean(true)),
            "0" | "false" | "no" | "off" => Ok(toml::Value::Boolean(false)),
            other => Err(err(format!("expected a boolean, got '{other}'"))),
        },
        FieldKind::Int => raw
            .trim()
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|e| err(format!("expected an integer: {e}"))),
    }
}

/// Set a dotted field path, creating intermediate tables as needed.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), value);
    }
}
