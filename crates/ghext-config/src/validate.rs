//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound for `remote.timeout_secs`.
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Hosts allowed over plain `http://` (local mirrors and test servers).
const LOOPBACK_PREFIXES: &[&str] = &["http://127.0.0.1", "http://localhost", "http://[::1]"];

/// Validate a fully merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_remote(config)?;
    validate_auth(config)?;
    validate_installer(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_remote(config: &Config) -> ConfigResult<()> {
    let r = &config.remote;

    for (field, value) in [
        ("remote.api_root", &r.api_root),
        ("remote.raw_root", &r.raw_root),
        ("remote.commits_root", &r.commits_root),
    ] {
        validate_root_url(field, value)?;
    }

    let reference = r.default_reference.as_str();
    if let Some(reason) = git_ref_problem(reference) {
        return Err(invalid(
            "remote.default_reference",
            format!("'{reference}' is not a valid git reference: {reason}"),
        ));
    }

    let top = r.top_level.as_str();
    if top.is_empty() || top.contains('/') || top.contains('\\') || top == "." || top == ".." {
        return Err(invalid(
            "remote.top_level",
            format!("'{top}' must be a single directory name"),
        ));
    }

    if let Some(secs) = r.timeout_secs
        && !(1..=MAX_TIMEOUT_SECS).contains(&secs)
    {
        return Err(invalid(
            "remote.timeout_secs",
            format!("must be between 1 and {MAX_TIMEOUT_SECS}"),
        ));
    }

    if r.user_agent.trim().is_empty() {
        return Err(invalid("remote.user_agent", "must not be empty"));
    }

    Ok(())
}

/// Why `reference` is not an acceptable branch, tag, or commit name.
///
/// Same rules the fetcher applies to a reference given on the command line.
fn git_ref_problem(reference: &str) -> Option<&'static str> {
    if reference.is_empty() || reference.len() > 256 {
        return Some("must be 1-256 characters");
    }
    if reference.contains("..") {
        return Some("contains '..'");
    }
    if reference.starts_with('-') {
        return Some("must not start with '-'");
    }
    if !reference
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'/'))
    {
        return Some("contains invalid characters");
    }
    if reference.starts_with(['.', '/'])
        || reference.ends_with(['.', '/'])
        || reference.contains("//")
        || std::path::Path::new(reference)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("lock"))
    {
        return Some("invalid format");
    }
    None
}

fn validate_root_url(field: &str, value: &str) -> ConfigResult<()> {
    let allowed = value.starts_with("https://")
        || LOOPBACK_PREFIXES.iter().any(|p| value.starts_with(p));
    if !allowed {
        return Err(invalid(
            field,
            format!("'{value}' must use https:// (plain http:// only for loopback hosts)"),
        ));
    }
    if value.ends_with('/') {
        return Err(invalid(field, "must not end with '/'"));
    }
    Ok(())
}

fn validate_auth(config: &Config) -> ConfigResult<()> {
    for (field, value) in [
        ("auth.username_env", &config.auth.username_env),
        ("auth.token_env", &config.auth.token_env),
    ] {
        if value.is_empty() || value.contains('=') || value.contains('\0') {
            return Err(invalid(field, "must be a valid environment variable name"));
        }
    }
    Ok(())
}

fn validate_installer(config: &Config) -> ConfigResult<()> {
    if config.installer.command.trim().is_empty() {
        return Err(invalid("installer.command", "must not be empty"));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;
    if !matches!(
        l.level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    ) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported level '{}'; expected one of: trace, debug, info, warn, error, off",
                l.level
            ),
        ));
    }
    if !matches!(l.format.as_str(), "pretty" | "compact" | "json" | "full") {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported format '{}'; expected one of: pretty, compact, json, full",
                l.format
            ),
        ));
    }
    Ok(())
}
