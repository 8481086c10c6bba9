use crate::error::{FetchError, FetchResult};

/// Validate an extension name such as `i.sentinel` or `wx.metadata`.
///
/// The name becomes part of API request paths, so anything that could
/// escape the category directory or inject URL syntax is rejected.
///
/// # Errors
///
/// Returns [`FetchError::InvalidExtension`] if the name is empty, too long,
/// lacks a `<class>.` prefix, or contains characters outside
/// `[A-Za-z0-9._-]`.
pub fn validate_extension_name(name: &str) -> FetchResult<()> {
    let reject = |reason: &str| {
        Err(FetchError::InvalidExtension {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() || name.len() > 100 {
        return reject("must be 1-100 characters");
    }
    let is_valid = name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    if !is_valid {
        return reject("only alphanumeric, '.', '-' and '_' are allowed");
    }
    if name.starts_with('.') || name.starts_with('-') || name.ends_with('.') || name.contains("..")
    {
        return reject("invalid format");
    }
    match name.split_once('.') {
        Some((class, rest)) if !class.is_empty() && !rest.is_empty() => Ok(()),
        _ => reject("expected '<class>.<name>', e.g. 'i.sentinel'"),
    }
}

/// Validate a git ref (branch, tag, or commit) for safety.
///
/// Rejects control characters, path traversal (`..`), shell metacharacters,
/// and enforces git naming rules.
///
/// # Errors
///
/// Returns [`FetchError::InvalidReference`] if the ref is empty, exceeds
/// length limits, or violates git ref naming rules.
pub fn validate_git_ref(git_ref: &str) -> FetchResult<()> {
    let reject = |reason: String| {
        Err(FetchError::InvalidReference {
            reference: git_ref.to_string(),
            reason,
        })
    };

    if git_ref.is_empty() || git_ref.len() > 256 {
        return reject("must be 1-256 characters".into());
    }
    if git_ref.contains("..") {
        return reject("contains '..'".into());
    }
    if git_ref.starts_with('-') {
        return reject("must not start with '-'".into());
    }
    let is_valid = git_ref
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'/'));
    if !is_valid {
        return reject("contains invalid characters".into());
    }
    // Git doesn't allow refs starting/ending with '.' or '/', ending with '.lock',
    // or containing consecutive slashes
    if git_ref.starts_with('.')
        || git_ref.ends_with('.')
        || git_ref.starts_with('/')
        || git_ref.ends_with('/')
        || std::path::Path::new(git_ref)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("lock"))
        || git_ref.contains("//")
    {
        return reject("invalid format".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_extension_names() {
        for name in ["i.sentinel", "r.learn.ml2", "wx.metadata", "v.in_ogr-x", "r3.flow"] {
            assert!(validate_extension_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn reject_extension_without_class() {
        assert!(validate_extension_name("sentinel").is_err());
        assert!(validate_extension_name("i.").is_err());
        assert!(validate_extension_name(".sentinel").is_err());
    }

    #[test]
    fn reject_extension_traversal_and_slashes() {
        assert!(validate_extension_name("i..sentinel").is_err());
        assert!(validate_extension_name("i.sentinel/../x").is_err());
        assert!(validate_extension_name("i.sentinel?ref=x").is_err());
        assert!(validate_extension_name("-i.sentinel").is_err());
    }

    #[test]
    fn accept_valid_git_refs() {
        for r in [
            "main",
            "grass8",
            "releasebranch_8_3",
            "feature/new-layout",
            "aff69a9a0dac8c68ccb877858675d84588b35bd2",
        ] {
            assert!(validate_git_ref(r).is_ok(), "{r}");
        }
    }

    #[test]
    fn reject_bad_git_refs() {
        for r in ["", "a..b", "-main", "main.lock", "/main", "main/", "a//b", "ma in", "main;rm"] {
            assert!(validate_git_ref(r).is_err(), "{r:?}");
        }
    }
}
