//! Fixtures and tree inspection helpers.

use std::collections::BTreeSet;
use std::path::Path;

use tempfile::TempDir;
use walkdir::WalkDir;

/// Commit used in the end-to-end scenarios.
pub const SENTINEL_COMMIT: &str = "aff69a9a0dac8c68ccb877858675d84588b35bd2";

/// Repository path of `i.sentinel` under the default layout.
pub const SENTINEL_REPO_PATH: &str = "src/imagery/i.sentinel";

/// A representative multi-module extension tree, relative to its root.
#[must_use]
pub fn sentinel_files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Makefile", "MODULE_TOPDIR = ../..\n\nSUBDIRS = i.sentinel.download\n"),
        ("i.sentinel.html", "<h2>DESCRIPTION</h2>\n"),
        ("i.sentinel.download/Makefile", "PGM = i.sentinel.download\n"),
        (
            "i.sentinel.download/i.sentinel.download.py",
            "#!/usr/bin/env python3\nprint('download')\n",
        ),
        ("i.sentinel.import/Makefile", "PGM = i.sentinel.import\n"),
        ("i.sentinel.import/testsuite/", ""),
    ]
}

/// A fresh scratch directory.
///
/// # Panics
///
/// Panics if the directory cannot be created.
#[must_use]
pub fn scratch_dir() -> TempDir {
    TempDir::new().expect("failed to create scratch directory")
}

/// Relative paths of every file under `root`, with `/` separators.
#[must_use]
pub fn collect_files(root: &Path) -> BTreeSet<String> {
    collect(root, |entry| entry.file_type().is_file())
}

/// Relative paths of every directory under `root`, excluding `root`.
#[must_use]
pub fn collect_dirs(root: &Path) -> BTreeSet<String> {
    collect(root, |entry| entry.file_type().is_dir() && entry.depth() > 0)
}

fn collect(root: &Path, keep: impl Fn(&walkdir::DirEntry) -> bool) -> BTreeSet<String> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| keep(entry))
        .filter_map(|entry| {
            entry.path().strip_prefix(root).ok().map(|relative| {
                relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
        })
        .collect()
}
