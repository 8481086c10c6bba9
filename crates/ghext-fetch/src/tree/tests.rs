use std::collections::BTreeSet;
use std::path::PathBuf;

use ghext_test::{
    MockRepo, SENTINEL_COMMIT, SENTINEL_REPO_PATH, collect_dirs, collect_files, scratch_dir,
    sentinel_files,
};

use super::*;
use crate::client::{ClientOptions, ContentsClient, Credentials, Endpoints};

fn client_for(repo: &MockRepo, credentials: Option<Credentials>) -> ContentsClient {
    ContentsClient::new(ClientOptions {
        endpoints: Endpoints {
            api_root: repo.api_root(),
            raw_root: repo.raw_root(),
            commits_root: repo.commits_root(),
        },
        user_agent: "ghext-test".to_string(),
        timeout: None,
        credentials,
    })
    .unwrap()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn local_relative_strips_prefix() {
    let p = local_relative("src/imagery/i.sentinel/Makefile", "src/imagery/i.sentinel", 2).unwrap();
    assert_eq!(p, PathBuf::from("i.sentinel/Makefile"));
}

#[test]
fn local_relative_rejects_foreign_entries() {
    for path in [
        "src/imagery/other/Makefile",
        "src/imagery/i.sentinel",
        "src/imagery/i.sentinel/a/b",
        "src/imagery/i.sentinel/..",
        "src/imagery/i.sentinel/",
        "/etc/passwd",
    ] {
        let err = local_relative(path, "src/imagery/i.sentinel", 2).unwrap_err();
        assert!(matches!(err, FetchError::UnsafePath { .. }), "{path}");
    }
}

#[test]
fn local_relative_needs_components_after_strip() {
    let err = local_relative("src/x", "src", 2).unwrap_err();
    assert!(matches!(err, FetchError::UnsafePath { .. }));
}

#[test]
fn check_entry_matches_local_relative() {
    assert!(check_entry("src/imagery/i.sentinel/docs", "src/imagery/i.sentinel", 2).is_ok());
    assert!(check_entry("src/imagery/other/docs", "src/imagery/i.sentinel", 2).is_err());
    assert!(check_entry("src/x", "src", 2).is_err());
}

#[test]
fn fetch_writes_exact_leaf_set() {
    let mut repo = MockRepo::new();
    repo.tree(SENTINEL_COMMIT, SENTINEL_REPO_PATH, &sentinel_files());
    let dest = scratch_dir();

    let fetcher = TreeFetcher::new(client_for(&repo, None), 2);
    let summary = fetcher
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, SENTINEL_COMMIT), dest.path())
        .unwrap();

    assert_eq!(
        collect_files(dest.path()),
        set(&[
            "i.sentinel/Makefile",
            "i.sentinel/i.sentinel.html",
            "i.sentinel/i.sentinel.download/Makefile",
            "i.sentinel/i.sentinel.download/i.sentinel.download.py",
            "i.sentinel/i.sentinel.import/Makefile",
        ])
    );
    assert_eq!(summary.files, 5);
    assert_eq!(summary.directories, 4);
    assert_eq!(summary.root, dest.path().join("i.sentinel"));
    repo.assert_all();
}

#[test]
fn file_contents_are_verbatim() {
    let mut repo = MockRepo::new();
    repo.tree("main", "src/raster/r.example", &[("main.c", "int main(void) { return 0; }\n")]);
    let dest = scratch_dir();

    TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new("src/raster/r.example", "main"), dest.path())
        .unwrap();

    let written = std::fs::read_to_string(dest.path().join("r.example/main.c")).unwrap();
    assert_eq!(written, "int main(void) { return 0; }\n");
}

#[test]
fn names_needing_escapes_are_fetched() {
    let names = ["a#b.txt", "what?.txt", "with space.txt", "pct%41.txt"];
    let files: Vec<(&str, &str)> = names.iter().map(|n| (*n, *n)).collect();
    let mut repo = MockRepo::new();
    repo.tree("main", "src/raster/r.example", &files);
    let dest = scratch_dir();

    let summary = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new("src/raster/r.example", "main"), dest.path())
        .unwrap();

    assert_eq!(summary.files, names.len());
    assert_eq!(
        collect_files(dest.path()),
        names.iter().map(|n| format!("r.example/{n}")).collect::<BTreeSet<_>>()
    );
    let written = std::fs::read_to_string(dest.path().join("r.example/a#b.txt")).unwrap();
    assert_eq!(written, "a#b.txt");
    repo.assert_all();
}

#[test]
fn directory_names_needing_escapes_are_listed() {
    let mut repo = MockRepo::new();
    repo.tree("main", "src/raster/r.example", &[("docs #1/index.html", "x")]);
    let dest = scratch_dir();

    TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new("src/raster/r.example", "main"), dest.path())
        .unwrap();

    assert_eq!(collect_files(dest.path()), set(&["r.example/docs #1/index.html"]));
    repo.assert_all();
}

#[test]
fn slashed_reference_stays_in_path() {
    let mut repo = MockRepo::new();
    repo.tree("feature/new-layout", "src/raster/r.example", &[("Makefile", "x")]);
    let dest = scratch_dir();

    TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new("src/raster/r.example", "feature/new-layout"), dest.path())
        .unwrap();

    assert_eq!(collect_files(dest.path()), set(&["r.example/Makefile"]));
    repo.assert_all();
}

#[test]
fn existing_files_are_overwritten() {
    let mut repo = MockRepo::new();
    repo.tree("main", "src/raster/r.example", &[("Makefile", "new\n")]);
    let dest = scratch_dir();
    std::fs::create_dir_all(dest.path().join("r.example")).unwrap();
    std::fs::write(dest.path().join("r.example/Makefile"), "old\n").unwrap();

    TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new("src/raster/r.example", "main"), dest.path())
        .unwrap();

    let written = std::fs::read_to_string(dest.path().join("r.example/Makefile")).unwrap();
    assert_eq!(written, "new\n");
}

#[test]
fn directory_entries_are_not_files() {
    let mut repo = MockRepo::new();
    repo.tree(SENTINEL_COMMIT, SENTINEL_REPO_PATH, &sentinel_files());
    let dest = scratch_dir();

    TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, SENTINEL_COMMIT), dest.path())
        .unwrap();

    assert!(dest.path().join("i.sentinel/i.sentinel.download").is_dir());
    assert!(dest.path().join("i.sentinel/i.sentinel.import").is_dir());
}

#[test]
fn empty_remote_directory_is_not_created() {
    let mut repo = MockRepo::new();
    repo.tree(SENTINEL_COMMIT, SENTINEL_REPO_PATH, &sentinel_files());
    let dest = scratch_dir();

    TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, SENTINEL_COMMIT), dest.path())
        .unwrap();

    let dirs = collect_dirs(dest.path());
    assert!(!dirs.contains("i.sentinel/i.sentinel.import/testsuite"));
    assert_eq!(
        dirs,
        set(&[
            "i.sentinel",
            "i.sentinel/i.sentinel.download",
            "i.sentinel/i.sentinel.import",
        ])
    );
}

#[test]
fn empty_root_writes_nothing() {
    let mut repo = MockRepo::new();
    repo.listing("main", "src/misc/m.empty", 200, "[]");
    let dest = scratch_dir();

    let summary = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new("src/misc/m.empty", "main"), dest.path())
        .unwrap();

    assert_eq!(summary.files, 0);
    assert!(collect_files(dest.path()).is_empty());
    assert!(collect_dirs(dest.path()).is_empty());
}

#[test]
fn missing_reference_is_not_found_and_writes_nothing() {
    let mut repo = MockRepo::new();
    repo.missing("no-such-branch", SENTINEL_REPO_PATH);
    let dest = scratch_dir();

    let err = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, "no-such-branch"), dest.path())
        .unwrap_err();

    assert!(err.is_not_found());
    match err {
        FetchError::RemoteNotFound {
            repo_path,
            reference,
            status,
        } => {
            assert_eq!(repo_path, SENTINEL_REPO_PATH);
            assert_eq!(reference, "no-such-branch");
            assert_eq!(status, 404);
        },
        other => panic!("unexpected error: {other}"),
    }
    assert!(collect_files(dest.path()).is_empty());
}

#[test]
fn unprocessable_reference_is_not_found() {
    let mut repo = MockRepo::new();
    repo.listing("bad", SENTINEL_REPO_PATH, 422, r#"{"message": "No commit found"}"#);
    let dest = scratch_dir();

    let err = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, "bad"), dest.path())
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn server_error_is_http_error() {
    let mut repo = MockRepo::new();
    repo.listing("main", SENTINEL_REPO_PATH, 500, "oops");
    let dest = scratch_dir();

    let err = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, "main"), dest.path())
        .unwrap_err();
    assert!(matches!(err, FetchError::Http { .. }), "{err}");
}

#[test]
fn malformed_listing_is_rejected() {
    let mut repo = MockRepo::new();
    repo.listing("main", SENTINEL_REPO_PATH, 200, "not json at all");
    let dest = scratch_dir();

    let err = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, "main"), dest.path())
        .unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse { .. }), "{err}");
}

#[test]
fn single_object_body_is_malformed() {
    // The API answers a file path with one object instead of an array.
    let mut repo = MockRepo::new();
    let body = r#"{"path": "src/imagery/i.sentinel", "download_url": "x"}"#;
    repo.listing("main", SENTINEL_REPO_PATH, 200, body);
    let dest = scratch_dir();

    let err = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, "main"), dest.path())
        .unwrap_err();
    assert!(matches!(err, FetchError::MalformedResponse { .. }), "{err}");
}

#[test]
fn traversal_entry_aborts_before_writing() {
    let mut repo = MockRepo::new();
    let body = format!(
        r#"[{{"path": "src/imagery/i.sentinel/../../../evil", "download_url": "{}/main/evil"}}]"#,
        repo.raw_root()
    );
    repo.listing("main", SENTINEL_REPO_PATH, 200, &body);
    let dest = scratch_dir();

    let err = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, "main"), dest.path())
        .unwrap_err();
    assert!(matches!(err, FetchError::UnsafePath { .. }), "{err}");
    assert!(collect_files(dest.path()).is_empty());
}

#[test]
fn foreign_directory_entry_is_not_listed() {
    let mut repo = MockRepo::new();
    repo.listing(
        "main",
        SENTINEL_REPO_PATH,
        200,
        r#"[{"path": "src/imagery/other", "download_url": null}]"#,
    );
    let dest = scratch_dir();

    let err = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, "main"), dest.path())
        .unwrap_err();
    assert!(
        matches!(err, FetchError::UnsafePath { ref path } if path == "src/imagery/other"),
        "{err}"
    );
    assert!(collect_dirs(dest.path()).is_empty());
    repo.assert_all();
}

#[test]
fn missing_raw_file_aborts_fetch() {
    let mut repo = MockRepo::new();
    let body = format!(
        r#"[{{"path": "src/imagery/i.sentinel/Makefile", "download_url": "{}/main/x"}}]"#,
        repo.raw_root()
    );
    repo.listing("main", SENTINEL_REPO_PATH, 200, &body);
    let dest = scratch_dir();

    let err = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new(SENTINEL_REPO_PATH, "main"), dest.path())
        .unwrap_err();
    // No mock serves the raw file, so the server answers 501.
    assert!(matches!(err, FetchError::Http { .. }), "{err}");
}

#[test]
fn nested_category_strips_three_components() {
    let mut repo = MockRepo::new();
    repo.tree("main", "src/gui/wxpython/wx.metadata", &[("Makefile", "x"), ("mdlib/mdutil.py", "y")]);
    let dest = scratch_dir();

    TreeFetcher::new(client_for(&repo, None), 3)
        .fetch(&FetchRequest::new("src/gui/wxpython/wx.metadata", "main"), dest.path())
        .unwrap();

    assert_eq!(
        collect_files(dest.path()),
        set(&["wx.metadata/Makefile", "wx.metadata/mdlib/mdutil.py"])
    );
}

#[test]
fn credentials_are_sent_on_every_request() {
    let mut repo = MockRepo::new();
    repo.require_basic_auth();
    repo.tree("main", "src/raster/r.example", &[("Makefile", "x"), ("sub/file.py", "y")]);
    let dest = scratch_dir();

    let client = client_for(&repo, Some(Credentials::new("octocat", "token")));
    assert!(client.is_authenticated());
    TreeFetcher::new(client, 2)
        .fetch(&FetchRequest::new("src/raster/r.example", "main"), dest.path())
        .unwrap();

    repo.assert_all();
}

#[test]
fn anonymous_requests_miss_auth_only_mocks() {
    let mut repo = MockRepo::new();
    repo.require_basic_auth();
    repo.tree("main", "src/raster/r.example", &[("Makefile", "x")]);
    let dest = scratch_dir();

    let result = TreeFetcher::new(client_for(&repo, None), 2)
        .fetch(&FetchRequest::new("src/raster/r.example", "main"), dest.path());
    assert!(result.is_err());
}

#[test]
fn commit_files_lists_changed_paths() {
    let mut repo = MockRepo::new();
    repo.commit(SENTINEL_COMMIT, &["src/imagery/i.sentinel/Makefile", "README.md"]);

    let files = client_for(&repo, None).commit_files(SENTINEL_COMMIT).unwrap();
    assert_eq!(files, vec!["src/imagery/i.sentinel/Makefile", "README.md"]);
}
