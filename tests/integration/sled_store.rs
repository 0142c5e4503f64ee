//! Integration tests for the sled-backed store and the directory importer

use grove::classify::NulScan;
use grove::config::{RepoConfig, SiteConfig};
use grove::filter::FilterRegistry;
use grove::html::Html;
use grove::mime::MimeTypes;
use grove::store::{ObjectBackend, ObjectStore, SledObjectStore, StoredObject, TreeImporter};
use grove::types::{ObjectKind, WalkState};
use grove::view::{print_tree, Page, Query, RenderContext};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn write_site(root: &std::path::Path) {
    fs::write(root.join("index.html"), "<h1>home</h1>\n").unwrap();
    fs::create_dir_all(root.join("docs/guide")).unwrap();
    fs::write(root.join("docs/guide/intro.md"), "# Intro\n").unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join(".git/HEAD"), "ref: refs/heads/master\n").unwrap();
}

fn render(store: &SledObjectStore, path: Option<&str>) -> (WalkState, String) {
    let site = SiteConfig::default();
    let repo = RepoConfig {
        url: "site".to_string(),
        ..RepoConfig::default()
    };
    let filters = FilterRegistry::new();
    let mimetypes = MimeTypes::new(&HashMap::new());
    let query = Query::new("master");
    let ctx = RenderContext {
        store,
        site: &site,
        repo: &repo,
        filters: &filters,
        mimetypes: &mimetypes,
        classifier: &NulScan,
        query: &query,
    };
    let mut page = Page::new("site");
    let mut out = Html::new(Vec::new());
    let state = print_tree(&ctx, &mut out, &mut page, None, path, false).unwrap();
    (state, String::from_utf8(out.into_inner()).unwrap())
}

/// An imported directory can be browsed straight from sled
#[test]
fn test_import_then_render() {
    let source = TempDir::new().unwrap();
    write_site(source.path());
    let store_dir = TempDir::new().unwrap();
    let store = SledObjectStore::new(store_dir.path()).unwrap();

    TreeImporter::new(source.path(), &store)
        .import_commit("master", "Import")
        .unwrap();

    let (state, html) = render(&store, None);
    assert_eq!(state, WalkState::ListingDirectory);
    assert!(html.contains("<a class='ls-blob html' href='/?url=site/tree/index.html'>index.html</a>"));
    assert!(html.contains(concat!(
        "<a class='ls-dir' href='/?url=site/tree/docs'>docs</a> / ",
        "<a class='ls-dir' href='/?url=site/tree/docs/guide'>guide</a>"
    )));
    assert!(!html.contains(".git"));

    let (state, html) = render(&store, Some("docs/guide/intro.md"));
    assert_eq!(state, WalkState::RenderedBlob);
    assert!(html.contains("<code># Intro\n</code>"));
}

/// Refs and objects survive closing and reopening the database
#[test]
fn test_store_persists_across_reopen() {
    let source = TempDir::new().unwrap();
    write_site(source.path());
    let store_dir = TempDir::new().unwrap();

    let commit = {
        let store = SledObjectStore::new(store_dir.path()).unwrap();
        let commit = TreeImporter::new(source.path(), &store)
            .import_commit("master", "Import")
            .unwrap();
        store.flush().unwrap();
        commit
    };

    let store = SledObjectStore::new(store_dir.path()).unwrap();
    assert_eq!(store.list_refs().unwrap(), vec![("master".to_string(), commit)]);
    assert_eq!(store.object_info(&commit).unwrap().kind, ObjectKind::Commit);
    let (state, _) = render(&store, Some("index.html"));
    assert_eq!(state, WalkState::RenderedBlob);
}

/// Re-importing onto a ref chains the new commit onto the old one
#[test]
fn test_reimport_chains_commits() {
    let source = TempDir::new().unwrap();
    write_site(source.path());
    let store_dir = TempDir::new().unwrap();
    let store = SledObjectStore::new(store_dir.path()).unwrap();

    let importer = TreeImporter::new(source.path(), &store);
    let first = importer.import_commit("master", "first").unwrap();
    fs::write(source.path().join("index.html"), "<h1>changed</h1>\n").unwrap();
    let second = importer.import_commit("master", "second").unwrap();

    assert_ne!(first, second);
    match store.get_object(&second).unwrap() {
        Some(StoredObject::Commit(commit)) => {
            assert_eq!(commit.parents, vec![first]);
            assert_eq!(commit.message, "second");
        }
        other => panic!("expected a commit, got {:?}", other),
    }

    let (_, html) = render(&store, Some("index.html"));
    assert!(html.contains("&lt;h1&gt;changed&lt;/h1&gt;"));
}

/// Importing the same content twice yields the same root tree
#[test]
fn test_import_is_deterministic() {
    let source = TempDir::new().unwrap();
    write_site(source.path());
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let store_a = SledObjectStore::new(a.path()).unwrap();
    let store_b = SledObjectStore::new(b.path()).unwrap();

    let root_a = TreeImporter::new(source.path(), &store_a).import_tree().unwrap();
    let root_b = TreeImporter::new(source.path(), &store_b).import_tree().unwrap();
    assert_eq!(root_a, root_b);
}
