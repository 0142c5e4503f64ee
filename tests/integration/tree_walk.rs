//! Integration tests for path resolution and the tree page entry point

use crate::integration::test_utils::{sample_repo, Fixture};
use grove::error::ViewError;
use grove::store::{ObjectStore, ObjectWriter};
use grove::types::{FileMode, ObjectId, TreeEntry, WalkState};

fn child_id(fx: &Fixture, tree: &ObjectId, name: &str) -> ObjectId {
    fx.store
        .lookup_tree(tree)
        .unwrap()
        .into_iter()
        .find(|entry| entry.name == name)
        .unwrap()
        .id
}

fn root_tree(fx: &Fixture) -> ObjectId {
    fx.store.resolve_revision("master").unwrap()
}

fn not_found_message(result: Result<WalkState, ViewError>) -> String {
    match result {
        Err(ViewError::NotFound(msg)) => msg,
        other => panic!("expected NotFound, got {:?}", other),
    }
}

/// Without a path the root of the head is listed
#[test]
fn test_root_listing_without_path() {
    let fx = sample_repo();
    let rendered = fx.print_tree(None, None, false);

    assert_eq!(rendered.result.unwrap(), WalkState::ListingDirectory);
    assert!(rendered.html.starts_with("<div class='content'><table summary='tree listing' class='list'>"));
    assert!(rendered.html.ends_with("</table>\n</div> <!-- class=content -->\n"));
    assert_eq!(rendered.page.title, "demo");
    assert_eq!(rendered.html.matches("<tr><td class='ls-mode'>").count(), 3);
}

/// An empty or slash-only path is the root as well
#[test]
fn test_empty_path_is_root() {
    let fx = sample_repo();
    for path in ["", "/", "//"] {
        let rendered = fx.print_tree(None, Some(path), false);
        assert_eq!(rendered.result.unwrap(), WalkState::ListingDirectory);
        assert_eq!(rendered.page.title, "demo");
    }
}

/// A directory path lists that directory and titles the page after it
#[test]
fn test_directory_path_lists_directory() {
    let fx = sample_repo();
    let rendered = fx.print_tree(None, Some("sub"), false);

    assert_eq!(rendered.result.unwrap(), WalkState::ListingDirectory);
    assert_eq!(rendered.page.title, "sub - demo");
    assert!(rendered
        .html
        .contains("<a class='ls-dir' href='/?url=demo/tree/sub/inner'>inner</a></td>"));
    assert_eq!(rendered.html.matches("<tr><td class='ls-mode'>").count(), 1);
}

/// Leading, trailing and doubled slashes are ignored
#[test]
fn test_path_is_normalized() {
    let fx = sample_repo();
    let rendered = fx.print_tree(None, Some("/sub//inner/"), false);

    assert_eq!(rendered.result.unwrap(), WalkState::ListingDirectory);
    assert_eq!(rendered.page.title, "inner\\sub - demo");
    assert!(rendered
        .html
        .contains("<a class='ls-blob rs' href='/?url=demo/tree/sub/inner/x.rs'>x.rs</a>"));
}

/// A file path renders the blob inside the layout
#[test]
fn test_file_path_renders_blob() {
    let fx = sample_repo();
    let rendered = fx.print_tree(None, Some("sub/inner/x.rs"), false);

    assert_eq!(rendered.result.unwrap(), WalkState::RenderedBlob);
    assert_eq!(rendered.page.title, "x.rs\\inner\\sub - demo");

    let sub = child_id(&fx, &root_tree(&fx), "sub");
    let inner = child_id(&fx, &sub, "inner");
    let blob = child_id(&fx, &inner, "x.rs");
    assert!(rendered.html.starts_with(&format!(
        "<div class='content'>blob: {} (<a href='/?url=demo/plain/sub/inner/x.rs'>plain</a>)\n",
        blob
    )));
    assert!(rendered.html.contains("<code>fn main() {}\n</code>"));
    assert!(rendered.html.ends_with("</div> <!-- class=content -->\n"));
}

/// Paths that name nothing are reported as not found
#[test]
fn test_missing_paths() {
    let fx = sample_repo();
    for path in ["missing", "two/zzz", "a.txt/more", "sub/inner/x.rs/deeper", "su"] {
        let rendered = fx.print_tree(None, Some(path), false);
        assert_eq!(not_found_message(rendered.result), "Path not found", "path {}", path);
    }
}

/// Unknown revisions and revisions that are not commits
#[test]
fn test_bad_revisions() {
    let fx = sample_repo();

    let rendered = fx.print_tree(Some("nope"), None, false);
    assert_eq!(not_found_message(rendered.result), "Invalid revision name: nope");
    assert!(rendered.html.is_empty());

    let blob = child_id(&fx, &root_tree(&fx), "a.txt");
    let hex = blob.to_hex();
    let rendered = fx.print_tree(Some(&hex), None, false);
    assert_eq!(
        not_found_message(rendered.result),
        format!("Invalid commit reference: {}", hex)
    );
}

/// A tree id is accepted as a revision; links then carry it as `id=`
#[test]
fn test_tree_id_as_revision() {
    let fx = sample_repo();
    let hex = root_tree(&fx).to_hex();
    let rendered = fx.print_tree(Some(&hex), None, false);

    assert_eq!(rendered.result.unwrap(), WalkState::ListingDirectory);
    assert!(rendered.html.contains(&format!(
        "<a class='ls-blob txt' href='/?url=demo/tree/a.txt&amp;id={}'>a.txt</a>",
        hex
    )));
}

/// A branch other than the default puts `h=` into every link
#[test]
fn test_non_default_head() {
    let mut fx = sample_repo();
    let master = fx.store.resolve_revision("master").unwrap();
    let commit = fx.store.write_commit(master, vec![], "dev").unwrap();
    fx.store.update_ref("dev", commit).unwrap();
    fx.query.head = "dev".to_string();

    let rendered = fx.print_tree(None, None, false);
    assert_eq!(rendered.result.unwrap(), WalkState::ListingDirectory);
    assert!(rendered
        .html
        .contains("<a class='ls-blob txt' href='/?url=demo/tree/a.txt&amp;h=dev'>a.txt</a>"));

    let rendered = fx.print_tree(Some("master"), None, false);
    assert!(rendered.html.contains(
        "<a class='ls-blob txt' href='/?url=demo/tree/a.txt&amp;h=dev&amp;id=master'>a.txt</a>"
    ));
}

/// Not-found errors become an error page with status 404
#[test]
fn test_tree_page_not_found() {
    let fx = sample_repo();
    let (state, html, page) = fx.tree_page(None, Some("missing"), false);

    assert_eq!(state, None);
    assert_eq!(page.status, 404);
    assert_eq!(page.reason, "Not found");
    assert_eq!(
        html,
        "<div class='content'><div class='error'>Path not found</div>\n</div> <!-- class=content -->\n"
    );
}

/// A directory on the request path that is missing from the store is a
/// storage failure, not a missing path
#[test]
fn test_missing_tree_while_descending() {
    let fx = sample_repo();
    let sub = child_id(&fx, &root_tree(&fx), "sub");
    fx.store.remove(&sub);

    let rendered = fx.print_tree(None, Some("sub/inner/x.rs"), false);
    assert!(matches!(rendered.result, Err(ViewError::Store(_))));

    let (state, _, page) = fx.tree_page(None, Some("sub/inner/x.rs"), false);
    assert_eq!(state, None);
    assert_eq!(page.status, 500);
}

/// Naming a directory whose tree is missing reports it as not a tree
#[test]
fn test_missing_tree_at_target() {
    let fx = sample_repo();
    let two = child_id(&fx, &root_tree(&fx), "two");
    fx.store.remove(&two);

    let rendered = fx.print_tree(None, Some("two"), false);
    assert_eq!(
        not_found_message(rendered.result),
        format!("Not a tree object: {}", two)
    );
}

/// An empty repository root lists no rows
#[test]
fn test_empty_tree() {
    let fx = Fixture::new();
    let empty = fx.tree(vec![]);
    fx.commit(empty);

    let rendered = fx.print_tree(None, None, false);
    assert_eq!(rendered.result.unwrap(), WalkState::ListingDirectory);
    assert!(!rendered.html.contains("ls-mode"));
}

/// A nested directory lists exactly its own children
#[test]
fn test_nested_directory_listing() {
    let fx = Fixture::new();
    let one = fx.blob(b"1");
    let two = fx.blob(b"2");
    let inner = fx.tree(vec![
        TreeEntry::new("one.txt", FileMode::Regular, one),
        TreeEntry::new("two.txt", FileMode::Regular, two),
    ]);
    let sub = fx.tree(vec![TreeEntry::new("inner", FileMode::Directory, inner)]);
    let root = fx.tree(vec![TreeEntry::new("sub", FileMode::Directory, sub)]);
    fx.commit(root);

    let rendered = fx.print_tree(None, Some("sub/inner"), false);
    assert_eq!(rendered.result.unwrap(), WalkState::ListingDirectory);
    assert_eq!(rendered.html.matches("<tr><td class='ls-mode'>").count(), 2);
    assert!(rendered.html.contains("href='/?url=demo/tree/sub/inner/one.txt'>one.txt</a>"));
    assert!(rendered.html.contains("href='/?url=demo/tree/sub/inner/two.txt'>two.txt</a>"));
}
