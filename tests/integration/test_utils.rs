//! Shared test utilities for integration tests
//!
//! Provides an in-memory repository fixture with the collaborators a render
//! pass needs, and isolation for tests that read the XDG config directory.

use grove::classify::NulScan;
use grove::config::{RepoConfig, SiteConfig};
use grove::error::ViewError;
use grove::filter::{Filter, FilterRegistry};
use grove::html::Html;
use grove::mime::MimeTypes;
use grove::store::{MemoryStore, ObjectWriter};
use grove::types::{FileMode, ObjectId, TreeEntry, WalkState};
use grove::view::{log_page, print_tree, tree_page, LogRequest, Page, Query, RenderContext};
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize XDG environment variable access across all tests
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    xdg_config_home: Option<String>,
    grove_env: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
            grove_env: std::env::var("GROVE_ENV").ok(),
        }
    }

    fn restore(self) {
        match self.xdg_config_home {
            Some(orig) => std::env::set_var("XDG_CONFIG_HOME", orig),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
        match self.grove_env {
            Some(orig) => std::env::set_var("GROVE_ENV", orig),
            None => std::env::remove_var("GROVE_ENV"),
        }
    }
}

/// Run `f` with XDG_CONFIG_HOME pointing into `test_dir` and GROVE_ENV unset.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let config_home = test_dir.path().join("xdg");
    std::fs::create_dir_all(&config_home).unwrap();
    std::env::set_var("XDG_CONFIG_HOME", config_home.to_str().unwrap());
    std::env::remove_var("GROVE_ENV");

    let result = f();

    env_state.restore();
    result
}

/// One repository in memory plus everything a render pass borrows.
pub struct Fixture {
    pub store: MemoryStore,
    pub site: SiteConfig,
    pub repo: RepoConfig,
    pub filters: FilterRegistry,
    pub mimetypes: MimeTypes,
    pub query: Query,
}

/// Output of one render pass
pub struct Rendered {
    pub result: Result<WalkState, ViewError>,
    pub html: String,
    pub page: Page,
}

impl Fixture {
    /// Query-style links through `/`, repo url `demo`, head `master`.
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            site: SiteConfig::default(),
            repo: RepoConfig {
                name: "demo".to_string(),
                url: "demo".to_string(),
                default_branch: "master".to_string(),
                ..RepoConfig::default()
            },
            filters: FilterRegistry::new(),
            mimetypes: MimeTypes::new(&HashMap::new()),
            query: Query::new("master"),
        }
    }

    pub fn blob(&self, content: &[u8]) -> ObjectId {
        self.store.write_blob(content).unwrap()
    }

    pub fn tree(&self, entries: Vec<TreeEntry>) -> ObjectId {
        self.store.write_tree(entries).unwrap()
    }

    /// Commit `tree` and point `master` at it.
    pub fn commit(&self, tree: ObjectId) -> ObjectId {
        let commit = self.store.write_commit(tree, vec![], "fixture").unwrap();
        self.store.update_ref("master", commit).unwrap();
        commit
    }

    /// Commit `tree` on top of `parents` and point `master` at it.
    pub fn commit_on(&self, tree: ObjectId, parents: Vec<ObjectId>, message: &str) -> ObjectId {
        let commit = self.store.write_commit(tree, parents, message).unwrap();
        self.store.update_ref("master", commit).unwrap();
        commit
    }

    pub fn register(&mut self, filter: impl Filter + 'static) {
        self.filters.register(Box::new(filter));
    }

    pub fn set_mimetypes(&mut self, pairs: &[(&str, &str)]) {
        let table: HashMap<String, String> = pairs
            .iter()
            .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
            .collect();
        self.mimetypes = MimeTypes::new(&table);
    }

    pub fn ctx(&self) -> RenderContext<'_, MemoryStore> {
        RenderContext {
            store: &self.store,
            site: &self.site,
            repo: &self.repo,
            filters: &self.filters,
            mimetypes: &self.mimetypes,
            classifier: &NulScan,
            query: &self.query,
        }
    }

    /// `print_tree` into a string; errors are returned, not rendered.
    pub fn print_tree(&self, rev: Option<&str>, path: Option<&str>, use_render: bool) -> Rendered {
        let mut page = Page::new(self.repo.name.clone());
        let mut out = Html::new(Vec::new());
        let result = print_tree(&self.ctx(), &mut out, &mut page, rev, path, use_render);
        Rendered {
            result,
            html: String::from_utf8(out.into_inner()).unwrap(),
            page,
        }
    }

    /// `tree_page` into a string; errors become an error page.
    pub fn tree_page(
        &self,
        rev: Option<&str>,
        path: Option<&str>,
        use_render: bool,
    ) -> (Option<WalkState>, String, Page) {
        let mut page = Page::new(self.repo.name.clone());
        let mut out = Html::new(Vec::new());
        let state = tree_page(&self.ctx(), &mut out, &mut page, rev, path, use_render).unwrap();
        (state, String::from_utf8(out.into_inner()).unwrap(), page)
    }

    /// `log_page` into a string; errors become an error page.
    pub fn log(&self, req: &LogRequest<'_>) -> (Option<usize>, String, Page) {
        let mut page = Page::new(self.repo.name.clone());
        let mut out = Html::new(Vec::new());
        let shown = log_page(&self.ctx(), &mut out, &mut page, req).unwrap();
        (shown, String::from_utf8(out.into_inner()).unwrap(), page)
    }
}

/// Fixture with this layout committed on `master`:
///
/// ```text
/// a.txt          "hello\n"
/// sub/inner/x.rs "fn main() {}\n"
/// two/b.txt      "b"
/// two/c.txt      "c"
/// ```
pub fn sample_repo() -> Fixture {
    let fx = Fixture::new();
    let hello = fx.blob(b"hello\n");
    let main = fx.blob(b"fn main() {}\n");
    let b = fx.blob(b"b");
    let c = fx.blob(b"c");

    let inner = fx.tree(vec![TreeEntry::new("x.rs", FileMode::Regular, main)]);
    let sub = fx.tree(vec![TreeEntry::new("inner", FileMode::Directory, inner)]);
    let two = fx.tree(vec![
        TreeEntry::new("b.txt", FileMode::Regular, b),
        TreeEntry::new("c.txt", FileMode::Regular, c),
    ]);
    let root = fx.tree(vec![
        TreeEntry::new("a.txt", FileMode::Regular, hello),
        TreeEntry::new("sub", FileMode::Directory, sub),
        TreeEntry::new("two", FileMode::Directory, two),
    ]);
    fx.commit(root);
    fx
}
