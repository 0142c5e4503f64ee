//! Configuration System
//!
//! Layered configuration: built-in defaults, the user's global file, the
//! workspace files and finally `GROVE__SECTION__KEY` environment variables.
//! Validation collects every problem instead of stopping at the first.

use crate::filter::FilterConfig;
use crate::logging::{validate_logging_config, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

mod facade;
mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod workspace_file;
}

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroveConfig {
    /// Site-wide display settings
    #[serde(default)]
    pub site: SiteConfig,

    /// The repository being viewed
    #[serde(default)]
    pub repo: RepoConfig,

    /// External filters by name
    #[serde(default)]
    pub filters: HashMap<String, FilterConfig>,

    /// Extension → mimetype overrides
    #[serde(default)]
    pub mimetypes: HashMap<String, String>,

    /// Object store location
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Site-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Path prefix for path-style links; query-style links when unset
    #[serde(default)]
    pub virtual_root: Option<String>,

    /// Script URL used for query-style links
    #[serde(default = "default_script_name")]
    pub script_name: String,

    /// Largest blob shown inline, in KB. 0 disables the limit.
    #[serde(default)]
    pub max_blob_size: u64,

    #[serde(default)]
    pub enable_blame: bool,

    #[serde(default = "default_true")]
    pub enable_tree_linenumbers: bool,

    /// Optional `mime.types` file consulted after `[mimetypes]`
    #[serde(default)]
    pub mimetype_file: Option<PathBuf>,

    /// Commits per log page
    #[serde(default = "default_max_commit_count")]
    pub max_commit_count: usize,
}

fn default_script_name() -> String {
    "/".to_string()
}

fn default_max_commit_count() -> usize {
    50
}

fn default_true() -> bool {
    true
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            virtual_root: None,
            script_name: default_script_name(),
            max_blob_size: 0,
            enable_blame: false,
            enable_tree_linenumbers: true,
            mimetype_file: None,
            max_commit_count: default_max_commit_count(),
        }
    }
}

/// Repository settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Display name, used as the page title
    #[serde(default = "default_repo_name")]
    pub name: String,

    /// URL component of the repository
    #[serde(default = "default_repo_name")]
    pub url: String,

    #[serde(default = "default_branch")]
    pub default_branch: String,

    #[serde(default)]
    pub enable_stats: bool,

    /// Filter applied to text blobs
    #[serde(default)]
    pub source_filter: Option<String>,

    /// File extension → render filter name
    #[serde(default)]
    pub render: HashMap<String, String>,

    /// Submodule URL pattern with `{path}` and `{id}` placeholders
    #[serde(default)]
    pub module_link: Option<String>,

    /// Submodule path → URL
    #[serde(default)]
    pub submodules: HashMap<String, String>,
}

fn default_repo_name() -> String {
    "repository".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            name: default_repo_name(),
            url: default_repo_name(),
            default_branch: default_branch(),
            enable_stats: false,
            source_filter: None,
            render: HashMap::new(),
            module_link: None,
            submodules: HashMap::new(),
        }
    }
}

impl RepoConfig {
    /// Render filter name for a file extension (case-insensitive).
    pub fn render_filter_for(&self, ext: &str) -> Option<&str> {
        self.render
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(ext))
            .map(|(_, name)| name.as_str())
    }
}

/// Storage paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Sled database directory, relative to the workspace root
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".grove/store")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Site(String),
    Repo(String),
    Filter(String, String),
    Store(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Site(msg) => write!(f, "Site: {}", msg),
            ValidationError::Repo(msg) => write!(f, "Repo: {}", msg),
            ValidationError::Filter(name, msg) => write!(f, "Filter '{}': {}", name, msg),
            ValidationError::Store(msg) => write!(f, "Store: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl GroveConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.site.script_name.is_empty() {
            errors.push(ValidationError::Site("script_name cannot be empty".to_string()));
        }
        if matches!(&self.site.virtual_root, Some(root) if root.is_empty()) {
            errors.push(ValidationError::Site(
                "virtual_root cannot be empty (leave it unset for query-style links)".to_string(),
            ));
        }
        if self.site.max_commit_count == 0 {
            errors.push(ValidationError::Site("max_commit_count must be at least 1".to_string()));
        }

        if self.repo.url.is_empty() {
            errors.push(ValidationError::Repo("url cannot be empty".to_string()));
        }
        if self.repo.default_branch.is_empty() {
            errors.push(ValidationError::Repo("default_branch cannot be empty".to_string()));
        }
        if let Some(name) = &self.repo.source_filter {
            if !self.filters.contains_key(name) {
                errors.push(ValidationError::Repo(format!(
                    "source_filter '{}' is not a configured filter",
                    name
                )));
            }
        }
        let mut render: Vec<_> = self.repo.render.iter().collect();
        render.sort();
        for (ext, name) in render {
            if !self.filters.contains_key(name) {
                errors.push(ValidationError::Repo(format!(
                    "render filter '{}' for extension '{}' is not a configured filter",
                    name, ext
                )));
            }
        }

        let mut filters: Vec<_> = self.filters.iter().collect();
        filters.sort_by(|a, b| a.0.cmp(b.0));
        for (name, filter) in filters {
            if filter.command.as_os_str().is_empty() {
                errors.push(ValidationError::Filter(
                    name.clone(),
                    "command cannot be empty".to_string(),
                ));
            }
        }

        if self.store.path.as_os_str().is_empty() {
            errors.push(ValidationError::Store("path cannot be empty".to_string()));
        }

        if let Err(e) = validate_logging_config(&self.logging) {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
