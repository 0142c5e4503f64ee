//! Merge rules: defaults applied before any file or environment source.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use std::path::Path;

/// Create a Config builder with defaults applied.
///
/// The repository name and URL default to the workspace directory name.
pub fn builder_with_defaults(
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let repo_name = workspace_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "repository".to_string());

    Config::builder()
        .set_default("site.script_name", "/")?
        .set_default("site.enable_tree_linenumbers", true)?
        .set_default("repo.name", repo_name.clone())?
        .set_default("repo.url", repo_name)?
        .set_default("repo.default_branch", "master")?
        .set_default("store.path", ".grove/store")
}
