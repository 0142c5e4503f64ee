//! Config loading entry points.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::GroveConfig;
use config::{ConfigError, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Loads `GroveConfig` from its layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (highest last): defaults, global file, `grove.toml`,
    /// `grove.{GROVE_ENV}.toml`, `GROVE__SECTION__KEY` environment variables.
    pub fn load(workspace_root: &Path) -> Result<GroveConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults(workspace_root)?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        builder
            .add_source(
                Environment::with_prefix("GROVE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a single file on top of the defaults.
    pub fn load_from_file(path: &Path) -> Result<GroveConfig, ConfigError> {
        let workspace_root = path.parent().unwrap_or_else(|| Path::new("."));
        merge_policy::builder_with_defaults(workspace_root)?
            .add_source(File::from(path).format(FileFormat::Toml).required(true))
            .build()?
            .try_deserialize()
    }

    /// Location of the user-level config file.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    /// Built-in defaults only.
    pub fn default() -> GroveConfig {
        GroveConfig::default()
    }
}
