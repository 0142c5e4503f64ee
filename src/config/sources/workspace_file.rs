//! Workspace config file source: grove.toml and grove.{GROVE_ENV}.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

/// Add workspace config files to builder.
/// Precedence: grove.toml (base) then grove.{GROVE_ENV}.toml when GROVE_ENV is set.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let base_config_path = workspace_root.join("grove.toml");
    if base_config_path.is_file() {
        builder = builder.add_source(
            File::from(base_config_path)
                .format(FileFormat::Toml)
                .required(false),
        );
    }

    if let Ok(env_name) = std::env::var("GROVE_ENV") {
        let env_config_path = workspace_root.join(format!("grove.{}.toml", env_name));
        if env_config_path.is_file() {
            builder = builder.add_source(
                File::from(env_config_path)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
    }

    Ok(builder)
}
