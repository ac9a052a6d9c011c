use std::path::{Path, PathBuf};

use dbml_forge_dsl::GenerateOptions;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// CLI configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub generate: GenerateOptions,
    #[serde(default)]
    pub cli: CliSettings,
}

/// CLI-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliSettings {
    /// Searched when a command is given no paths.
    #[serde(default = "default_schema_dir")]
    pub default_schema_dir: String,
    /// File extension matched when searching directories, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            default_schema_dir: default_schema_dir(),
            extension: default_extension(),
        }
    }
}

fn default_schema_dir() -> String {
    "schemas/".to_string()
}

fn default_extension() -> String {
    "dbml".to_string()
}

/// Discovery order for config file:
/// 1. `--config <path>` (explicit, or `DBML_FORGE_CONFIG` through clap)
/// 2. `./dbml-forge.toml` (project-local)
/// 3. `$XDG_CONFIG_HOME/dbml-forge/config.toml`
/// 4. `~/.config/dbml-forge/config.toml`
pub fn load_config(explicit_path: Option<&Path>) -> Result<CliConfig, CliError> {
    if let Some(path) = explicit_path {
        return load_config_from_path(path);
    }

    let local = PathBuf::from("dbml-forge.toml");
    if local.exists() {
        return load_config_from_path(&local);
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("dbml-forge/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config/dbml-forge/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    tracing::debug!("no config file found, using defaults");
    Ok(CliConfig::default())
}

fn load_config_from_path(path: &Path) -> Result<CliConfig, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), "loading config");
    toml::from_str(&contents).map_err(|e| CliError::Config {
        message: format!("failed to parse {}: {}", path.display(), e),
    })
}
