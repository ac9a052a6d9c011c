pub mod check;
pub mod completions;
pub mod fmt;
pub mod generate;
pub mod parse;

use std::path::{Path, PathBuf};

use dbml_forge_dsl::GenerateOptions;

use crate::cli::FormatFlags;
use crate::config::CliConfig;
use crate::error::CliError;

/// Discover notation files from a list of paths.
///
/// Paths can be files (used directly) or directories (searched recursively
/// for files with the configured extension). With no paths the configured
/// default directory is searched.
pub fn discover_files(paths: &[PathBuf], config: &CliConfig) -> Result<Vec<PathBuf>, CliError> {
    let defaults;
    let paths = if paths.is_empty() {
        defaults = [PathBuf::from(&config.cli.default_schema_dir)];
        &defaults[..]
    } else {
        paths
    };

    let extension = config.cli.extension.trim_start_matches('.');
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let pattern = format!("{}/**/*.{extension}", path.display());
            let entries = glob::glob(&pattern).map_err(|e| CliError::Other(e.to_string()))?;
            for entry in entries {
                let entry = entry.map_err(|e| CliError::Other(e.to_string()))?;
                files.push(entry);
            }
        } else {
            return Err(CliError::NoSchemaFiles { path: path.clone() });
        }
    }

    if files.is_empty() {
        let display_path = paths
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from(&config.cli.default_schema_dir));
        return Err(CliError::NoSchemaFiles { path: display_path });
    }

    files.sort();
    files.dedup();
    tracing::debug!(count = files.len(), "discovered notation files");
    Ok(files)
}

pub fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn write_output(path: &Path, text: &str) -> Result<(), CliError> {
    std::fs::write(path, text).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Config-file options with command-line flags layered on top.
pub fn resolve_options(config: &CliConfig, flags: &FormatFlags) -> GenerateOptions {
    let mut options = config.generate.clone();
    if let Some(indent) = flags.indent {
        options.indent_size = indent;
    }
    if flags.comments {
        options.include_comments = true;
    }
    if flags.metadata {
        options.include_metadata = true;
    }
    if flags.no_custom_properties {
        options.preserve_custom_properties = false;
    }
    if flags.compact {
        options.format_output = false;
    }
    options
}
