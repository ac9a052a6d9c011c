use std::path::Path;

use dbml_forge_core::types::Schema;
use dbml_forge_dsl::{generate, parse};

use crate::cli::GenerateArgs;
use crate::commands::{read_source, resolve_options, write_output};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `generate` command: write notation for a schema snapshot.
///
/// A `.json` input is read as a serialized `Schema`; anything else is
/// parsed as notation first and must parse without errors.
pub fn run(args: GenerateArgs, config: &CliConfig, output: &OutputContext) -> Result<(), CliError> {
    let schema = load_schema(&args.input, output)?;
    let options = resolve_options(config, &args.format);
    let result = generate(&schema, &options);

    for warning in &result.warnings {
        output.warn(warning);
    }
    if !result.success {
        return Err(CliError::Generate {
            messages: result.errors,
        });
    }

    if let Some(path) = &args.output {
        write_output(path, &result.text)?;
    }

    match output.mode {
        OutputMode::Json => {
            let value = serde_json::to_value(&result).map_err(|e| CliError::Other(e.to_string()))?;
            output.print_json(&value);
        }
        _ if args.output.is_none() => print!("{}", result.text),
        _ => {}
    }

    if let Some(path) = &args.output {
        output.success(&format!(
            "{} tables and {} references written to {}",
            result.metadata.tables_generated,
            result.metadata.references_generated,
            path.display()
        ));
    }
    Ok(())
}

fn load_schema(input: &Path, output: &OutputContext) -> Result<Schema, CliError> {
    let source = read_source(input)?;

    if input.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        tracing::debug!(path = %input.display(), "reading schema snapshot");
        return serde_json::from_str(&source).map_err(|e| CliError::Snapshot {
            path: input.to_path_buf(),
            source: e,
        });
    }

    let result = parse(&source);
    output.diagnostics(&result, &source, &input.display().to_string());
    if !result.is_ok() {
        return Err(CliError::Parse {
            files: 1,
            errors: result.errors.len(),
        });
    }
    Ok(result.schema)
}
