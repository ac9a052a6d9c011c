use dbml_forge_dsl::{generate, parse};

use crate::cli::ParseArgs;
use crate::commands::{discover_files, read_source};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `parse` command: parse notation files and render diagnostics.
pub fn run(args: ParseArgs, config: &CliConfig, output: &OutputContext) -> Result<(), CliError> {
    let files = discover_files(&args.paths, config)?;

    let mut total_tables = 0usize;
    let mut total_errors = 0usize;
    let mut total_warnings = 0usize;
    let mut failed_files = 0usize;
    let mut all_file_results: Vec<serde_json::Value> = Vec::new();

    for file in &files {
        let source_text = read_source(file)?;
        let filename = file.display().to_string();
        let result = parse(&source_text);

        let tables = result.schema.tables.len();
        total_tables += tables;
        total_errors += result.errors.len();
        total_warnings += result.warnings.len();
        if !result.is_ok() {
            failed_files += 1;
        }

        output.diagnostics(&result, &source_text, &filename);

        let generated = args
            .print
            .then(|| generate(&result.schema, &config.generate).text);
        if let Some(text) = generated.as_deref().filter(|_| output.mode != OutputMode::Json) {
            print!("{text}");
        }

        match output.mode {
            OutputMode::Json => {
                all_file_results.push(serde_json::json!({
                    "file": filename,
                    "tables": tables,
                    "references": result.schema.references.len(),
                    "errors": result.errors,
                    "warnings": result.warnings,
                    "featuresUsed": result.metadata.features_used,
                    "generated": generated,
                }));
            }
            OutputMode::Human if result.is_ok() => {
                output.status(&format!("  {filename} .... {tables} tables"));
            }
            _ => {}
        }
    }

    // Summary
    match output.mode {
        OutputMode::Human => {
            let summary = format!(
                "{total_tables} tables parsed from {} files, {total_errors} errors, {total_warnings} warnings",
                files.len()
            );
            output.summary(failed_files == 0, &summary);
        }
        OutputMode::Json => {
            output.print_json(&serde_json::json!({
                "files": files.len(),
                "tables": total_tables,
                "errors": total_errors,
                "warnings": total_warnings,
                "results": all_file_results,
            }));
        }
        OutputMode::Plain => {
            println!(
                "{}\t{total_tables}\t{total_errors}\t{total_warnings}",
                files.len()
            );
        }
    }

    if failed_files > 0 {
        Err(CliError::Parse {
            files: failed_files,
            errors: total_errors,
        })
    } else {
        Ok(())
    }
}
