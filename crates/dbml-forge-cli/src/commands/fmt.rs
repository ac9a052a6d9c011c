use dbml_forge_dsl::{generate, parse};

use crate::cli::FmtArgs;
use crate::commands::{discover_files, read_source, resolve_options, write_output};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `fmt` command: rewrite files in generated form.
///
/// Only files that parse without errors or warnings and hold no `//`
/// comment lines are rewritten; the rest are reported and left untouched.
pub fn run(args: FmtArgs, config: &CliConfig, output: &OutputContext) -> Result<(), CliError> {
    let files = discover_files(&args.paths, config)?;
    let options = resolve_options(config, &args.format);

    let mut changed = Vec::new();
    let mut skipped = Vec::new();
    let mut failed_files = 0usize;
    let mut total_errors = 0usize;

    for file in &files {
        let source_text = read_source(file)?;
        let filename = file.display().to_string();
        let result = parse(&source_text);

        if !result.is_ok() {
            output.diagnostics(&result, &source_text, &filename);
            failed_files += 1;
            total_errors += result.errors.len();
            continue;
        }
        if !result.warnings.is_empty() {
            output.diagnostics(&result, &source_text, &filename);
            output.warn(&format!(
                "{filename} skipped: it holds constructs that regenerating would drop"
            ));
            skipped.push(filename);
            continue;
        }
        if result.metadata.comment_lines > 0 {
            output.warn(&format!(
                "{filename} skipped: regenerating would drop {} comment line(s)",
                result.metadata.comment_lines
            ));
            skipped.push(filename);
            continue;
        }

        let generated = generate(&result.schema, &options);
        if !generated.success {
            return Err(CliError::Generate {
                messages: generated.errors,
            });
        }
        if generated.text == source_text {
            tracing::debug!(file = %filename, "already formatted");
            continue;
        }

        if args.check {
            match output.mode {
                OutputMode::Human => output.warn(&format!("{filename} would be reformatted")),
                OutputMode::Plain => println!("{filename}"),
                OutputMode::Json => {}
            }
        } else {
            write_output(file, &generated.text)?;
            output.status(&format!("  formatted {filename}"));
        }
        changed.push(filename);
    }

    match output.mode {
        OutputMode::Json => {
            output.print_json(&serde_json::json!({
                "files": files.len(),
                "check": args.check,
                "changed": changed,
                "skipped": skipped,
                "errors": total_errors,
            }));
        }
        OutputMode::Human if !args.check => {
            output.success(&format!(
                "{} of {} files reformatted",
                changed.len(),
                files.len()
            ));
        }
        _ => {}
    }

    if failed_files > 0 {
        return Err(CliError::Parse {
            files: failed_files,
            errors: total_errors,
        });
    }
    if args.check && !changed.is_empty() {
        return Err(CliError::Unformatted {
            files: changed.len(),
        });
    }
    Ok(())
}
