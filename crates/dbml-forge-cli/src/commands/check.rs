use dbml_forge_dsl::{parse, validate_round_trip};

use crate::cli::CheckArgs;
use crate::commands::{discover_files, read_source};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `check` command: parse each file, then generate and reparse its
/// schema and compare the two.
pub fn run(args: CheckArgs, config: &CliConfig, output: &OutputContext) -> Result<(), CliError> {
    let files = discover_files(&args.paths, config)?;

    let mut parse_failures = 0usize;
    let mut parse_errors = 0usize;
    let mut round_trip_failures = 0usize;
    let mut results: Vec<serde_json::Value> = Vec::new();

    for file in &files {
        let source_text = read_source(file)?;
        let filename = file.display().to_string();
        let parsed = parse(&source_text);
        output.diagnostics(&parsed, &source_text, &filename);

        if !parsed.is_ok() {
            parse_failures += 1;
            parse_errors += parsed.errors.len();
            results.push(serde_json::json!({
                "file": filename,
                "parsed": false,
                "errors": parsed.errors,
            }));
            continue;
        }

        let report = validate_round_trip(&parsed.schema, &config.generate);
        if report.passed() {
            output.status(&format!("  {filename} .... round trip ok"));
        } else {
            round_trip_failures += 1;
            for mismatch in &report.mismatches {
                match output.mode {
                    OutputMode::Human => output.warn(&format!("{filename}: {mismatch}")),
                    OutputMode::Plain => println!("{filename}\t{mismatch}"),
                    OutputMode::Json => {}
                }
            }
        }
        results.push(serde_json::json!({
            "file": filename,
            "parsed": true,
            "passed": report.passed(),
            "mismatches": report.mismatches,
            "reparseErrors": report.reparse_errors,
        }));
    }

    match output.mode {
        OutputMode::Json => {
            output.print_json(&serde_json::json!({
                "files": files.len(),
                "parseFailures": parse_failures,
                "roundTripFailures": round_trip_failures,
                "results": results,
            }));
        }
        OutputMode::Human if parse_failures == 0 && round_trip_failures == 0 => {
            output.success(&format!("{} files passed the round-trip check", files.len()));
        }
        _ => {}
    }

    if parse_failures > 0 {
        return Err(CliError::Parse {
            files: parse_failures,
            errors: parse_errors,
        });
    }
    if round_trip_failures > 0 {
        return Err(CliError::RoundTrip {
            files: round_trip_failures,
        });
    }
    Ok(())
}
