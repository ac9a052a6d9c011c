use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Parse, check and regenerate table-notation schema files.
///
/// dbml-forge reads `Table`/`Ref` notation into a schema model, reports
/// line-level diagnostics, and writes the model back out as notation.
#[derive(Parser)]
#[command(
    name = "dbml-forge",
    version,
    about = "Parse, check and regenerate table-notation schema files",
    after_help = "Use 'dbml-forge <command> --help' for more information about a command.",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all subcommands.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path [env: DBML_FORGE_CONFIG]
    #[arg(short = 'c', long = "config", global = true, env = "DBML_FORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: human (default), json, plain
    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = ["human", "json", "plain"]
    )]
    pub format: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output [env: NO_COLOR]
    #[arg(long = "no-color", global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse schema files and report diagnostics
    Parse(ParseArgs),

    /// Generate notation from a JSON schema snapshot or a notation file
    Generate(GenerateArgs),

    /// Rewrite schema files in canonical generated form
    Fmt(FmtArgs),

    /// Check that schema files survive a generate/reparse round trip
    Check(CheckArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Formatting flags shared by every command that generates notation.
/// Unset flags fall back to the `[generate]` config section.
#[derive(Args, Debug, Default)]
pub struct FormatFlags {
    /// Spaces per indentation level
    #[arg(long = "indent")]
    pub indent: Option<usize>,

    /// Emit section comments
    #[arg(long = "comments")]
    pub comments: bool,

    /// Emit a generation header comment
    #[arg(long = "metadata")]
    pub metadata: bool,

    /// Drop settings the notation does not interpret
    #[arg(long = "no-custom-properties")]
    pub no_custom_properties: bool,

    /// No indentation or blank lines
    #[arg(long = "compact")]
    pub compact: bool,
}

/// Arguments for `dbml-forge parse`.
#[derive(Args)]
pub struct ParseArgs {
    /// Schema files or directories to parse (default: [cli] default_schema_dir)
    pub paths: Vec<PathBuf>,

    /// Print the regenerated notation for each file
    #[arg(long = "print")]
    pub print: bool,
}

/// Arguments for `dbml-forge generate`.
#[derive(Args)]
pub struct GenerateArgs {
    /// Input file: a `.json` schema snapshot, or notation text
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub format: FormatFlags,
}

/// Arguments for `dbml-forge fmt`.
#[derive(Args)]
pub struct FmtArgs {
    /// Schema files or directories to format (default: [cli] default_schema_dir)
    pub paths: Vec<PathBuf>,

    /// Report files that would change without writing them
    #[arg(long = "check")]
    pub check: bool,

    #[command(flatten)]
    pub format: FormatFlags,
}

/// Arguments for `dbml-forge check`.
#[derive(Args)]
pub struct CheckArgs {
    /// Schema files or directories to check (default: [cli] default_schema_dir)
    pub paths: Vec<PathBuf>,
}

/// Arguments for `dbml-forge completions`.
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_minimal_args() {
        let cli = Cli::try_parse_from(["dbml-forge", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions(_)));
    }

    #[test]
    fn parse_global_verbose() {
        let cli = Cli::try_parse_from(["dbml-forge", "-vvv", "completions", "bash"]).unwrap();
        assert_eq!(cli.global.verbose, 3);
    }

    #[test]
    fn parse_global_format_json() {
        let cli =
            Cli::try_parse_from(["dbml-forge", "--format", "json", "completions", "bash"]).unwrap();
        assert_eq!(cli.global.format, "json");
    }

    #[test]
    fn parse_parse_command_with_print() {
        let cli = Cli::try_parse_from(["dbml-forge", "parse", "--print", "schemas/"]).unwrap();
        if let Commands::Parse(args) = cli.command {
            assert!(args.print);
            assert_eq!(args.paths, vec![PathBuf::from("schemas/")]);
        } else {
            panic!("expected Parse command");
        }
    }

    #[test]
    fn parse_without_paths_uses_config_default() {
        let cli = Cli::try_parse_from(["dbml-forge", "check"]).unwrap();
        if let Commands::Check(args) = cli.command {
            assert!(args.paths.is_empty());
        } else {
            panic!("expected Check command");
        }
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::try_parse_from([
            "dbml-forge",
            "generate",
            "schema.json",
            "-o",
            "out.dbml",
            "--indent",
            "4",
            "--comments",
        ])
        .unwrap();
        if let Commands::Generate(args) = cli.command {
            assert_eq!(args.input, PathBuf::from("schema.json"));
            assert_eq!(args.output, Some(PathBuf::from("out.dbml")));
            assert_eq!(args.format.indent, Some(4));
            assert!(args.format.comments);
            assert!(!args.format.compact);
        } else {
            panic!("expected Generate command");
        }
    }

    #[test]
    fn parse_fmt_check() {
        let cli = Cli::try_parse_from(["dbml-forge", "fmt", "--check", "a.dbml"]).unwrap();
        if let Commands::Fmt(args) = cli.command {
            assert!(args.check);
            assert_eq!(args.paths, vec![PathBuf::from("a.dbml")]);
        } else {
            panic!("expected Fmt command");
        }
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let result = Cli::try_parse_from(["dbml-forge", "-v", "-q", "completions", "bash"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_format_rejected() {
        let result = Cli::try_parse_from(["dbml-forge", "--format", "xml", "completions", "bash"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_shell_rejected() {
        let result = Cli::try_parse_from(["dbml-forge", "completions", "tcsh"]);
        assert!(result.is_err());
    }
}
