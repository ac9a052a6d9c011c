use std::path::PathBuf;

/// Exit codes for the CLI process.
///
/// - 0: success
/// - 1: general error (including `fmt --check` finding unformatted files)
/// - 2: invalid arguments, configuration or missing inputs
/// - 3: parse errors in at least one file
/// - 4: round-trip check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArguments = 2,
    ParseError = 3,
    RoundTripFailed = 4,
}

/// Errors returned by CLI command handlers.
///
/// Each variant maps to an `ExitCode` and can produce structured
/// output in JSON mode.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// One or more files had hard parse errors. Diagnostics have already
    /// been rendered by the time this is returned.
    #[error("{errors} parse error(s) in {files} file(s)")]
    Parse { files: usize, errors: usize },

    /// One or more files failed the round-trip check.
    #[error("round-trip check failed for {files} file(s)")]
    RoundTrip { files: usize },

    /// `fmt --check` found files that are not in generated form.
    #[error("{files} file(s) would be reformatted")]
    Unformatted { files: usize },

    /// Generation reported errors.
    #[error("generation failed: {}", messages.join("; "))]
    Generate { messages: Vec<String> },

    /// IO errors (file not found, permission denied).
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A JSON schema snapshot that does not deserialize.
    #[error("invalid schema snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Schema file or directory not found.
    #[error("no schema files found in {path}")]
    NoSchemaFiles { path: PathBuf },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Maps this error to the appropriate exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Parse { .. } => ExitCode::ParseError,
            Self::RoundTrip { .. } => ExitCode::RoundTripFailed,
            Self::Config { .. } | Self::NoSchemaFiles { .. } | Self::Snapshot { .. } => {
                ExitCode::InvalidArguments
            }
            Self::Unformatted { .. } | Self::Generate { .. } | Self::Io { .. } | Self::Other(_) => {
                ExitCode::GeneralError
            }
        }
    }

    /// Serializes this error as a JSON value for `--format json` output.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Parse { files, errors } => serde_json::json!({
                "error": "parse_error",
                "files": files,
                "errors": errors,
            }),
            Self::RoundTrip { files } => serde_json::json!({
                "error": "round_trip_failed",
                "files": files,
            }),
            Self::Generate { messages } => serde_json::json!({
                "error": "generate_error",
                "messages": messages,
            }),
            Self::Io { path, source } => serde_json::json!({
                "error": "io_error",
                "path": path.display().to_string(),
                "message": source.to_string(),
            }),
            Self::Snapshot { path, source } => serde_json::json!({
                "error": "snapshot_error",
                "path": path.display().to_string(),
                "message": source.to_string(),
            }),
            Self::Config { message } => serde_json::json!({
                "error": "config_error",
                "message": message,
            }),
            other => serde_json::json!({
                "error": "error",
                "message": other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_exit_code() {
        let err = CliError::Parse { files: 1, errors: 2 };
        assert_eq!(err.exit_code(), ExitCode::ParseError);
        assert_eq!(err.to_string(), "2 parse error(s) in 1 file(s)");
    }

    #[test]
    fn round_trip_exit_code() {
        let err = CliError::RoundTrip { files: 1 };
        assert_eq!(err.exit_code(), ExitCode::RoundTripFailed);
    }

    #[test]
    fn config_error_exit_code() {
        let err = CliError::Config {
            message: "bad config".into(),
        };
        assert_eq!(err.exit_code(), ExitCode::InvalidArguments);
    }

    #[test]
    fn no_schema_files_exit_code() {
        let err = CliError::NoSchemaFiles {
            path: PathBuf::from("schemas/"),
        };
        assert_eq!(err.exit_code(), ExitCode::InvalidArguments);
    }

    #[test]
    fn unformatted_exit_code() {
        let err = CliError::Unformatted { files: 3 };
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
        assert!(err.to_string().contains("3 file(s)"));
    }

    #[test]
    fn display_generate_error() {
        let err = CliError::Generate {
            messages: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "generation failed: a; b");
    }

    #[test]
    fn to_json_parse_error() {
        let json = CliError::Parse { files: 2, errors: 5 }.to_json();
        assert_eq!(json["error"], "parse_error");
        assert_eq!(json["errors"], 5);
    }

    #[test]
    fn to_json_io_error() {
        let err = CliError::Io {
            path: PathBuf::from("/tmp/file"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let json = err.to_json();
        assert_eq!(json["error"], "io_error");
        assert_eq!(json["path"], "/tmp/file");
    }

    #[test]
    fn to_json_other_error() {
        let err = CliError::Other("unexpected".into());
        let json = err.to_json();
        assert_eq!(json["error"], "error");
        assert!(json["message"].as_str().unwrap().contains("unexpected"));
    }

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::Success as i32, 0);
        assert_eq!(ExitCode::GeneralError as i32, 1);
        assert_eq!(ExitCode::InvalidArguments as i32, 2);
        assert_eq!(ExitCode::ParseError as i32, 3);
        assert_eq!(ExitCode::RoundTripFailed as i32, 4);
    }
}
