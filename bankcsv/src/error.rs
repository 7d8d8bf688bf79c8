//! Error types for the bankcsv validator and generators.
//!
//! Errors here are the *fatal* tier: they abort a run before (or instead of)
//! producing a report. Content problems found inside a CSV are not errors,
//! they are [`crate::models::ValidationIssue`]s collected by the rule checks.
//!
//! - [`ConfigError`] - validator configuration loading and profile lookup
//! - [`CsvError`] - reading the CSV under validation
//! - [`GenerateError`] - fixture, sample and release generation
//! - [`CliError`] - top-level error handled once in `main`
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading the validator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file does not exist.
    #[error("Config file not found at {0}. Download the latest repo bundle or run from the project root.")]
    NotFound(PathBuf),

    /// Config file exists but could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid JSON or does not deserialize.
    #[error("Config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Config does not satisfy the embedded JSON schema.
    #[error("Config does not match the expected layout: {}", .0.join("; "))]
    Schema(Vec<String>),

    /// `amount_pattern` is not a valid regular expression.
    #[error("Config amount_pattern is not a valid regex: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Requested profile is not defined.
    #[error("Unknown profile '{profile}'. Available options: {}", .available.join(", "))]
    UnknownProfile {
        profile: String,
        available: Vec<String>,
    },
}

// =============================================================================
// CSV Input Errors
// =============================================================================

/// Errors while reading the CSV under validation.
#[derive(Debug, Error)]
pub enum CsvError {
    /// File does not exist.
    #[error("We couldn't find {0}. Drag & drop the file onto this tool or run it again with the correct path.")]
    NotFound(PathBuf),

    /// File exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not UTF-8.
    #[error("The file isn't UTF-8 (it looks like {detected}). Re-save it as 'CSV UTF-8 (Comma delimited)' and try again.")]
    NotUtf8 { detected: String },

    /// CSV structure could not be parsed.
    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },

    /// No data rows.
    #[error("The CSV is empty. Export a fresh file or download a sample from the Releases tab.")]
    Empty,
}

// =============================================================================
// Generation Errors
// =============================================================================

/// Errors from the fixture, sample and release generators.
///
/// Generators run on versioned, trusted input, so any malformed entry is
/// reported as fatal rather than skipped.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Filesystem failure on a specific path.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog or fixture YAML is malformed.
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Manifest serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer failure.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Region uses a date layout the generator cannot render.
    #[error("Unsupported date format pattern: {0}")]
    UnsupportedDateFormat(String),

    /// Archive writer failure.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal failure.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl GenerateError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a YAML error with the document it came from.
    pub fn yaml(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }
}

// =============================================================================
// CLI Errors (top-level)
// =============================================================================

/// Top-level error returned by every CLI command.
///
/// `main` is the only place that prints these and picks the exit status.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// CSV input error.
    #[error(transparent)]
    Csv(#[from] CsvError),

    /// Generator error.
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// Interactive prompt got nothing.
    #[error("No file provided. Run the tool again and drop the CSV onto it.")]
    NoInput,

    /// Interactive prompt could not be read.
    #[error("Could not read the file path from the terminal: {0}")]
    Prompt(#[source] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for CSV reading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for generators.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let csv_err = CsvError::Empty;
        let cli_err: CliError = csv_err.into();
        assert!(cli_err.to_string().contains("empty"));

        let config_err = ConfigError::UnknownProfile {
            profile: "nope".into(),
            available: vec!["quickbooks-us".into(), "xero-uk".into()],
        };
        let cli_err: CliError = config_err.into();
        assert!(cli_err.to_string().contains("nope"));
        assert!(cli_err.to_string().contains("quickbooks-us, xero-uk"));
    }

    #[test]
    fn test_not_utf8_message_names_encoding() {
        let err = CsvError::NotUtf8 {
            detected: "windows-1252".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("windows-1252"));
        assert!(msg.contains("CSV UTF-8"));
    }

    #[test]
    fn test_schema_errors_joined() {
        let err = ConfigError::Schema(vec!["a is required".into(), "b is required".into()]);
        assert_eq!(
            err.to_string(),
            "Config does not match the expected layout: a is required; b is required"
        );
    }
}
