//! # bankcsv - bank statement CSV validation and sample generation
//!
//! Checks bank-statement CSV exports against per-institution formatting
//! rules before they are imported into an accounting package, and produces
//! the synthetic sample files, manifests and release bundles those rules
//! are demonstrated with.
//!
//! ## Architecture
//!
//! ```text
//! Validation path
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Config    │────▶│   Parser    │────▶│   Checks    │────▶│   Report    │
//! │   (JSON)    │     │ (UTF-8/BOM) │     │ (6 rules)   │     │ (exit 0/1)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!
//! Generation path
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Catalog   │────▶│  Fixtures   │────▶│   Samples   │────▶│  Releases   │
//! │   (YAML)    │     │   (YAML)    │     │ (CSV+SHA256)│     │   (zip)     │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bankcsv::{validate_file, Report, ValidatorConfig};
//!
//! let config = ValidatorConfig::bundled()?;
//! let profile = config.profile("xero-uk")?;
//! let issues = validate_file(Path::new("statement.csv"), &config, profile)?;
//! print!("{}", Report::new(issues, profile.label()).to_text());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Issues and rows
//! - [`config`] - Validator configuration and profiles
//! - [`parser`] - CSV reading with encoding detection
//! - [`validation`] - Rule checks
//! - [`report`] - Pass/fail summary
//! - [`generate`] - Fixture, sample and release generators
//! - [`logging`] - Diagnostic logging setup

// Core modules
pub mod error;
pub mod models;

// Validation path
pub mod config;
pub mod parser;
pub mod report;
pub mod validation;

// Generation path
pub mod generate;

// Ambient
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CliError, CliResult, ConfigError, ConfigResult, CsvError, CsvResult, GenerateError,
    GenerateResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{line_number, IssueCode, Row, ValidationIssue};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{Profile, ValidatorConfig, DEFAULT_PROFILE};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{decode_utf8, detect_encoding, parse_bytes, read_csv_file, ParseResult};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{validate_file, validate_rows};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::{Report, EXIT_CLEAN, EXIT_ISSUES};

// =============================================================================
// Re-exports - Generators
// =============================================================================

pub use generate::fixtures::generate_fixtures;
pub use generate::manifest::{EdgeCaseRecord, Manifest, ManifestRecord};
pub use generate::release::package_release;
pub use generate::samples::generate_all;
pub use generate::GenerateSettings;
