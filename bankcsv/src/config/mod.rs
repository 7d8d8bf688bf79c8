//! Validator configuration.
//!
//! The configuration is a JSON document describing the column contract and a
//! set of named profiles (one per accounting package and locale). It is
//! checked against an embedded JSON Schema (Draft 7) before it is
//! deserialized, and the amount pattern is compiled once at load time.
//!
//! # Example
//!
//! ```rust,ignore
//! use bankcsv::config::ValidatorConfig;
//!
//! let config = ValidatorConfig::bundled()?;
//! let profile = config.profile("xero-uk")?;
//! println!("{} accepts {:?}", profile.label(), profile.currency);
//! ```

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Configuration shipped with the binary.
const BUNDLED_CONFIG: &str = include_str!("../../schemas/validator-config.json");

/// JSON Schema every configuration document must satisfy.
const CONFIG_SCHEMA: &str = include_str!("../../schemas/validator-config.schema.json");

/// Profile used when none is requested.
pub const DEFAULT_PROFILE: &str = "quickbooks-us";

/// A named set of locale-specific validation parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    /// Profile key in the configuration document.
    #[serde(skip)]
    pub name: String,

    /// Accepted strftime-style date patterns, tried in order.
    #[serde(default)]
    pub date_format: Vec<String>,

    /// `.` or `,`.
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,

    /// Allowed ISO 4217 currency codes.
    #[serde(default)]
    pub currency: Vec<String>,

    /// Human-readable name shown in reports.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_decimal_separator() -> String {
    ".".to_string()
}

impl Profile {
    /// Label for reports, falling back to the profile key.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// On-disk layout of the configuration document.
#[derive(Debug, Deserialize)]
struct RawConfig {
    required_columns: Vec<String>,
    amount_pattern: String,
    allowed_debit_credit: Vec<String>,
    profiles: BTreeMap<String, Profile>,
}

/// Loaded, immutable validator configuration.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Columns every file must carry.
    pub required_columns: Vec<String>,
    /// Compiled amount pattern.
    pub amount_pattern: Regex,
    /// Accepted `debit_credit` tokens.
    pub allowed_debit_credit: Vec<String>,
    /// Profiles by key, sorted.
    pub profiles: BTreeMap<String, Profile>,
}

impl ValidatorConfig {
    /// Load the configuration embedded in the binary.
    pub fn bundled() -> ConfigResult<Self> {
        Self::from_json_str(BUNDLED_CONFIG)
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "loading validator config");
        Self::from_json_str(&content)
    }

    /// Load `path` when given, the bundled configuration otherwise.
    pub fn load_or_bundled(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::bundled(),
        }
    }

    /// Parse, schema-check and compile a configuration document.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let document: Value = serde_json::from_str(content)?;
        check_schema(&document)?;

        let raw: RawConfig = serde_json::from_value(document)?;
        let amount_pattern = Regex::new(&raw.amount_pattern)?;

        let profiles = raw
            .profiles
            .into_iter()
            .map(|(name, mut profile)| {
                profile.name = name.clone();
                (name, profile)
            })
            .collect();

        Ok(Self {
            required_columns: raw.required_columns,
            amount_pattern,
            allowed_debit_credit: raw.allowed_debit_credit,
            profiles,
        })
    }

    /// Look up a profile by key.
    pub fn profile(&self, name: &str) -> ConfigResult<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.to_string(),
                available: self.profiles.keys().cloned().collect(),
            })
    }
}

/// Validate a configuration document against the embedded schema.
fn check_schema(document: &Value) -> ConfigResult<()> {
    let schema: Value = serde_json::from_str(CONFIG_SCHEMA)?;
    let validator = jsonschema::draft7::new(&schema)
        .map_err(|e| ConfigError::Schema(vec![format!("invalid embedded schema: {}", e)]))?;

    let errors: Vec<String> = validator
        .iter_errors(document)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Schema(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"{
        "required_columns": ["transaction_date", "amount", "debit_credit", "unique_id"],
        "amount_pattern": "^\\d+\\.\\d{2}$",
        "allowed_debit_credit": ["debit", "credit"],
        "profiles": {
            "plain": { "date_format": ["%Y-%m-%d"], "decimal_separator": "." }
        }
    }"#;

    #[test]
    fn test_bundled_config_loads() {
        let config = ValidatorConfig::bundled().unwrap();
        let profile = config.profile(DEFAULT_PROFILE).unwrap();
        assert_eq!(profile.name, DEFAULT_PROFILE);
        assert_eq!(profile.label(), "QuickBooks Online (US)");
        assert!(config.amount_pattern.is_match("12.50"));
    }

    #[test]
    fn test_label_falls_back_to_key() {
        let config = ValidatorConfig::from_json_str(MINIMAL).unwrap();
        let profile = config.profile("plain").unwrap();
        assert_eq!(profile.label(), "plain");
        assert!(profile.currency.is_empty());
    }

    #[test]
    fn test_unknown_profile_lists_sorted_keys() {
        let config = ValidatorConfig::bundled().unwrap();
        let err = config.profile("wave-za").unwrap_err();
        match err {
            ConfigError::UnknownProfile { profile, available } => {
                assert_eq!(profile, "wave-za");
                let mut sorted = available.clone();
                sorted.sort();
                assert_eq!(available, sorted);
                assert!(available.contains(&"xero-uk".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_schema_rejects_missing_fields() {
        let result = ValidatorConfig::from_json_str(r#"{ "profiles": {} }"#);
        assert!(matches!(result, Err(ConfigError::Schema(errors)) if !errors.is_empty()));
    }

    #[test]
    fn test_invalid_amount_pattern() {
        let doc = MINIMAL.replace(r"^\\d+\\.\\d{2}$", "([");
        let result = ValidatorConfig::from_json_str(&doc);
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = ValidatorConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = ValidatorConfig::load_or_bundled(Some(file.path())).unwrap();
        assert_eq!(config.required_columns.len(), 4);
        assert_eq!(config.profiles.len(), 1);
    }
}
