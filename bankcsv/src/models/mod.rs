//! Domain models for the validation path.
//!
//! - [`IssueCode`] - stable identifiers for every content issue
//! - [`ValidationIssue`] - one collected problem with a remediation hint
//! - [`Row`] - one CSV data line keyed by column name

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Issue Code
// =============================================================================

/// Identifier of a validation issue.
///
/// The rendered codes are part of the public contract: edge-case fixtures
/// reference them in `expected_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueCode {
    /// CSV001 - required column(s) missing.
    #[serde(rename = "CSV001")]
    MissingColumns,
    /// CSV002 - transaction_date blank.
    #[serde(rename = "CSV002")]
    BlankDate,
    /// CSV004 - transaction_date matches none of the accepted patterns.
    #[serde(rename = "CSV004")]
    InvalidDate,
    /// CSV005 - amount blank.
    #[serde(rename = "CSV005")]
    BlankAmount,
    /// CSV006 - amount does not match the amount pattern.
    #[serde(rename = "CSV006")]
    InvalidAmount,
    /// CSV008 - debit_credit outside the allowed vocabulary.
    #[serde(rename = "CSV008")]
    InvalidDebitCredit,
    /// CSV010 - duplicate unique_id values.
    #[serde(rename = "CSV010")]
    DuplicateIds,
    /// CSV022 - currency outside the profile's list.
    #[serde(rename = "CSV022")]
    UnsupportedCurrency,
}

impl IssueCode {
    /// The stable code string, e.g. `CSV004`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingColumns => "CSV001",
            Self::BlankDate => "CSV002",
            Self::InvalidDate => "CSV004",
            Self::BlankAmount => "CSV005",
            Self::InvalidAmount => "CSV006",
            Self::InvalidDebitCredit => "CSV008",
            Self::DuplicateIds => "CSV010",
            Self::UnsupportedCurrency => "CSV022",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Validation Issue
// =============================================================================

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,
    pub hint: String,
}

impl ValidationIssue {
    pub fn new(code: IssueCode, message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: hint.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.message, self.hint)
    }
}

// =============================================================================
// Row
// =============================================================================

/// One CSV data line, keyed by header name.
///
/// Missing columns read as the empty string, so a row without a
/// `transaction_date` column flows into the "blank date" path of the checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: HashMap<String, String>,
}

impl Row {
    /// Raw value of `column`, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// Whether the header of this row contains `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 1-based file line of the row at `index`, counting the header line.
pub fn line_number(index: usize) -> usize {
    index + 2
}
