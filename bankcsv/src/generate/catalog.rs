//! Bank/region catalog consumed by the fixture generator.
//!
//! The catalog is a versioned YAML document (`fixtures/catalog.yaml`)
//! listing the accounting packages samples are produced for, the regions
//! with their banks and formatting conventions, and one transaction template
//! shared by every bank.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{GenerateError, GenerateResult};

/// Complete catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub softwares: Vec<SoftwareProfile>,
    pub regions: Vec<Region>,
    pub statement_template: StatementTemplate,
}

impl Catalog {
    /// Read and parse a catalog file.
    pub fn load(path: &Path) -> GenerateResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| GenerateError::yaml(path, e))
    }
}

/// An accounting package samples are produced for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwareProfile {
    /// Stable id used in file names (`quickbooks`, `xero`, ...).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Default validator profile key.
    pub profile: String,
    /// Top-level directory under `samples/`.
    pub folder: String,
    /// Region code → validator profile key.
    #[serde(default)]
    pub locale_overrides: BTreeMap<String, String>,
}

impl SoftwareProfile {
    /// Validator profile to use for samples in `region_code`.
    pub fn profile_for_region(&self, region_code: &str) -> &str {
        self.locale_overrides
            .get(region_code)
            .map(String::as_str)
            .unwrap_or(&self.profile)
    }
}

/// A country and its statement formatting conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Upper-case country code (`US`, `UK`, ...).
    pub code: String,
    pub name: String,
    pub currency: String,
    pub locale: String,
    /// One of `YYYY-MM-DD`, `DD/MM/YYYY`, `DD.MM.YYYY`.
    pub date_format: String,
    pub decimal_separator: String,
    pub thousands_separator: String,
    pub banks: Vec<Bank>,
}

/// A bank whose statements are synthesized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    pub name: String,
    pub slug: String,
    pub account_type: String,
    pub opening_balance: Decimal,
    pub statement_period: StatementPeriod,
}

/// First and last day covered by a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebitCredit {
    Debit,
    Credit,
}

impl DebitCredit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

/// Transactions replayed for every bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementTemplate {
    pub transactions: Vec<TemplateTransaction>,
}

/// One template transaction, dated relative to the statement start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateTransaction {
    pub days_from_start: i64,
    pub amount: Decimal,
    pub debit_credit: DebitCredit,
    pub description: String,
    #[serde(default)]
    pub memo: String,
}
