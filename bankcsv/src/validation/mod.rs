//! Validation of bank statement rows against a profile.
//!
//! Six independent checks run in a fixed order and their issues are
//! concatenated. One failing check never suppresses another, so a user sees
//! every problem in a single pass:
//!
//! 1. column presence (`CSV001`)
//! 2. date validity (`CSV002`, `CSV004`)
//! 3. amount validity (`CSV005`, `CSV006`)
//! 4. debit/credit vocabulary (`CSV008`)
//! 5. currency whitelist (`CSV022`)
//! 6. unique-ID uniqueness (`CSV010`)
//!
//! # Example
//!
//! ```rust,ignore
//! use bankcsv::{read_csv_file, validate_rows, ValidatorConfig};
//!
//! let config = ValidatorConfig::bundled()?;
//! let profile = config.profile("xero-uk")?;
//! let parsed = read_csv_file(Path::new("statement.csv"))?;
//! let issues = validate_rows(&parsed.rows, &config, profile);
//! ```

pub mod checks;

use std::path::Path;
use tracing::{debug, info};

use crate::config::{Profile, ValidatorConfig};
use crate::error::CsvResult;
use crate::models::{Row, ValidationIssue};
use crate::parser::read_csv_file;

pub use checks::{
    check_amounts, check_columns, check_currency, check_dates, check_debit_credit,
    check_unique_ids, display_date_formats, normalize_amount,
};

/// Run every check and collect the issues in check order.
pub fn validate_rows(rows: &[Row], config: &ValidatorConfig, profile: &Profile) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    issues.extend(check_columns(rows, &config.required_columns));
    issues.extend(check_dates(rows, &profile.date_format));
    issues.extend(check_amounts(
        rows,
        &config.amount_pattern,
        &profile.decimal_separator,
    ));
    issues.extend(check_debit_credit(rows, &config.allowed_debit_credit));
    issues.extend(check_currency(rows, &profile.currency));
    issues.extend(check_unique_ids(rows));

    debug!(
        rows = rows.len(),
        issues = issues.len(),
        profile = %profile.name,
        "validation finished"
    );

    issues
}

/// Read `path` and validate its rows.
///
/// Unreadable or empty files are fatal and surface as [`crate::error::CsvError`].
pub fn validate_file(path: &Path, config: &ValidatorConfig, profile: &Profile) -> CsvResult<Vec<ValidationIssue>> {
    let parsed = read_csv_file(path)?;
    info!(
        path = %path.display(),
        rows = parsed.rows.len(),
        columns = parsed.headers.len(),
        bom = parsed.had_bom,
        "csv loaded"
    );
    Ok(validate_rows(&parsed.rows, config, profile))
}
