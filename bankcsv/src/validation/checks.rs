//! Row-level rule checks.
//!
//! Every check is a pure function over the parsed rows and the slice of
//! configuration it needs. Checks never fail: a missing column reads as an
//! empty value and lands on the matching "blank" issue.

use chrono::NaiveDate;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::models::{line_number, IssueCode, Row, ValidationIssue};

pub const DATE_COLUMN: &str = "transaction_date";
pub const AMOUNT_COLUMN: &str = "amount";
pub const DEBIT_CREDIT_COLUMN: &str = "debit_credit";
pub const CURRENCY_COLUMN: &str = "currency";
pub const UNIQUE_ID_COLUMN: &str = "unique_id";

/// Duplicate ids shown in the CSV010 message before eliding the rest.
const MAX_DUPLICATES_SHOWN: usize = 3;

/// Report every required column absent from the header, as one issue.
pub fn check_columns(rows: &[Row], required: &[String]) -> Vec<ValidationIssue> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let missing: Vec<&str> = required
        .iter()
        .filter(|col| !first.has_column(col))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        return Vec::new();
    }

    vec![ValidationIssue::new(
        IssueCode::MissingColumns,
        format!("Missing column(s): {}", missing.join(", ")),
        "Match the headers from the sample files exactly.",
    )]
}

/// Render strftime patterns the way statement exports spell them.
pub fn display_date_formats(formats: &[String]) -> String {
    formats
        .iter()
        .map(|fmt| {
            fmt.replace("%Y", "YYYY")
                .replace("%m", "MM")
                .replace("%d", "DD")
        })
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Anchored regex for the digit layout a strftime pattern requires.
///
/// `%Y` takes exactly four digits, `%m` and `%d` one or two. Other
/// directives are left to chrono.
pub fn date_shape(format: &str) -> Option<Regex> {
    let mut shape = String::from("^");
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            shape.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
            continue;
        }
        match chars.next() {
            Some('Y') => shape.push_str(r"\d{4}"),
            Some('m') | Some('d') => shape.push_str(r"\d{1,2}"),
            Some('%') => shape.push('%'),
            _ => shape.push_str(".+?"),
        }
    }
    shape.push('$');

    Regex::new(&shape).ok()
}

/// A profile date pattern with its compiled shape.
struct DatePattern<'a> {
    format: &'a str,
    shape: Option<Regex>,
}

impl<'a> DatePattern<'a> {
    fn new(format: &'a str) -> Self {
        Self {
            format,
            shape: date_shape(format),
        }
    }

    fn matches(&self, value: &str) -> bool {
        let shaped = self.shape.as_ref().map_or(true, |re| re.is_match(value));
        shaped && NaiveDate::parse_from_str(value, self.format).is_ok()
    }
}

/// Every row needs a `transaction_date` in one of the profile's formats.
pub fn check_dates(rows: &[Row], formats: &[String]) -> Vec<ValidationIssue> {
    let patterns: Vec<DatePattern<'_>> = formats.iter().map(|f| DatePattern::new(f)).collect();
    let mut issues = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let line = line_number(idx);
        let raw_date = row.get(DATE_COLUMN).trim();

        if raw_date.is_empty() {
            issues.push(ValidationIssue::new(
                IssueCode::BlankDate,
                format!("Row {}: transaction_date is blank", line),
                "Fill every date. Use the bank statement's original date format.",
            ));
            continue;
        }

        if !patterns.iter().any(|p| p.matches(raw_date)) {
            issues.push(ValidationIssue::new(
                IssueCode::InvalidDate,
                format!(
                    "Row {}: transaction_date '{}' doesn't match {}",
                    line,
                    raw_date,
                    display_date_formats(formats)
                ),
                "Align the date format with the sample for your software.",
            ));
        }
    }

    issues
}

/// Rewrite a comma-decimal amount into dot-decimal form.
///
/// Every `.` is treated as a thousands separator and dropped, so
/// `1.234,56` becomes `1234.56`. A dot used as the decimal mark in a
/// comma-decimal profile is therefore lost.
pub fn normalize_amount<'a>(amount: &'a str, decimal_separator: &str) -> std::borrow::Cow<'a, str> {
    if decimal_separator == "," {
        std::borrow::Cow::Owned(amount.replace('.', "").replace(',', "."))
    } else {
        std::borrow::Cow::Borrowed(amount)
    }
}

/// The pattern must match at the start of the candidate.
fn matches_at_start(pattern: &Regex, candidate: &str) -> bool {
    pattern.find(candidate).is_some_and(|m| m.start() == 0)
}

/// Every row needs an `amount` matching the configured pattern.
pub fn check_amounts(rows: &[Row], pattern: &Regex, decimal_separator: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let line = line_number(idx);
        let amount = row.get(AMOUNT_COLUMN).trim();

        if amount.is_empty() {
            issues.push(ValidationIssue::new(
                IssueCode::BlankAmount,
                format!("Row {}: amount is blank", line),
                "Populate every amount. Use positive numbers only; debit/credit decides the direction.",
            ));
            continue;
        }

        let candidate = normalize_amount(amount, decimal_separator);
        if !matches_at_start(pattern, &candidate) {
            issues.push(ValidationIssue::new(
                IssueCode::InvalidAmount,
                format!("Row {}: amount '{}' is not formatted correctly", line, amount),
                format!(
                    "Use two decimal places (e.g., 1234{}56) and remove currency symbols.",
                    decimal_separator
                ),
            ));
        }
    }

    issues
}

/// `debit_credit` must be one of the allowed tokens, ignoring case.
pub fn check_debit_credit(rows: &[Row], allowed: &[String]) -> Vec<ValidationIssue> {
    let allowed_set: HashSet<String> = allowed.iter().map(|v| v.to_lowercase()).collect();
    let mut issues = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let raw = row.get(DEBIT_CREDIT_COLUMN);
        let value = raw.trim().to_lowercase();

        if !allowed_set.contains(&value) {
            issues.push(ValidationIssue::new(
                IssueCode::InvalidDebitCredit,
                format!(
                    "Row {}: debit_credit '{}' is not one of {}",
                    line_number(idx),
                    raw,
                    allowed.join(", ")
                ),
                "Set to 'debit' for money out and 'credit' for money in.",
            ));
        }
    }

    issues
}

/// A non-blank `currency` must be in the profile's list.
///
/// Blank cells mean "file default" and are not checked.
pub fn check_currency(rows: &[Row], allowed: &[String]) -> Vec<ValidationIssue> {
    let allowed_set: HashSet<&str> = allowed.iter().map(String::as_str).collect();
    let mut sorted: Vec<&str> = allowed_set.iter().copied().collect();
    sorted.sort_unstable();
    let allowed_display = sorted.join(", ");

    let mut issues = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let value = row.get(CURRENCY_COLUMN).trim().to_uppercase();

        if !value.is_empty() && !allowed_set.contains(value.as_str()) {
            issues.push(ValidationIssue::new(
                IssueCode::UnsupportedCurrency,
                format!(
                    "Row {}: currency '{}' is outside the allowed list",
                    line_number(idx),
                    value
                ),
                format!("Stick to {}. Separate files per currency.", allowed_display),
            ));
        }
    }

    issues
}

/// Non-blank `unique_id` values must not repeat.
pub fn check_unique_ids(rows: &[Row]) -> Vec<ValidationIssue> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for row in rows {
        let id = row.get(UNIQUE_ID_COLUMN).trim();
        if id.is_empty() {
            continue;
        }
        let count = counts.entry(id).or_insert(0);
        if *count == 0 {
            first_seen.push(id);
        }
        *count += 1;
    }

    let duplicates: Vec<&str> = first_seen
        .into_iter()
        .filter(|id| counts.get(id).copied().unwrap_or(0) > 1)
        .collect();

    if duplicates.is_empty() {
        return Vec::new();
    }

    let mut display = duplicates
        .iter()
        .take(MAX_DUPLICATES_SHOWN)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if duplicates.len() > MAX_DUPLICATES_SHOWN {
        display.push('…');
    }

    vec![ValidationIssue::new(
        IssueCode::DuplicateIds,
        format!("Found duplicate unique_id values: {}", display),
        "Ensure each transaction ID is unique; copy the structure from our samples if needed.",
    )]
}
