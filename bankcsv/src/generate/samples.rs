//! Standardized CSV samples and edge-case files.
//!
//! Every bank fixture is rendered once per accounting package into
//! `samples/<folder>/<region>/<slug>__<software>__<suffix>.csv` using the
//! fixed [`STANDARD_COLUMNS`] order. Edge-case fixtures
//! (`fixtures/edge/*.yaml`) hold deliberately malformed rows and render to
//! `samples/edge-cases/edge-<scenario>.csv`, keeping any non-standard
//! columns after the standard ones so the validator sees them as written.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::fixtures::{Fixture, FixtureRow};
use super::manifest::{
    build_manifest, previous_generated_at, write_checksums, write_manifest, EdgeCaseRecord, Manifest,
    ManifestRecord,
};
use super::{ensure_parent, layout, sha256_file, GenerateSettings};
use crate::error::{GenerateError, GenerateResult};

/// Column order of every standard sample.
pub const STANDARD_COLUMNS: [&str; 8] = [
    "transaction_date",
    "description",
    "amount",
    "debit_credit",
    "balance",
    "currency",
    "unique_id",
    "memo",
];

/// A deliberately malformed statement.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeFixture {
    pub scenario: String,
    #[serde(default)]
    pub description: String,
    /// Issue code the validator is expected to report.
    #[serde(default)]
    pub expected_error: String,
    /// File currency, used to fill blank currency cells.
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub rows: Vec<Mapping>,
}

impl EdgeFixture {
    pub fn load(path: &Path) -> GenerateResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| GenerateError::yaml(path, e))
    }
}

/// Write a CSV file with a header line.
pub fn write_csv<I>(path: &Path, headers: &[&str], rows: I) -> GenerateResult<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush().map_err(|e| GenerateError::io(path, e))
}

/// A fixture row laid out in [`STANDARD_COLUMNS`] order.
pub fn standard_row(row: &FixtureRow, currency: &str) -> Vec<String> {
    vec![
        row.transaction_date.clone(),
        row.description.clone(),
        format!("{:.2}", row.amount),
        row.debit_credit.clone(),
        format!("{:.2}", row.balance),
        currency.to_string(),
        row.unique_id.clone(),
        row.memo.clone(),
    ]
}

/// Bank fixtures (`fixtures/<region>/*.yaml`, edge cases excluded), sorted
/// by region directory then file name.
pub fn bank_fixture_paths(fixtures_dir: &Path) -> GenerateResult<Vec<PathBuf>> {
    if !fixtures_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(fixtures_dir).min_depth(2).max_depth(2) {
        let entry = entry?;
        let path = entry.path();
        let in_edge_dir = path
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|name| name == layout::EDGE_DIR);

        if entry.file_type().is_file() && has_extension(path, "yaml") && !in_edge_dir {
            paths.push(path.to_path_buf());
        }
    }

    paths.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    Ok(paths)
}

fn sort_key(path: &Path) -> (String, String) {
    let parent = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (parent, name)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

/// Every `*.csv` below `dir`, sorted by path.
pub fn csv_files_under(dir: &Path) -> GenerateResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && has_extension(entry.path(), "csv") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Delete previously generated CSVs so removed fixtures leave no stale samples.
pub fn clean_samples(samples_dir: &Path) -> GenerateResult<usize> {
    let stale = csv_files_under(samples_dir)?;
    for path in &stale {
        std::fs::remove_file(path).map_err(|e| GenerateError::io(path, e))?;
    }
    debug!(removed = stale.len(), "cleaned previous samples");
    Ok(stale.len())
}

/// Render every bank fixture for every accounting package.
pub fn generate_samples(settings: &GenerateSettings) -> GenerateResult<Vec<ManifestRecord>> {
    let mut records = Vec::new();

    for fixture_path in bank_fixture_paths(&settings.fixtures_dir())? {
        let fixture = Fixture::load(&fixture_path)?;
        let region_code = fixture.country.code.to_lowercase();

        // BTreeMap iteration is already sorted by software id.
        for (software_id, assignment) in &fixture.software_profiles {
            let filename = format!(
                "{}__{}__{}.csv",
                fixture.bank.slug, software_id, assignment.filename_suffix
            );
            let output_path = settings
                .samples_dir()
                .join(&assignment.folder)
                .join(&region_code)
                .join(filename);

            let rows = fixture
                .rows
                .iter()
                .map(|row| standard_row(row, &fixture.currency));
            write_csv(&output_path, &STANDARD_COLUMNS, rows)?;

            let checksum = sha256_file(&output_path)?;
            let path = settings.relative(&output_path);
            info!(path = %path, software = %software_id, "generated sample");

            records.push(ManifestRecord {
                bank: fixture.bank.name.clone(),
                bank_slug: fixture.bank.slug.clone(),
                country_code: fixture.country.code.clone(),
                software: software_id.clone(),
                software_profile: assignment.profile.clone(),
                path,
                checksum_sha256: checksum,
                currency: fixture.currency.clone(),
                locale: fixture.locale.clone(),
                account_type: fixture.account_type.clone(),
            });
        }
    }

    records.sort_by(|a, b| {
        (&a.software, &a.country_code, &a.bank_slug, &a.path)
            .cmp(&(&b.software, &b.country_code, &b.bank_slug, &b.path))
    });
    Ok(records)
}

/// Plain string form of a YAML scalar.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Two-decimal rendering for numeric cells; anything unparsable is kept
/// verbatim so malformed amounts survive into the edge-case file.
pub fn format_decimal(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Number(n) => match n.as_f64() {
            Some(f) => format!("{:.2}", f),
            None => n.to_string(),
        },
        Value::String(s) => match Decimal::from_str(s.trim()) {
            Ok(d) => format!("{:.2}", d),
            Err(_) => s.clone(),
        },
        other => scalar_to_string(other),
    }
}

/// Standard columns present in any row (standard order), then the rest in
/// first-seen order.
pub fn edge_headers(rows: &[Mapping]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            let key = scalar_to_string(key);
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
    }

    let mut headers: Vec<String> = STANDARD_COLUMNS
        .iter()
        .filter(|col| seen.iter().any(|k| k == *col))
        .map(|col| col.to_string())
        .collect();
    for key in seen {
        if !headers.contains(&key) {
            headers.push(key);
        }
    }
    headers
}

/// Lay out one edge-case row under `headers`.
pub fn edge_row(row: &Mapping, headers: &[String], currency: &str) -> Vec<String> {
    let mut cells = vec![String::new(); headers.len()];

    for (key, value) in row {
        let key = scalar_to_string(key);
        let Some(idx) = headers.iter().position(|h| *h == key) else {
            continue;
        };
        cells[idx] = match key.as_str() {
            "amount" | "balance" => format_decimal(value),
            "currency" => {
                let cell = scalar_to_string(value);
                if cell.is_empty() {
                    currency.to_string()
                } else {
                    cell
                }
            }
            _ => scalar_to_string(value),
        };
    }

    if !currency.is_empty() {
        if let Some(idx) = headers.iter().position(|h| h == "currency") {
            if cells[idx].is_empty() {
                cells[idx] = currency.to_string();
            }
        }
    }

    cells
}

/// Render every edge-case fixture.
pub fn generate_edge_cases(settings: &GenerateSettings) -> GenerateResult<Vec<EdgeCaseRecord>> {
    let edge_dir = settings.edge_fixtures_dir();
    let mut fixture_paths = Vec::new();
    if edge_dir.is_dir() {
        for entry in WalkDir::new(&edge_dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file() && has_extension(entry.path(), "yaml") {
                fixture_paths.push(entry.into_path());
            }
        }
    }
    fixture_paths.sort();

    let mut records = Vec::new();
    for fixture_path in fixture_paths {
        let edge = EdgeFixture::load(&fixture_path)?;
        let headers = edge_headers(&edge.rows);
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();

        let output_path = settings
            .edge_samples_dir()
            .join(format!("edge-{}.csv", edge.scenario));
        let rows = edge
            .rows
            .iter()
            .map(|row| edge_row(row, &headers, &edge.currency));
        write_csv(&output_path, &header_refs, rows)?;

        let checksum = sha256_file(&output_path)?;
        let path = settings.relative(&output_path);
        info!(path = %path, expected = %edge.expected_error, "generated edge case");

        records.push(EdgeCaseRecord {
            scenario: edge.scenario,
            description: edge.description,
            expected_error: edge.expected_error,
            path,
            checksum_sha256: checksum,
        });
    }

    records.sort_by(|a, b| a.scenario.cmp(&b.scenario));
    Ok(records)
}

/// Regenerate samples, edge cases, manifest and checksum listing.
pub fn generate_all(settings: &GenerateSettings) -> GenerateResult<Manifest> {
    generate_all_at(settings, Utc::now())
}

/// [`generate_all`] with an explicit clock.
pub fn generate_all_at(settings: &GenerateSettings, now: DateTime<Utc>) -> GenerateResult<Manifest> {
    let previous = previous_generated_at(&settings.manifest_path());

    clean_samples(&settings.samples_dir())?;
    let samples = generate_samples(settings)?;
    let edge_cases = generate_edge_cases(settings)?;

    let manifest = build_manifest(samples, edge_cases, previous, settings.preserve_timestamp, now);
    write_manifest(&settings.manifest_path(), &manifest)?;
    write_checksums(&settings.checksums_path(), &manifest)?;

    info!(
        samples = manifest.summary.total_samples,
        edge_cases = manifest.summary.total_edge_cases,
        "manifest and checksums updated"
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::catalog::{Bank, Catalog, DebitCredit, Region, SoftwareProfile, StatementPeriod, StatementTemplate, TemplateTransaction};
    use crate::generate::fixtures::generate_fixtures;
    use crate::generate::write_file;
    use chrono::{NaiveDate, TimeZone};
    use tempfile::tempdir;

    fn catalog() -> Catalog {
        Catalog {
            softwares: vec![
                SoftwareProfile {
                    id: "xero".into(),
                    name: "Xero".into(),
                    profile: "xero-uk".into(),
                    folder: "xero".into(),
                    locale_overrides: Default::default(),
                },
                SoftwareProfile {
                    id: "quickbooks".into(),
                    name: "QuickBooks Online".into(),
                    profile: "quickbooks-us".into(),
                    folder: "quickbooks".into(),
                    locale_overrides: Default::default(),
                },
            ],
            regions: vec![Region {
                code: "UK".into(),
                name: "United Kingdom".into(),
                currency: "GBP".into(),
                locale: "en-GB".into(),
                date_format: "DD/MM/YYYY".into(),
                decimal_separator: ".".into(),
                thousands_separator: ",".into(),
                banks: vec![Bank {
                    name: "Thames Savings".into(),
                    slug: "thames-savings".into(),
                    account_type: "current".into(),
                    opening_balance: Decimal::new(50000, 2),
                    statement_period: StatementPeriod {
                        start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                        end: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                    },
                }],
            }],
            statement_template: StatementTemplate {
                transactions: vec![TemplateTransaction {
                    days_from_start: 4,
                    amount: Decimal::new(1999, 2),
                    debit_credit: DebitCredit::Debit,
                    description: "Lunch, team".into(),
                    memo: String::new(),
                }],
            },
        }
    }

    fn seed(root: &Path) -> GenerateSettings {
        let settings = GenerateSettings::new(root);
        write_file(&settings.catalog_path(), serde_yaml::to_string(&catalog()).unwrap()).unwrap();
        write_file(
            &settings.edge_fixtures_dir().join("bad-amount.yaml"),
            r#"
scenario: bad-amount
description: Amount without decimals
expected_error: CSV006
currency: GBP
rows:
  - transaction_date: 01/02/2024
    amount: "12,3"
    debit_credit: debit
    unique_id: E-1
    bank_reference: REF-9
  - transaction_date: 02/02/2024
    amount: 7
    debit_credit: credit
    unique_id: E-2
    currency: ""
"#,
        )
        .unwrap();
        generate_fixtures(&settings).unwrap();
        settings
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_edge_headers_standard_first() {
        let rows: Vec<Mapping> = serde_yaml::from_str(
            "[{note: x, unique_id: A, amount: 1}, {transaction_date: d, extra: y}]",
        )
        .unwrap();

        assert_eq!(
            edge_headers(&rows),
            vec!["transaction_date", "amount", "unique_id", "note", "extra"]
        );
    }

    #[test]
    fn test_format_decimal_keeps_malformed() {
        assert_eq!(format_decimal(&Value::from(7)), "7.00");
        assert_eq!(format_decimal(&Value::from("10")), "10.00");
        assert_eq!(format_decimal(&Value::from("12,3")), "12,3");
        assert_eq!(format_decimal(&Value::Null), "");
    }

    #[test]
    fn test_samples_per_software_sorted() {
        let dir = tempdir().unwrap();
        let settings = seed(dir.path());

        let manifest = generate_all_at(&settings, now()).unwrap();
        let paths: Vec<&str> = manifest.samples.iter().map(|r| r.path.as_str()).collect();

        assert_eq!(
            paths,
            vec![
                "samples/quickbooks/uk/thames-savings__quickbooks__uk-standard.csv",
                "samples/xero/uk/thames-savings__xero__uk-standard.csv",
            ]
        );

        let content = std::fs::read_to_string(dir.path().join(paths[1])).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("transaction_date,description,amount,debit_credit,balance,currency,unique_id,memo")
        );
        assert_eq!(
            lines.next(),
            Some("01/02/2024,Opening balance,0.00,credit,500.00,GBP,THAMESSAVINGS-20240201-000,Starting balance")
        );
        assert_eq!(
            lines.next(),
            Some("05/02/2024,\"Lunch, team\",19.99,debit,480.01,GBP,THAMESSAVINGS-20240205-001,")
        );
    }

    #[test]
    fn test_edge_case_rendering() {
        let dir = tempdir().unwrap();
        let settings = seed(dir.path());

        let manifest = generate_all_at(&settings, now()).unwrap();
        assert_eq!(manifest.edge_cases.len(), 1);
        assert_eq!(manifest.edge_cases[0].expected_error, "CSV006");

        let content =
            std::fs::read_to_string(dir.path().join("samples/edge-cases/edge-bad-amount.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "transaction_date,amount,debit_credit,currency,unique_id,bank_reference");
        assert_eq!(lines[1], "01/02/2024,\"12,3\",debit,GBP,E-1,REF-9");
        assert_eq!(lines[2], "02/02/2024,7.00,credit,GBP,E-2,");
    }

    #[test]
    fn test_regeneration_is_byte_identical() {
        let dir = tempdir().unwrap();
        let settings = seed(dir.path()).with_preserve_timestamp(true);

        let first = generate_all_at(&settings, now()).unwrap();
        let first_checksums = std::fs::read(settings.checksums_path()).unwrap();
        let first_manifest = std::fs::read(settings.manifest_path()).unwrap();

        let later = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap();
        let second = generate_all_at(&settings, later).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_checksums, std::fs::read(settings.checksums_path()).unwrap());
        assert_eq!(first_manifest, std::fs::read(settings.manifest_path()).unwrap());
    }

    #[test]
    fn test_stale_samples_removed() {
        let dir = tempdir().unwrap();
        let settings = seed(dir.path());
        let stale = settings.samples_dir().join("old").join("gone.csv");
        write_file(&stale, "a\n1\n").unwrap();

        generate_all_at(&settings, now()).unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_checked_in_fixtures_match_their_profiles() {
        use crate::config::ValidatorConfig;
        use crate::validation::validate_file;

        let repo_fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures");
        let dir = tempdir().unwrap();
        let settings = GenerateSettings::new(dir.path());

        std::fs::create_dir_all(settings.edge_fixtures_dir()).unwrap();
        std::fs::copy(repo_fixtures.join("catalog.yaml"), settings.catalog_path()).unwrap();
        for entry in std::fs::read_dir(repo_fixtures.join("edge")).unwrap() {
            let path = entry.unwrap().path();
            std::fs::copy(&path, settings.edge_fixtures_dir().join(path.file_name().unwrap())).unwrap();
        }

        generate_fixtures(&settings).unwrap();
        let manifest = generate_all_at(&settings, now()).unwrap();
        let config = ValidatorConfig::bundled().unwrap();

        assert!(!manifest.samples.is_empty());
        for record in &manifest.samples {
            let profile = config.profile(&record.software_profile).unwrap();
            let issues = validate_file(&dir.path().join(&record.path), &config, profile).unwrap();
            assert!(issues.is_empty(), "{} failed: {:?}", record.path, issues);
        }

        let profile = config.profile("quickbooks-us").unwrap();
        assert!(!manifest.edge_cases.is_empty());
        for record in &manifest.edge_cases {
            let issues = validate_file(&dir.path().join(&record.path), &config, profile).unwrap();
            assert!(
                issues.iter().any(|i| i.code.as_str() == record.expected_error),
                "{} did not raise {}",
                record.path,
                record.expected_error
            );
        }
    }
}
