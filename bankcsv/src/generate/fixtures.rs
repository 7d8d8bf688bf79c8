//! Per-bank fixture documents.
//!
//! A fixture is the structured description of one synthetic statement: the
//! bank and region metadata plus every transaction row with its running
//! balance. Fixtures are written as YAML next to the catalog
//! (`fixtures/<region>/<bank slug>.yaml`) and are the only input of the
//! sample generator.
//!
//! Row ids are derived from the bank slug, the row date and the row index,
//! so regenerating from an unchanged catalog yields identical documents.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use super::catalog::{Bank, Catalog, DebitCredit, Region, SoftwareProfile, StatementPeriod, StatementTemplate};
use super::{write_file, GenerateSettings};
use crate::error::{GenerateError, GenerateResult};

/// Fixture document version.
pub const FIXTURE_VERSION: u32 = 1;

/// Bank identity carried into samples and the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankIdentity {
    pub name: String,
    pub slug: String,
}

/// Country identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
}

/// How one accounting package consumes this fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareAssignment {
    /// Validator profile key.
    pub profile: String,
    /// Top-level samples directory.
    pub folder: String,
    /// Trailing part of the sample file name.
    pub filename_suffix: String,
}

/// One statement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureRow {
    pub unique_id: String,
    pub transaction_date: String,
    pub description: String,
    pub debit_credit: String,
    pub amount: Decimal,
    pub balance: Decimal,
    #[serde(default)]
    pub memo: String,
}

/// A generated bank/region statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub version: u32,
    pub bank: BankIdentity,
    pub country: Country,
    pub currency: String,
    pub locale: String,
    pub date_format: String,
    pub decimal_separator: String,
    pub thousands_separator: String,
    pub account_type: String,
    pub statement_period: StatementPeriod,
    pub opening_balance: Decimal,
    pub software_profiles: BTreeMap<String, SoftwareAssignment>,
    pub rows: Vec<FixtureRow>,
}

impl Fixture {
    /// Read a fixture document.
    pub fn load(path: &Path) -> GenerateResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| GenerateError::yaml(path, e))
    }
}

/// Round to cents and pin the scale so amounts always render with two decimals.
pub fn money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp(2);
    rounded.rescale(2);
    rounded
}

/// strftime pattern for a catalog date layout.
pub fn strftime_for(layout: &str) -> GenerateResult<&'static str> {
    match layout {
        "YYYY-MM-DD" => Ok("%Y-%m-%d"),
        "DD/MM/YYYY" => Ok("%d/%m/%Y"),
        "DD.MM.YYYY" => Ok("%d.%m.%Y"),
        other => Err(GenerateError::UnsupportedDateFormat(other.to_string())),
    }
}

/// Render `date` in a catalog date layout.
pub fn format_date(date: NaiveDate, layout: &str) -> GenerateResult<String> {
    Ok(date.format(strftime_for(layout)?).to_string())
}

/// `SLUG-YYYYMMDD-NNN`, with the slug upper-cased and dashes removed.
pub fn row_id(slug: &str, date: NaiveDate, index: usize) -> String {
    format!(
        "{}-{}-{:03}",
        slug.to_uppercase().replace('-', ""),
        date.format("%Y%m%d"),
        index
    )
}

/// Expand the template into rows for one bank, opening balance first.
pub fn generate_rows(
    bank: &Bank,
    region: &Region,
    template: &StatementTemplate,
) -> GenerateResult<Vec<FixtureRow>> {
    let start = bank.statement_period.start;
    let mut balance = money(bank.opening_balance);
    let mut rows = Vec::with_capacity(template.transactions.len() + 1);

    rows.push(FixtureRow {
        unique_id: row_id(&bank.slug, start, 0),
        transaction_date: format_date(start, &region.date_format)?,
        description: "Opening balance".to_string(),
        debit_credit: DebitCredit::Credit.as_str().to_string(),
        amount: money(Decimal::ZERO),
        balance,
        memo: "Starting balance".to_string(),
    });

    for (offset, txn) in template.transactions.iter().enumerate() {
        let index = offset + 1;
        let date = start + Duration::days(txn.days_from_start);
        let amount = money(txn.amount);

        balance = match txn.debit_credit {
            DebitCredit::Credit => money(balance + amount),
            DebitCredit::Debit => money(balance - amount),
        };

        rows.push(FixtureRow {
            unique_id: row_id(&bank.slug, date, index),
            transaction_date: format_date(date, &region.date_format)?,
            description: txn.description.clone(),
            debit_credit: txn.debit_credit.as_str().to_string(),
            amount,
            balance,
            memo: txn.memo.clone(),
        });
    }

    Ok(rows)
}

/// Build the fixture document for one bank in one region.
pub fn build_fixture(
    bank: &Bank,
    region: &Region,
    softwares: &[SoftwareProfile],
    template: &StatementTemplate,
) -> GenerateResult<Fixture> {
    let software_profiles = softwares
        .iter()
        .map(|software| {
            (
                software.id.clone(),
                SoftwareAssignment {
                    profile: software.profile_for_region(&region.code).to_string(),
                    folder: software.folder.clone(),
                    filename_suffix: format!("{}-standard", region.code.to_lowercase()),
                },
            )
        })
        .collect();

    Ok(Fixture {
        version: FIXTURE_VERSION,
        bank: BankIdentity {
            name: bank.name.clone(),
            slug: bank.slug.clone(),
        },
        country: Country {
            code: region.code.clone(),
            name: region.name.clone(),
        },
        currency: region.currency.clone(),
        locale: region.locale.clone(),
        date_format: region.date_format.clone(),
        decimal_separator: region.decimal_separator.clone(),
        thousands_separator: region.thousands_separator.clone(),
        account_type: bank.account_type.clone(),
        statement_period: bank.statement_period,
        opening_balance: money(bank.opening_balance),
        software_profiles,
        rows: generate_rows(bank, region, template)?,
    })
}

/// Write one fixture per bank under `fixtures/<region>/`.
///
/// Returns the written paths in catalog order.
pub fn generate_fixtures(settings: &GenerateSettings) -> GenerateResult<Vec<PathBuf>> {
    let catalog = Catalog::load(&settings.catalog_path())?;
    let mut written = Vec::new();

    for region in &catalog.regions {
        let output_dir = settings.fixtures_dir().join(region.code.to_lowercase());

        for bank in &region.banks {
            let fixture = build_fixture(bank, region, &catalog.softwares, &catalog.statement_template)?;
            let target = output_dir.join(format!("{}.yaml", bank.slug));
            let yaml = serde_yaml::to_string(&fixture).map_err(|e| GenerateError::yaml(&target, e))?;

            write_file(&target, yaml)?;
            info!(path = %settings.relative(&target), rows = fixture.rows.len(), "generated fixture");
            written.push(target);
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::catalog::TemplateTransaction;
    use std::str::FromStr;
    use tempfile::tempdir;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn bank() -> Bank {
        Bank {
            name: "Maple Trust".into(),
            slug: "maple-trust".into(),
            account_type: "chequing".into(),
            opening_balance: dec("1000"),
            statement_period: StatementPeriod {
                start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            },
        }
    }

    fn region(date_format: &str) -> Region {
        Region {
            code: "CA".into(),
            name: "Canada".into(),
            currency: "CAD".into(),
            locale: "en-CA".into(),
            date_format: date_format.into(),
            decimal_separator: ".".into(),
            thousands_separator: ",".into(),
            banks: Vec::new(),
        }
    }

    fn template() -> StatementTemplate {
        StatementTemplate {
            transactions: vec![
                TemplateTransaction {
                    days_from_start: 1,
                    amount: dec("250.5"),
                    debit_credit: DebitCredit::Credit,
                    description: "Client payment".into(),
                    memo: "INV-1".into(),
                },
                TemplateTransaction {
                    days_from_start: 3,
                    amount: dec("99.99"),
                    debit_credit: DebitCredit::Debit,
                    description: "Software subscription".into(),
                    memo: String::new(),
                },
            ],
        }
    }

    #[test]
    fn test_opening_row_then_running_balance() {
        let rows = generate_rows(&bank(), &region("YYYY-MM-DD"), &template()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].description, "Opening balance");
        assert_eq!(rows[0].amount.to_string(), "0.00");
        assert_eq!(rows[0].balance.to_string(), "1000.00");
        assert_eq!(rows[0].unique_id, "MAPLETRUST-20240301-000");

        assert_eq!(rows[1].transaction_date, "2024-03-02");
        assert_eq!(rows[1].amount.to_string(), "250.50");
        assert_eq!(rows[1].balance.to_string(), "1250.50");
        assert_eq!(rows[1].unique_id, "MAPLETRUST-20240302-001");

        assert_eq!(rows[2].debit_credit, "debit");
        assert_eq!(rows[2].balance.to_string(), "1150.51");
        assert_eq!(rows[2].unique_id, "MAPLETRUST-20240304-002");
    }

    #[test]
    fn test_region_date_layouts() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(date, "DD/MM/YYYY").unwrap(), "05/01/2024");
        assert_eq!(format_date(date, "DD.MM.YYYY").unwrap(), "05.01.2024");
        assert!(matches!(
            format_date(date, "MM-DD-YY"),
            Err(GenerateError::UnsupportedDateFormat(p)) if p == "MM-DD-YY"
        ));
    }

    #[test]
    fn test_fixture_software_profiles() {
        let softwares = vec![SoftwareProfile {
            id: "quickbooks".into(),
            name: "QuickBooks Online".into(),
            profile: "quickbooks-us".into(),
            folder: "quickbooks".into(),
            locale_overrides: [("CA".to_string(), "quickbooks-ca".to_string())].into(),
        }];

        let fixture = build_fixture(&bank(), &region("YYYY-MM-DD"), &softwares, &template()).unwrap();
        let assignment = &fixture.software_profiles["quickbooks"];

        assert_eq!(assignment.profile, "quickbooks-ca");
        assert_eq!(assignment.filename_suffix, "ca-standard");
        assert_eq!(fixture.opening_balance.to_string(), "1000.00");
    }

    #[test]
    fn test_yaml_roundtrip_keeps_money_scale() {
        let fixture = build_fixture(&bank(), &region("DD/MM/YYYY"), &[], &template()).unwrap();
        let yaml = serde_yaml::to_string(&fixture).unwrap();
        let back: Fixture = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(back, fixture);
        assert_eq!(format!("{:.2}", back.rows[1].amount), "250.50");
    }

    #[test]
    fn test_generate_fixtures_is_deterministic() {
        let dir = tempdir().unwrap();
        let settings = GenerateSettings::new(dir.path());
        let catalog = Catalog {
            softwares: Vec::new(),
            regions: vec![Region {
                banks: vec![bank()],
                ..region("YYYY-MM-DD")
            }],
            statement_template: template(),
        };
        write_file(&settings.catalog_path(), serde_yaml::to_string(&catalog).unwrap()).unwrap();

        let first = generate_fixtures(&settings).unwrap();
        let first_content = std::fs::read(&first[0]).unwrap();
        let second = generate_fixtures(&settings).unwrap();
        let second_content = std::fs::read(&second[0]).unwrap();

        assert_eq!(first, vec![dir.path().join("fixtures").join("ca").join("maple-trust.yaml")]);
        assert_eq!(first_content, second_content);
    }
}
