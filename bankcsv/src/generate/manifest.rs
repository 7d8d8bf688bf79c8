//! Sample manifest and checksum listing.
//!
//! `MANIFEST.json` indexes every generated sample and edge case with its
//! checksum and descriptive metadata. In CI mode the previous
//! `generated_at` is carried over so a content-only regeneration leaves the
//! manifest untouched when the samples did not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

use super::write_file;
use crate::error::GenerateResult;

/// Manifest format version.
pub const MANIFEST_VERSION: &str = "1.0.0-draft";

/// One generated sample file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub bank: String,
    pub bank_slug: String,
    pub country_code: String,
    pub software: String,
    pub software_profile: String,
    pub path: String,
    pub checksum_sha256: String,
    pub currency: String,
    pub locale: String,
    pub account_type: String,
}

/// One generated edge-case file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeCaseRecord {
    pub scenario: String,
    pub description: String,
    pub expected_error: String,
    pub path: String,
    pub checksum_sha256: String,
}

/// Counts shown at the top of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSummary {
    pub total_samples: usize,
    pub total_edge_cases: usize,
    pub softwares: Vec<String>,
    pub countries: Vec<String>,
}

/// The manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub generated_at: String,
    pub summary: ManifestSummary,
    pub samples: Vec<ManifestRecord>,
    pub edge_cases: Vec<EdgeCaseRecord>,
}

/// `generated_at` of a previous manifest, if one exists and parses.
///
/// A corrupt manifest is treated as absent.
pub fn previous_generated_at(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str::<Value>(&content) {
        Ok(doc) => doc
            .get("generated_at")
            .and_then(Value::as_str)
            .map(str::to_string),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable manifest");
            None
        }
    }
}

/// Second-precision UTC timestamp, e.g. `2024-05-01T09:30:00Z`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Assemble the manifest.
///
/// `previous` is only honored when `preserve_timestamp` is set.
pub fn build_manifest(
    samples: Vec<ManifestRecord>,
    edge_cases: Vec<EdgeCaseRecord>,
    previous: Option<String>,
    preserve_timestamp: bool,
    now: DateTime<Utc>,
) -> Manifest {
    let generated_at = previous
        .filter(|_| preserve_timestamp)
        .unwrap_or_else(|| format_timestamp(now));

    let softwares: BTreeSet<&str> = samples.iter().map(|s| s.software.as_str()).collect();
    let countries: BTreeSet<&str> = samples.iter().map(|s| s.country_code.as_str()).collect();

    let summary = ManifestSummary {
        total_samples: samples.len(),
        total_edge_cases: edge_cases.len(),
        softwares: softwares.into_iter().map(str::to_string).collect(),
        countries: countries.into_iter().map(str::to_string).collect(),
    };

    Manifest {
        version: MANIFEST_VERSION.to_string(),
        generated_at,
        summary,
        samples,
        edge_cases,
    }
}

/// Write the manifest as pretty-printed JSON.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> GenerateResult<()> {
    let json = serde_json::to_string_pretty(manifest)?;
    write_file(path, json)?;
    debug!(path = %path.display(), generated_at = %manifest.generated_at, "manifest written");
    Ok(())
}

/// `<sha>  <path>` lines, sorted, newline-terminated.
pub fn render_checksums(manifest: &Manifest) -> String {
    let mut lines: Vec<String> = manifest
        .samples
        .iter()
        .map(|r| format!("{}  {}", r.checksum_sha256, r.path))
        .chain(
            manifest
                .edge_cases
                .iter()
                .map(|r| format!("{}  {}", r.checksum_sha256, r.path)),
        )
        .collect();
    lines.sort();

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Write `checksums.txt`.
pub fn write_checksums(path: &Path, manifest: &Manifest) -> GenerateResult<()> {
    write_file(path, render_checksums(manifest))
}
