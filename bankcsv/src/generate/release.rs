//! Release bundles.
//!
//! Packs the generated samples into zip archives under `releases/`: one per
//! accounting package, one per region and one for the edge cases, next to
//! copies of `checksums.txt` and `MANIFEST.json`. Entries are stored under
//! their repository-relative path with a fixed timestamp and mode, so
//! packaging unchanged samples reproduces the same archive bytes.

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::samples::csv_files_under;
use super::{ensure_parent, layout, GenerateSettings};
use crate::error::{GenerateError, GenerateResult};

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644)
}

/// Write `files` into a new archive at `target`, ordered by relative path.
pub fn zip_files(settings: &GenerateSettings, target: &Path, files: &[PathBuf]) -> GenerateResult<()> {
    ensure_parent(target)?;

    let mut entries: Vec<(String, &PathBuf)> = files
        .iter()
        .map(|path| (settings.relative(path), path))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let archive = File::create(target).map_err(|e| GenerateError::io(target, e))?;
    let mut writer = ZipWriter::new(archive);

    for (name, path) in entries {
        writer.start_file(name, entry_options())?;
        let mut source = File::open(path).map_err(|e| GenerateError::io(path, e))?;
        io::copy(&mut source, &mut writer).map_err(|e| GenerateError::io(path, e))?;
    }

    writer.finish()?;
    debug!(path = %settings.relative(target), entries = files.len(), "archive written");
    Ok(())
}

/// Remove files left in `releases/` by a previous run.
fn clean_releases(releases_dir: &Path) -> GenerateResult<()> {
    if !releases_dir.is_dir() {
        return Ok(());
    }
    let entries = std::fs::read_dir(releases_dir).map_err(|e| GenerateError::io(releases_dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| GenerateError::io(releases_dir, e))?.path();
        if path.is_file() {
            std::fs::remove_file(&path).map_err(|e| GenerateError::io(&path, e))?;
        }
    }
    Ok(())
}

/// `<software>-all-locales.zip` for every non-empty package folder.
fn package_per_software(settings: &GenerateSettings) -> GenerateResult<Vec<PathBuf>> {
    let samples_dir = settings.samples_dir();
    if !samples_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut folders = Vec::new();
    let entries = std::fs::read_dir(&samples_dir).map_err(|e| GenerateError::io(&samples_dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| GenerateError::io(&samples_dir, e))?.path();
        let is_edge = path.file_name().is_some_and(|n| n == layout::EDGE_SAMPLES_DIR);
        if path.is_dir() && !is_edge {
            folders.push(path);
        }
    }
    folders.sort();

    let mut bundles = Vec::new();
    for folder in folders {
        let files = csv_files_under(&folder)?;
        if files.is_empty() {
            continue;
        }
        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = settings.releases_dir().join(format!("{}-all-locales.zip", name));
        zip_files(settings, &target, &files)?;
        bundles.push(target);
    }
    Ok(bundles)
}

/// `locale-<region>.zip` grouping every package's samples for one region.
fn package_per_locale(settings: &GenerateSettings) -> GenerateResult<Vec<PathBuf>> {
    let samples_dir = settings.samples_dir();
    let mut by_region: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for path in csv_files_under(&samples_dir)? {
        let rel = path.strip_prefix(&samples_dir).unwrap_or(&path);
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        // <software>/<region>/<file>
        if parts.len() < 3 || parts[0] == layout::EDGE_SAMPLES_DIR {
            continue;
        }
        by_region.entry(parts[1].clone()).or_default().push(path);
    }

    let mut bundles = Vec::new();
    for (region, files) in by_region {
        let target = settings.releases_dir().join(format!("locale-{}.zip", region));
        zip_files(settings, &target, &files)?;
        bundles.push(target);
    }
    Ok(bundles)
}

/// `*.csv` directly inside `dir`, sorted.
fn top_level_csv_files(dir: &Path) -> GenerateResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|e| e == "csv") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// `edge-cases.zip` with the top-level edge-case samples, if any exist.
fn package_edge_cases(settings: &GenerateSettings) -> GenerateResult<Option<PathBuf>> {
    let files = top_level_csv_files(&settings.edge_samples_dir())?;
    if files.is_empty() {
        return Ok(None);
    }
    let target = settings.releases_dir().join("edge-cases.zip");
    zip_files(settings, &target, &files)?;
    Ok(Some(target))
}

/// Copy `checksums.txt` and `MANIFEST.json` when present.
fn copy_reference_files(settings: &GenerateSettings) -> GenerateResult<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for (source, name) in [
        (settings.checksums_path(), layout::CHECKSUMS_FILE),
        (settings.manifest_path(), layout::MANIFEST_FILE),
    ] {
        if !source.is_file() {
            continue;
        }
        let target = settings.releases_dir().join(name);
        ensure_parent(&target)?;
        std::fs::copy(&source, &target).map_err(|e| GenerateError::io(&source, e))?;
        copied.push(target);
    }
    Ok(copied)
}

/// Rebuild every release artifact. Returns the produced files in creation order.
pub fn package_release(settings: &GenerateSettings) -> GenerateResult<Vec<PathBuf>> {
    clean_releases(&settings.releases_dir())?;

    let mut produced = package_per_software(settings)?;
    produced.extend(package_per_locale(settings)?);
    produced.extend(package_edge_cases(settings)?);
    produced.extend(copy_reference_files(settings)?);

    for path in &produced {
        info!(path = %settings.relative(path), "release artifact ready");
    }
    Ok(produced)
}
