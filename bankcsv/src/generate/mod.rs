//! Sample generation path: catalog → fixtures → samples → release bundles.
//!
//! ```text
//! fixtures/catalog.yaml ──▶ fixtures/<region>/<bank>.yaml ──▶ samples/<software>/<region>/*.csv
//!                                                              samples/edge-cases/*.csv
//!                                                              MANIFEST.json, checksums.txt
//!                                                          ──▶ releases/*.zip
//! ```
//!
//! Every step is deterministic: running it twice on unchanged input writes
//! byte-identical files, so checksums only move when content does.
//!
//! - [`catalog`] - bank/region/software catalog
//! - [`fixtures`] - per-bank fixture documents
//! - [`samples`] - standardized CSV samples and edge cases
//! - [`manifest`] - manifest and checksum listing
//! - [`release`] - zip bundles

pub mod catalog;
pub mod fixtures;
pub mod manifest;
pub mod release;
pub mod samples;

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{GenerateError, GenerateResult};

/// Environment variable that switches on CI mode.
pub const CI_ENV: &str = "CI";

/// Directory and file names relative to the repository root.
pub mod layout {
    pub const FIXTURES_DIR: &str = "fixtures";
    pub const CATALOG_FILE: &str = "catalog.yaml";
    pub const EDGE_DIR: &str = "edge";
    pub const SAMPLES_DIR: &str = "samples";
    pub const EDGE_SAMPLES_DIR: &str = "edge-cases";
    pub const RELEASES_DIR: &str = "releases";
    pub const MANIFEST_FILE: &str = "MANIFEST.json";
    pub const CHECKSUMS_FILE: &str = "checksums.txt";
}

/// Where generators read and write, and how they treat metadata.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    /// Repository root every artifact path is relative to.
    pub root: PathBuf,
    /// Reuse the previous manifest's `generated_at`.
    pub preserve_timestamp: bool,
}

impl GenerateSettings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            preserve_timestamp: false,
        }
    }

    /// Settings for `root`, in CI mode when `ci` is set or `CI=true`.
    pub fn from_env(root: impl Into<PathBuf>, ci: bool) -> Self {
        Self {
            root: root.into(),
            preserve_timestamp: ci || ci_env_enabled(),
        }
    }

    pub fn with_preserve_timestamp(mut self, preserve: bool) -> Self {
        self.preserve_timestamp = preserve;
        self
    }

    pub fn fixtures_dir(&self) -> PathBuf {
        self.root.join(layout::FIXTURES_DIR)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.fixtures_dir().join(layout::CATALOG_FILE)
    }

    pub fn edge_fixtures_dir(&self) -> PathBuf {
        self.fixtures_dir().join(layout::EDGE_DIR)
    }

    pub fn samples_dir(&self) -> PathBuf {
        self.root.join(layout::SAMPLES_DIR)
    }

    pub fn edge_samples_dir(&self) -> PathBuf {
        self.samples_dir().join(layout::EDGE_SAMPLES_DIR)
    }

    pub fn releases_dir(&self) -> PathBuf {
        self.root.join(layout::RELEASES_DIR)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(layout::MANIFEST_FILE)
    }

    pub fn checksums_path(&self) -> PathBuf {
        self.root.join(layout::CHECKSUMS_FILE)
    }

    /// `path` relative to the root, with `/` separators.
    pub fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Whether the `CI` environment variable is `true` (any case).
pub fn ci_env_enabled() -> bool {
    std::env::var(CI_ENV)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Lowercase hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> GenerateResult<String> {
    let mut file = File::open(path).map_err(|e| GenerateError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| GenerateError::io(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Create `path`'s parent directories.
pub(crate) fn ensure_parent(path: &Path) -> GenerateResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
    }
    Ok(())
}

/// Write `content` to `path`, creating parent directories.
pub(crate) fn write_file(path: &Path, content: impl AsRef<[u8]>) -> GenerateResult<()> {
    ensure_parent(path)?;
    std::fs::write(path, content).map_err(|e| GenerateError::io(path, e))
}
