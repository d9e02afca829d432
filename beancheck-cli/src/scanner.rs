//! Manifest scanner for discovering type manifests.
//!
//! This module recursively scans directories for `*.beancheck.toml` and
//! `*.beancheck.json` files, respecting `.gitignore` patterns and custom
//! filters.

use crate::error::{CliResult, ScanError, SchemaError};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File name suffix of TOML manifests.
pub const TOML_SUFFIX: &str = ".beancheck.toml";

/// File name suffix of JSON manifests.
pub const JSON_SUFFIX: &str = ".beancheck.json";

/// Serialization format of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
}

impl ManifestFormat {
    /// Detect the format from a file name.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(TOML_SUFFIX) {
            Some(ManifestFormat::Toml)
        } else if name.ends_with(JSON_SUFFIX) {
            Some(ManifestFormat::Json)
        } else {
            None
        }
    }
}

/// A discovered manifest with its content.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    /// Absolute path to the file.
    pub path: PathBuf,

    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    /// Serialization format.
    pub format: ManifestFormat,

    /// File content.
    pub content: String,
}

/// Scanner for discovering manifest files.
#[derive(Debug)]
pub struct ManifestScanner {
    /// Root directory to scan.
    root: PathBuf,

    /// Whether to respect .gitignore files.
    respect_gitignore: bool,

    /// Optional glob filter pattern.
    filter: Option<glob::Pattern>,
}

impl ManifestScanner {
    /// Create a new scanner for the given root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_gitignore: true,
            filter: None,
        }
    }

    /// Set whether to respect .gitignore files.
    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Set a glob filter pattern for files.
    ///
    /// Only manifests whose relative path matches the pattern are included.
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, ScanError> {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
        self.filter = Some(glob_pattern);
        Ok(self)
    }

    /// Scan the directory and return all discovered manifests, sorted by
    /// relative path.
    ///
    /// Fails on the first manifest that cannot be read.
    pub fn scan(&self) -> CliResult<Vec<ManifestFile>> {
        let (files, unreadable) = self.walk()?;

        if let Some((path, source)) = unreadable.into_iter().next() {
            return Err(ScanError::Io { path, source }.into());
        }
        if files.is_empty() {
            return Err(ScanError::no_manifests(self.root.clone()).into());
        }
        Ok(files)
    }

    /// Scan without failing on empty results or unreadable manifests.
    ///
    /// Manifests that cannot be read (missing permissions, invalid UTF-8)
    /// are returned as errors next to the readable ones.
    pub fn scan_allow_unreadable(&self) -> CliResult<(Vec<ManifestFile>, Vec<SchemaError>)> {
        let (files, unreadable) = self.walk()?;

        let errors = unreadable
            .into_iter()
            .map(|(path, source)| {
                warn!(path = %path.display(), error = %source, "cannot read manifest");
                SchemaError::unreadable(path, source)
            })
            .collect();
        Ok((files, errors))
    }

    fn walk(&self) -> CliResult<(Vec<ManifestFile>, Vec<(PathBuf, std::io::Error)>)> {
        if !self.root.exists() {
            return Err(ScanError::not_found(self.root.clone()).into());
        }

        let mut files = Vec::new();
        let mut unreadable = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .hidden(false)
            .build();

        for entry in walker {
            let entry = entry.map_err(ScanError::Walk)?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let Some(format) = ManifestFormat::detect(path) else {
                continue;
            };

            let relative = self.relative_path(path);
            if let Some(ref pattern) = self.filter {
                if !pattern.matches_path(&relative) {
                    continue;
                }
            }

            match std::fs::read_to_string(path) {
                Ok(content) => files.push(ManifestFile {
                    path: path.to_path_buf(),
                    relative_path: relative,
                    format,
                    content,
                }),
                Err(e) => unreadable.push((path.to_path_buf(), e)),
            }
        }

        // Catalog order, and so output order, follows the manifest order.
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        unreadable.sort_by(|a, b| a.0.cmp(&b.0));
        Ok((files, unreadable))
    }

    /// Get the relative path from root.
    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
