//! Error types for the CLI.
//!
//! This module defines all error types used throughout the CLI,
//! providing detailed error messages with context for debugging.

use beancheck::{CatalogError, GenerateError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error during manifest discovery.
    #[error("Failed to scan directory: {0}")]
    Scan(#[from] ScanError),

    /// Error reading or resolving manifests.
    #[error("Failed to read manifests: {0}")]
    Schema(#[from] SchemaError),

    /// Error during the generation pass.
    #[error("Failed to generate test suites: {0}")]
    Generate(#[from] GenerateError),

    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error writing output files.
    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),

    /// Error during file watching.
    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    /// Validation failed (suites out of date).
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Error during manifest discovery.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Directory does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// No manifest files found in directory.
    #[error("No manifest files found in: {path}")]
    NoManifests { path: PathBuf },

    /// Invalid filter pattern.
    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// IO error during scanning.
    #[error("IO error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from ignore crate walker.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Error reading or resolving manifests.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Manifest cannot be read, or is not UTF-8.
    #[error("Cannot read manifest {file}: {source}")]
    Unreadable {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid TOML or JSON, or does not match the format.
    #[error("Invalid manifest {file}: {message}")]
    Syntax { file: PathBuf, message: String },

    /// A declaration is malformed.
    #[error("Invalid declaration in {file}: {message}")]
    Declaration { file: PathBuf, message: String },

    /// The resolved targets do not form a valid catalog.
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    /// Multiple schema errors collected.
    #[error("Multiple manifest errors:\n{}", format_errors(.0))]
    Multiple(Vec<SchemaError>),
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error writing output files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error during file watching.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Failed to initialize watcher.
    #[error("Failed to initialize file watcher: {0}")]
    Init(String),

    /// Error from notify crate.
    #[error("Watch notification error: {0}")]
    Notify(String),
}

/// Format multiple errors for display.
fn format_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {}. {}", i + 1, e))
        .collect::<Vec<_>>()
        .join("\n")
}

impl SchemaError {
    /// Create an error for a manifest that could not be read.
    pub fn unreadable(file: PathBuf, source: std::io::Error) -> Self {
        Self::Unreadable { file, source }
    }

    /// Create a syntax error for a manifest file.
    pub fn syntax(file: PathBuf, message: impl Into<String>) -> Self {
        Self::Syntax {
            file,
            message: message.into(),
        }
    }

    /// Create a declaration error.
    pub fn declaration(file: PathBuf, message: impl Into<String>) -> Self {
        Self::Declaration {
            file,
            message: message.into(),
        }
    }

    /// Collapse a list of errors; a single error is returned as is.
    pub fn collect(mut errors: Vec<SchemaError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }
}

impl ScanError {
    /// Create a directory not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::DirectoryNotFound { path }
    }

    /// Create a no manifests error.
    pub fn no_manifests(path: PathBuf) -> Self {
        Self::NoManifests { path }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl CliError {
    /// Process exit code for this error: 2 for stale output, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Validation(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_schema_errors() {
        assert!(SchemaError::collect(Vec::new()).is_none());

        let single = SchemaError::collect(vec![SchemaError::syntax("a.toml".into(), "bad")]);
        assert!(matches!(single, Some(SchemaError::Syntax { .. })));

        let multiple = SchemaError::collect(vec![
            SchemaError::syntax("a.toml".into(), "bad"),
            SchemaError::declaration("b.toml".into(), "worse"),
        ])
        .unwrap();
        let message = multiple.to_string();
        assert!(message.contains("1. Invalid manifest a.toml: bad"));
        assert!(message.contains("2. Invalid declaration in b.toml: worse"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Validation("stale".into()).exit_code(), 2);
        let write = WriteError::WriteFile {
            path: "beancheck.toml".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert_eq!(CliError::from(write).exit_code(), 1);
    }
}
