//! # beancheck-cli
//!
//! CLI library for generating structural contract tests of Lombok-style
//! data classes.
//!
//! This crate provides the adapters around the `beancheck` engine: manifest
//! discovery, manifest parsing into a target catalog, the JUnit source
//! emitter, and file output.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`scanner`] - Manifest discovery and filtering
//! - [`schema`] - Manifest parsing and Lombok annotation rules
//! - [`emitter`] - Test source emitters (JUnit 4)
//! - [`generator`] - Generation pipeline and validation
//! - [`writer`] - File output and dry-run support
//! - [`watcher`] - File system watching for watch mode
//! - [`error`] - Error types and handling

pub mod config;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod scanner;
pub mod schema;
pub mod watcher;
pub mod writer;

pub use config::{Config, ConfigManager};
pub use emitter::{JunitEmitter, SourceEmitter};
pub use error::{CliError, CliResult};
pub use generator::TestGenerator;
pub use scanner::{ManifestFile, ManifestScanner};
pub use schema::SchemaReader;
pub use watcher::FileWatcher;
pub use writer::FileWriter;
