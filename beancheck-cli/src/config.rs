//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `beancheck.toml` files
//! and merging with command-line arguments.

use crate::error::{CliResult, ConfigError};
use beancheck::{AssemblyOptions, TemporalAnchor, DEFAULT_SUITE_SUFFIX};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "beancheck.toml";

/// Anchor value meaning "the time of the run".
pub const ANCHOR_NOW: &str = "now";

/// Main configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration.
    pub output: OutputConfig,

    /// Naming conventions.
    pub naming: NamingConfig,

    /// Generation settings.
    pub generation: GenerationConfig,

    /// Manifest discovery settings.
    pub scan: ScanConfig,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory of generated test sources.
    pub dir: PathBuf,
}

/// Naming convention configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Suffix appended to a target's name to form its suite class.
    pub suite_suffix: String,
}

/// Generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// `now`, or an RFC 3339 instant that temporal sample values are
    /// offset from.
    pub anchor: String,
}

/// Manifest discovery settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Whether to respect .gitignore files.
    pub respect_gitignore: bool,

    /// Glob that manifest paths (relative to the input root) must match.
    pub filter: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./src/test/java"),
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            suite_suffix: DEFAULT_SUITE_SUFFIX.to_string(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            anchor: ANCHOR_NOW.to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            filter: None,
        }
    }
}

impl Config {
    /// Whether the anchor follows the wall clock, in any letter case.
    pub fn anchor_is_now(&self) -> bool {
        self.generation.anchor.trim().eq_ignore_ascii_case(ANCHOR_NOW)
    }

    /// Core options for one generation pass.
    pub fn assembly_options(&self) -> CliResult<AssemblyOptions> {
        let suffix = self.naming.suite_suffix.trim();
        if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::invalid_value(
                "naming.suite_suffix",
                format!("'{}' is not a valid identifier suffix", self.naming.suite_suffix),
            )
            .into());
        }

        let anchor = TemporalAnchor::parse(&self.generation.anchor).map_err(|e| {
            ConfigError::invalid_value(
                "generation.anchor",
                format!("expected \"{}\" or an RFC 3339 timestamp: {}", ANCHOR_NOW, e),
            )
        })?;

        Ok(AssemblyOptions::default()
            .with_suite_suffix(suffix)
            .with_anchor(anchor))
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location and
    /// falls back to the default configuration when that file is missing.
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::not_found(path.to_path_buf()).into());
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))?;

        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref output) = args.output {
            config.output.dir = output.clone();
        }

        if let Some(ref suffix) = args.suite_suffix {
            config.naming.suite_suffix = suffix.clone();
        }

        if let Some(ref anchor) = args.anchor {
            config.generation.anchor = anchor.clone();
        }

        if let Some(ref filter) = args.filter {
            config.scan.filter = Some(filter.clone());
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# beancheck configuration file

[output]
# Root directory of generated test sources
dir = "./src/test/java"

[naming]
# Suite class name = target name (nesting dots become '_') + suffix
suite_suffix = "StructureTest"

[generation]
# Instant that date/time sample values are offset from:
# "now", or a fixed RFC 3339 timestamp for reproducible output
anchor = "now"

[scan]
# Skip manifests ignored by .gitignore
respect_gitignore = true

# Only read manifests whose path matches this glob (relative to the input directory)
# filter = "**/model/*.beancheck.toml"
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Output directory override.
    pub output: Option<PathBuf>,

    /// Suite suffix override.
    pub suite_suffix: Option<String>,

    /// Temporal anchor override.
    pub anchor: Option<String>,

    /// Manifest filter override.
    pub filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.dir, PathBuf::from("./src/test/java"));
        assert_eq!(config.naming.suite_suffix, "StructureTest");
        assert_eq!(config.generation.anchor, "now");
        assert!(config.scan.respect_gitignore);
        assert!(config.scan.filter.is_none());
    }

    #[test]
    fn test_default_content_parses_to_default() {
        let config: Config = toml::from_str(ConfigManager::default_config_content()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_merge_cli_args_output() {
        let config = Config::default();
        let args = CliArgs {
            output: Some(PathBuf::from("./custom")),
            anchor: Some("2020-01-01T00:00:00Z".into()),
            ..Default::default()
        };

        let merged = ConfigManager::merge_cli_args(config, &args);
        assert_eq!(merged.output.dir, PathBuf::from("./custom"));
        assert_eq!(merged.generation.anchor, "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_merge_cli_args_preserves_unset() {
        let config = Config::default();
        let args = CliArgs::default();

        let merged = ConfigManager::merge_cli_args(config.clone(), &args);
        assert_eq!(merged, config);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[output]
dir = "./generated"

[naming]
suite_suffix = "ContractTest"

[generation]
anchor = "2016-11-14T00:00:00Z"

[scan]
respect_gitignore = false
filter = "model/**"
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("./generated"));
        assert_eq!(config.naming.suite_suffix, "ContractTest");
        assert!(!config.scan.respect_gitignore);
        assert_eq!(config.scan.filter.as_deref(), Some("model/**"));

        let options = config.assembly_options().unwrap();
        assert_eq!(options.suite_suffix, "ContractTest");
        assert_eq!(
            options.anchor.instant().to_rfc3339(),
            "2016-11-14T00:00:00+00:00"
        );
    }

    #[test]
    fn test_invalid_anchor_is_rejected() {
        let mut config = Config::default();
        config.generation.anchor = "tomorrow".into();
        let err = config.assembly_options().unwrap_err();
        assert!(err.to_string().contains("generation.anchor"));
    }

    #[test]
    fn test_anchor_is_now_ignores_case() {
        let mut config = Config::default();
        assert!(config.anchor_is_now());

        for anchor in ["NOW", " Now ", "nOw"] {
            config.generation.anchor = anchor.into();
            assert!(config.anchor_is_now(), "{anchor}");
            assert!(config.assembly_options().is_ok());
        }

        config.generation.anchor = "2016-11-14T00:00:00Z".into();
        assert!(!config.anchor_is_now());
    }

    #[test]
    fn test_invalid_suffix_is_rejected() {
        let mut config = Config::default();
        config.naming.suite_suffix = "Structure Test".into();
        assert!(config.assembly_options().is_err());
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = TempDir::new().unwrap();
        let err = ConfigManager::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CliError::Config(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[naming]\nsuite_suffix = \"Check\"\n").unwrap();

        let config = ConfigManager::load(Some(&path)).unwrap();
        assert_eq!(config.naming.suite_suffix, "Check");
        assert_eq!(config.output.dir, OutputConfig::default().dir);
    }
}
