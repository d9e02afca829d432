//! Generation pipeline for the CLI.
//!
//! Manifests are discovered and resolved into a [`TargetCatalog`], the
//! core [`SuiteAssembler`] assembles one suite per target, and a
//! [`SuiteSink`] renders each suite with a [`SourceEmitter`] and either
//! writes it or keeps it in memory for validation.

use beancheck::{PassSummary, SuiteAssembler, SuiteName, SuiteSink, TargetCatalog, TestSuite};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{Config, ANCHOR_NOW};
use crate::emitter::{JunitEmitter, SourceEmitter};
use crate::error::{CliResult, SchemaError, WriteError};
use crate::scanner::ManifestScanner;
use crate::schema::SchemaReader;
use crate::writer::{FileWriter, WriteResult};

/// Catalog resolved from the manifests of one input directory.
#[derive(Debug)]
pub struct LoadedCatalog {
    /// Resolved targets.
    pub catalog: TargetCatalog,

    /// Number of manifests read.
    pub manifests: usize,

    /// Manifests that could not be read; their types are missing from the
    /// catalog.
    pub errors: Vec<SchemaError>,
}

/// A rendered suite kept in memory.
#[derive(Debug, Clone)]
pub struct GeneratedSuite {
    /// Suite name.
    pub name: SuiteName,

    /// Path relative to the output directory.
    pub relative_path: PathBuf,

    /// Rendered source.
    pub content: String,
}

/// Outcome of a generate run.
#[derive(Debug)]
pub struct GenerationReport {
    /// Counts reported by the assembler.
    pub summary: PassSummary,

    /// One result per suite, in catalog order.
    pub results: Vec<WriteResult>,
}

/// Outcome of comparing generated suites with the output directory.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Suites whose file matches.
    pub current: Vec<PathBuf>,

    /// Suites without a file.
    pub missing: Vec<PathBuf>,

    /// Suites whose file differs.
    pub stale: Vec<PathBuf>,
}

impl ValidationReport {
    /// Whether every suite file exists and matches.
    pub fn is_up_to_date(&self) -> bool {
        self.missing.is_empty() && self.stale.is_empty()
    }
}

/// Sink keeping rendered suites in memory.
pub struct RenderSink<'e> {
    emitter: &'e dyn SourceEmitter,
    suites: Vec<GeneratedSuite>,
}

impl<'e> RenderSink<'e> {
    /// Create a sink rendering with `emitter`.
    pub fn new(emitter: &'e dyn SourceEmitter) -> Self {
        Self {
            emitter,
            suites: Vec::new(),
        }
    }

    /// Rendered suites in acceptance order.
    pub fn into_suites(self) -> Vec<GeneratedSuite> {
        self.suites
    }
}

impl SuiteSink for RenderSink<'_> {
    type Error = Infallible;

    fn accept(&mut self, suite: TestSuite) -> Result<(), Self::Error> {
        self.suites.push(GeneratedSuite {
            relative_path: self.emitter.relative_path(&suite),
            content: self.emitter.render(&suite),
            name: suite.name,
        });
        Ok(())
    }
}

/// Sink rendering each suite and writing it below an output directory.
pub struct WriteSink<'e> {
    emitter: &'e dyn SourceEmitter,
    writer: &'e FileWriter,
    output_dir: &'e Path,
    results: Vec<WriteResult>,
}

impl<'e> WriteSink<'e> {
    /// Create a sink writing below `output_dir`.
    pub fn new(emitter: &'e dyn SourceEmitter, writer: &'e FileWriter, output_dir: &'e Path) -> Self {
        Self {
            emitter,
            writer,
            output_dir,
            results: Vec::new(),
        }
    }

    /// Write results in acceptance order.
    pub fn into_results(self) -> Vec<WriteResult> {
        self.results
    }
}

impl SuiteSink for WriteSink<'_> {
    type Error = WriteError;

    fn accept(&mut self, suite: TestSuite) -> Result<(), Self::Error> {
        let path = self.output_dir.join(self.emitter.relative_path(&suite));
        let content = self.emitter.render(&suite);
        let result = self.writer.write(&path, &content)?;
        debug!(suite = %suite.name, path = %path.display(), written = result.was_written(), "emitted suite");
        self.results.push(result);
        Ok(())
    }
}

/// Test suite generator driven by a [`Config`].
pub struct TestGenerator {
    config: Config,
    emitter: Box<dyn SourceEmitter>,
}

impl TestGenerator {
    /// Create a generator emitting JUnit 4 sources.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            emitter: Box::new(JunitEmitter::new()),
        }
    }

    /// Replace the source emitter.
    pub fn with_emitter(mut self, emitter: Box<dyn SourceEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Configuration in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover manifests below `input` and resolve them.
    ///
    /// Unreadable manifests are reported in [`LoadedCatalog::errors`];
    /// duplicate targets across the remaining manifests are an error.
    pub fn load(&self, input: &Path) -> CliResult<LoadedCatalog> {
        let mut scanner =
            ManifestScanner::new(input).with_gitignore(self.config.scan.respect_gitignore);
        if let Some(ref pattern) = self.config.scan.filter {
            scanner = scanner.with_filter(pattern)?;
        }

        let (files, mut errors) = scanner.scan_allow_unreadable()?;
        let unreadable = errors.len();
        let reader = SchemaReader::new();
        let (types, parse_errors) = reader.parse_files(&files);
        for error in &parse_errors {
            warn!(error = %error, "skipping manifest");
        }
        errors.extend(parse_errors);

        let catalog = reader.resolve(&types)?;
        info!(
            manifests = files.len() + unreadable,
            declared = types.len(),
            targets = catalog.len(),
            "resolved manifests"
        );

        Ok(LoadedCatalog {
            catalog,
            manifests: files.len() + unreadable,
            errors,
        })
    }

    /// Run one generation pass and write every suite.
    pub fn generate(&self, catalog: &TargetCatalog, dry_run: bool) -> CliResult<GenerationReport> {
        let options = self.config.assembly_options()?;
        let writer = FileWriter::new(dry_run);
        let mut sink = WriteSink::new(self.emitter.as_ref(), &writer, &self.config.output.dir);

        let summary = SuiteAssembler::new(catalog, options).run(&mut sink)?;
        info!(
            emitter = self.emitter.id(),
            output = %self.config.output.dir.display(),
            dry_run,
            "wrote suites"
        );

        Ok(GenerationReport {
            summary,
            results: sink.into_results(),
        })
    }

    /// Run one generation pass in memory.
    pub fn render(&self, catalog: &TargetCatalog) -> CliResult<Vec<GeneratedSuite>> {
        let options = self.config.assembly_options()?;
        let mut sink = RenderSink::new(self.emitter.as_ref());
        SuiteAssembler::new(catalog, options).run(&mut sink)?;
        Ok(sink.into_suites())
    }

    /// Compare freshly rendered suites with the files in the output
    /// directory.
    pub fn validate(&self, catalog: &TargetCatalog) -> CliResult<ValidationReport> {
        if self.config.anchor_is_now() {
            warn!(
                "generation.anchor is \"{}\"; suites with date or time values will always look stale",
                ANCHOR_NOW
            );
        }

        let mut report = ValidationReport::default();
        for suite in self.render(catalog)? {
            let path = self.config.output.dir.join(&suite.relative_path);
            match std::fs::read_to_string(&path) {
                Ok(existing) if existing == suite.content => report.current.push(path),
                Ok(_) => report.stale.push(path),
                Err(_) => report.missing.push(path),
            }
        }

        debug!(
            current = report.current.len(),
            missing = report.missing.len(),
            stale = report.stale.len(),
            "validated output"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beancheck::{QualifiedName, TargetType, TypeKind};
    use tempfile::TempDir;

    fn catalog() -> TargetCatalog {
        TargetCatalog::new(vec![
            TargetType::new(QualifiedName::parse("p.Thing")).with_field("name", TypeKind::String),
            TargetType::new(QualifiedName::parse("p.Silent")).with_contracts(false, false),
        ])
        .unwrap()
    }

    fn config(output: &Path) -> Config {
        let mut config = Config::default();
        config.output.dir = output.to_path_buf();
        config.generation.anchor = "2016-11-14T00:00:00Z".to_string();
        config
    }

    #[test]
    fn test_render_skips_targets_without_contracts() {
        let dir = TempDir::new().unwrap();
        let suites = TestGenerator::new(config(dir.path())).render(&catalog()).unwrap();

        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].relative_path, PathBuf::from("p/ThingStructureTest.java"));
        assert!(suites[0].content.contains("public class ThingStructureTest {"));
    }

    #[test]
    fn test_generate_then_validate() {
        let dir = TempDir::new().unwrap();
        let generator = TestGenerator::new(config(dir.path()));

        let before = generator.validate(&catalog()).unwrap();
        assert_eq!(before.missing.len(), 1);
        assert!(!before.is_up_to_date());

        let report = generator.generate(&catalog(), false).unwrap();
        assert_eq!(report.summary.suites, 1);
        assert!(report.results[0].was_written());

        let after = generator.validate(&catalog()).unwrap();
        assert!(after.is_up_to_date());
        assert_eq!(after.current.len(), 1);

        std::fs::write(&after.current[0], "// edited").unwrap();
        let edited = generator.validate(&catalog()).unwrap();
        assert_eq!(edited.stale, after.current);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out");
        let report = TestGenerator::new(config(&output))
            .generate(&catalog(), true)
            .unwrap();

        assert!(matches!(report.results[0], WriteResult::DryRun { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_write_failure_aborts_pass() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let err = TestGenerator::new(config(&blocker))
            .generate(&catalog(), false)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::CliError::Generate(beancheck::GenerateError::Emission { .. })
        ));
    }

    /// Lists procedure names, one per line.
    struct OutlineEmitter;

    impl SourceEmitter for OutlineEmitter {
        fn id(&self) -> &'static str {
            "outline"
        }

        fn file_extension(&self) -> &'static str {
            "txt"
        }

        fn render(&self, suite: &TestSuite) -> String {
            suite
                .procedures()
                .map(|p| format!("{}\n", p.name))
                .collect()
        }
    }

    #[test]
    fn test_custom_emitter() {
        let dir = TempDir::new().unwrap();
        let generator =
            TestGenerator::new(config(dir.path())).with_emitter(Box::new(OutlineEmitter));
        let suites = generator.render(&catalog()).unwrap();

        assert_eq!(suites[0].relative_path, PathBuf::from("p/ThingStructureTest.txt"));
        assert_eq!(suites[0].content, "testToString\ntestEquals\ntestHashCode\n");
    }

    #[test]
    fn test_load_empty_directory() {
        let dir = TempDir::new().unwrap();
        let loaded = TestGenerator::new(config(dir.path())).load(dir.path()).unwrap();
        assert!(loaded.catalog.is_empty());
        assert_eq!(loaded.manifests, 0);
        assert!(loaded.errors.is_empty());
    }
}
