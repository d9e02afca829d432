//! Test Assembly: one suite per target type.
//!
//! For every target the assembler creates a fresh [`FactoryRegistry`],
//! builds the toString, equals and hashCode tests the target asks for, then
//! flushes the referenced helpers into the same suite. Suites are handed to
//! a [`SuiteSink`] one at a time; the first sink failure ends the pass.

use std::convert::Infallible;
use tracing::{debug, error, info};

use crate::catalog::{field_candidates, restricted_candidates};
use crate::combination::{
    absent_assignment, equality_combinations, threshold_assignment, Assignment,
};
use crate::construction::build_instance;
use crate::error::{GenerateError, GenerateResult};
use crate::ir::{Assertion, Expr, Procedure, Statement, SuiteName, TestSuite, TypeRef};
use crate::model::{TargetCatalog, TargetType};
use crate::registry::{FactoryRegistry, TemporalAnchor};

/// Suffix appended to the target's name to form the suite class name.
pub const DEFAULT_SUITE_SUFFIX: &str = "StructureTest";

/// Name of the toString test.
pub const TO_STRING_TEST: &str = "testToString";

/// Name of the equals test.
pub const EQUALS_TEST: &str = "testEquals";

/// Name of the hashCode test.
pub const HASH_CODE_TEST: &str = "testHashCode";

/// Options for one generation pass.
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Suffix of suite class names.
    pub suite_suffix: String,

    /// Anchor for temporal sample values.
    pub anchor: TemporalAnchor,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            suite_suffix: DEFAULT_SUITE_SUFFIX.to_string(),
            anchor: TemporalAnchor::now(),
        }
    }
}

impl AssemblyOptions {
    /// Set the suite suffix.
    pub fn with_suite_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suite_suffix = suffix.into();
        self
    }

    /// Set the temporal anchor.
    pub fn with_anchor(mut self, anchor: TemporalAnchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// Counts for a completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Suites handed to the sink.
    pub suites: usize,

    /// Test procedures across all suites.
    pub tests: usize,

    /// Helper procedures across all suites.
    pub helpers: usize,
}

/// Consumer of assembled suites, typically a source emitter.
pub trait SuiteSink {
    /// Error raised when a suite cannot be emitted.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Accept one suite.
    fn accept(&mut self, suite: TestSuite) -> Result<(), Self::Error>;
}

impl SuiteSink for Vec<TestSuite> {
    type Error = Infallible;

    fn accept(&mut self, suite: TestSuite) -> Result<(), Self::Error> {
        self.push(suite);
        Ok(())
    }
}

/// Builds test suites for the targets of one catalog.
#[derive(Debug, Clone)]
pub struct SuiteAssembler<'a> {
    targets: &'a TargetCatalog,
    options: AssemblyOptions,
}

impl<'a> SuiteAssembler<'a> {
    /// Create an assembler over `targets`.
    pub fn new(targets: &'a TargetCatalog, options: AssemblyOptions) -> Self {
        Self { targets, options }
    }

    /// Options of this pass.
    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Suite name for `target`: same package, flattened name plus suffix.
    pub fn suite_name(&self, target: &TargetType) -> SuiteName {
        SuiteName {
            package: target.name.package.clone(),
            class: format!("{}{}", target.name.flat_name(), self.options.suite_suffix),
        }
    }

    /// Assemble the suite of one target.
    ///
    /// The suite may hold no tests when the target wants no contract.
    pub fn assemble(&self, target: &TargetType) -> GenerateResult<TestSuite> {
        let mut registry =
            FactoryRegistry::new(self.targets, self.options.anchor, target.name.clone());
        let mut tests = Vec::new();

        if target.wants_to_string {
            tests.push(Procedure::test(
                TO_STRING_TEST,
                to_string_body(target, &mut registry)?,
            ));
        }
        if target.wants_equality {
            let fields = restricted_candidates(target, self.targets);
            let combinations = equality_combinations(&fields);
            let absent = absent_assignment(&fields);

            tests.push(Procedure::test(
                EQUALS_TEST,
                equals_body(target, &combinations, &mut registry)?,
            ));
            tests.push(Procedure::test(
                HASH_CODE_TEST,
                hash_code_body(target, &combinations[0], &absent, &mut registry)?,
            ));
        }

        let helpers = registry.into_helpers();
        debug!(
            target_type = %target.name,
            tests = tests.len(),
            helpers = helpers.len(),
            "assembled suite"
        );

        Ok(TestSuite {
            name: self.suite_name(target),
            target: target.name.clone(),
            tests,
            helpers,
        })
    }

    /// Assemble every suite that holds at least one test, in catalog order.
    pub fn assemble_all(&self) -> GenerateResult<Vec<TestSuite>> {
        let mut suites = Vec::new();
        self.run(&mut suites)?;
        Ok(suites)
    }

    /// Assemble every target and hand each non-empty suite to `sink`.
    ///
    /// Stops at the first sink error; suites accepted before it stay
    /// accepted.
    pub fn run<S: SuiteSink>(&self, sink: &mut S) -> GenerateResult<PassSummary> {
        let mut summary = PassSummary::default();

        for target in self.targets {
            if !target.wants_to_string && !target.wants_equality {
                debug!(target_type = %target.name, "no contract requested, skipping");
                continue;
            }

            let suite = self.assemble(target)?;
            let name = suite.name.to_string();
            let tests = suite.tests.len();
            let helpers = suite.helpers.len();

            if let Err(e) = sink.accept(suite) {
                error!(suite = %name, error = %e, "failed to emit suite, aborting pass");
                return Err(GenerateError::emission(name, e));
            }

            summary.suites += 1;
            summary.tests += tests;
            summary.helpers += helpers;
        }

        info!(
            suites = summary.suites,
            tests = summary.tests,
            helpers = summary.helpers,
            "generation pass complete"
        );
        Ok(summary)
    }
}

const SINGLE: &str = "obj";
const FIRST: &str = "obj1";
const SECOND: &str = "obj2";

fn declare(target: &TargetType, name: &str) -> Statement {
    Statement::Declare {
        ty: TypeRef::Target(target.name.clone()),
        name: name.to_string(),
    }
}

fn to_string_body(
    target: &TargetType,
    registry: &mut FactoryRegistry<'_>,
) -> GenerateResult<Vec<Statement>> {
    let fields = field_candidates(target, registry.targets());
    let populated = threshold_assignment(&fields, usize::MAX);

    let mut body = vec![declare(target, SINGLE)];
    body.extend(build_instance(target, SINGLE, &populated, registry)?);
    body.push(Statement::Assert(Assertion::NotAbsent(Expr::text_of(SINGLE))));
    Ok(body)
}

fn equals_body(
    target: &TargetType,
    combinations: &[Assignment],
    registry: &mut FactoryRegistry<'_>,
) -> GenerateResult<Vec<Statement>> {
    let mut body = vec![declare(target, FIRST), declare(target, SECOND)];

    for (i, left) in combinations.iter().enumerate() {
        for (j, right) in combinations.iter().enumerate() {
            body.extend(build_instance(target, FIRST, left, registry)?);
            body.extend(build_instance(target, SECOND, right, registry)?);
            let (a, b) = (Expr::var(FIRST), Expr::var(SECOND));
            body.push(Statement::Assert(if i == j {
                Assertion::Equal(a, b)
            } else {
                Assertion::NotEqual(a, b)
            }));
        }
    }

    body.push(Statement::Assert(Assertion::Equal(
        Expr::var(FIRST),
        Expr::var(FIRST),
    )));
    body.push(Statement::Assert(Assertion::NotEqual(
        Expr::var(FIRST),
        Expr::Absent,
    )));
    Ok(body)
}

fn hash_code_body(
    target: &TargetType,
    baseline: &Assignment,
    absent: &Assignment,
    registry: &mut FactoryRegistry<'_>,
) -> GenerateResult<Vec<Statement>> {
    let mut body = vec![declare(target, FIRST), declare(target, SECOND)];

    for assignment in [baseline, absent] {
        body.extend(build_instance(target, FIRST, assignment, registry)?);
        body.extend(build_instance(target, SECOND, assignment, registry)?);
        body.push(Statement::Assert(Assertion::Equal(
            Expr::hash_of(FIRST),
            Expr::hash_of(SECOND),
        )));
    }
    Ok(body)
}
