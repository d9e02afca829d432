//! # beancheck
//!
//! Synthesis engine for structural contract tests of data-holder types.
//!
//! Given a [`TargetCatalog`] describing data classes (ordered fields, a
//! construction discipline, an equality filter and the contracts wanted),
//! beancheck produces one [`TestSuite`] per type: a toString test, an equals
//! test, a hashCode test and the helper factories those tests reference.
//! Suites are abstract statement lists; a source emitter turns them into
//! concrete test code.
//!
//! ## Quick Start
//!
//! ```rust
//! use beancheck::{
//!     AssemblyOptions, QualifiedName, SuiteAssembler, TargetCatalog, TargetType, TypeKind,
//! };
//!
//! let catalog = TargetCatalog::new(vec![TargetType::new(QualifiedName::parse("sample.MyData"))
//!     .with_field("name", TypeKind::String)
//!     .with_field("value", TypeKind::String)])
//! .unwrap();
//!
//! let suites = SuiteAssembler::new(&catalog, AssemblyOptions::default())
//!     .assemble_all()
//!     .unwrap();
//!
//! assert_eq!(suites[0].name.class, "MyDataStructureTest");
//! assert_eq!(suites[0].tests.len(), 3);
//! ```
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | sample values per field kind |
//! | [`registry`] | memoized helper factories, one registry per suite |
//! | [`combination`] | covering set of assignments for the equals test |
//! | [`construction`] | assignment to constructor or setter statements |
//! | [`assembly`] | per-target orchestration and the suite sink |
//!
//! ## Equality coverage
//!
//! The equals test does not enumerate the cross product of field values.
//! Starting from a baseline assignment, each field varies alone; only the
//! path where every earlier field holds its baseline branches further. Any
//! two generated assignments differ in at least one equality field, so every
//! off-diagonal pair must compare unequal.

pub mod assembly;
pub mod catalog;
pub mod combination;
pub mod construction;
pub mod error;
pub mod ir;
pub mod model;
pub mod registry;

pub use assembly::{
    AssemblyOptions, PassSummary, SuiteAssembler, SuiteSink, DEFAULT_SUITE_SUFFIX, EQUALS_TEST,
    HASH_CODE_TEST, TO_STRING_TEST,
};
pub use catalog::{FactoryKey, FactorySubject, FieldCandidates, Placeholder, SampleValue};
pub use combination::Assignment;
pub use error::{CatalogError, GenerateError, GenerateResult};
pub use ir::{
    Assertion, Expr, Literal, Procedure, ProcedureRole, Statement, SuiteName, TemporalValue,
    TestSuite, TypeRef,
};
pub use model::{
    CollectionKind, ConstructionStrategy, EqualityFilter, FieldDescriptor, QualifiedName,
    TargetCatalog, TargetType, TemporalKind, TypeKind,
};
pub use registry::{FactoryRegistry, HelperFactory, TemporalAnchor};
