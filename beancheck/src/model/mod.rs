//! Target type model.
//!
//! This module defines the read-only description of the types a generation
//! pass covers. It is populated once per pass by a schema source adapter and
//! never mutated afterwards.

mod graph;
pub mod target;
pub mod types;

pub use target::{ConstructionStrategy, EqualityFilter, TargetCatalog, TargetType};
pub use types::{CollectionKind, FieldDescriptor, QualifiedName, TemporalKind, TypeKind};
