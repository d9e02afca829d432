//! Error types for the synthesis engine.

use thiserror::Error;

use crate::model::QualifiedName;

/// Result type alias for generation operations.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Error building a [`TargetCatalog`](crate::model::TargetCatalog).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The same qualified name was declared twice.
    #[error("Target type '{name}' is declared more than once")]
    DuplicateTarget { name: QualifiedName },

    /// A target declares two fields with the same name.
    #[error("Target type '{target}' declares field '{field}' more than once")]
    DuplicateField { target: QualifiedName, field: String },
}

/// Error during a generation pass.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The catalog itself is invalid.
    #[error("Invalid target catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// A factory was requested for a type the catalog does not contain.
    #[error("Unknown target type '{name}'")]
    UnknownTarget { name: QualifiedName },

    /// An assignment does not match the target's field list.
    #[error("Assignment for '{target}' has {actual} value(s) but the type declares {expected} field(s)")]
    AssignmentArity {
        target: QualifiedName,
        expected: usize,
        actual: usize,
    },

    /// The suite sink rejected a suite; the pass stops here.
    #[error("Failed to emit suite '{suite}': {source}")]
    Emission {
        suite: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CatalogError {
    /// Create a duplicate target error.
    pub fn duplicate_target(name: QualifiedName) -> Self {
        Self::DuplicateTarget { name }
    }

    /// Create a duplicate field error.
    pub fn duplicate_field(target: QualifiedName, field: impl Into<String>) -> Self {
        Self::DuplicateField {
            target,
            field: field.into(),
        }
    }
}

impl GenerateError {
    /// Create an unknown target error.
    pub fn unknown_target(name: QualifiedName) -> Self {
        Self::UnknownTarget { name }
    }

    /// Create an emission error for the named suite.
    pub fn emission(
        suite: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Emission {
            suite: suite.into(),
            source: Box::new(source),
        }
    }
}
