//! Field-level type model.
//!
//! Every field of a target type is described by a [`FieldDescriptor`]: its
//! name and a resolved [`TypeKind`]. Kinds are a closed set; anything the
//! schema source cannot classify becomes [`TypeKind::Unknown`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Package-qualified name of a type.
///
/// `name` may contain dots for nested types (`MyEnclosing.MyEnclosed`);
/// `package` never includes the enclosing type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Package, empty for the default package.
    #[serde(default)]
    pub package: String,

    /// Type name inside the package, dotted when nested.
    pub name: String,
}

impl QualifiedName {
    /// Create a qualified name from its package and (possibly nested) name.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Split a dotted name at its last dot.
    ///
    /// `sample.MyData` becomes package `sample`, name `MyData`. Nested types
    /// cannot be told apart from packages this way; use [`QualifiedName::new`]
    /// when the package is known.
    pub fn parse(qualified: &str) -> Self {
        match qualified.rfind('.') {
            Some(index) => Self::new(&qualified[..index], &qualified[index + 1..]),
            None => Self::new("", qualified),
        }
    }

    /// Innermost type name (`MyEnclosed` for `MyEnclosing.MyEnclosed`).
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Name with nesting dots replaced by underscores.
    pub fn flat_name(&self) -> String {
        self.name.replace('.', "_")
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// Resolved kind of a field's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TypeKind {
    /// Nullable text.
    String,

    /// 32-bit primitive integer, never absent.
    Integer32,

    /// 64-bit primitive integer, never absent.
    Integer64,

    /// Nullable 32-bit integer.
    BoxedInteger32,

    /// Nullable 64-bit integer.
    BoxedInteger64,

    /// Point on the time line with millisecond precision.
    Instant,

    /// Date without time of day.
    CalendarDate,

    /// Time of day without date.
    WallClockTime,

    /// Date and time of day without zone.
    DateTime,

    /// Ordered collection.
    List,

    /// Unordered unique collection.
    Set,

    /// Key/value collection.
    Map,

    /// Another target type.
    Composite(QualifiedName),

    /// Type the catalog has no sample values for.
    Unknown,
}

impl TypeKind {
    /// Create a composite kind referencing another target type.
    pub fn composite(name: QualifiedName) -> Self {
        TypeKind::Composite(name)
    }

    /// Temporal flavour of this kind, if any.
    pub fn temporal(&self) -> Option<TemporalKind> {
        match self {
            TypeKind::Instant => Some(TemporalKind::Instant),
            TypeKind::CalendarDate => Some(TemporalKind::CalendarDate),
            TypeKind::WallClockTime => Some(TemporalKind::WallClockTime),
            TypeKind::DateTime => Some(TemporalKind::DateTime),
            _ => None,
        }
    }

    /// Collection flavour of this kind, if any.
    pub fn collection(&self) -> Option<CollectionKind> {
        match self {
            TypeKind::List => Some(CollectionKind::List),
            TypeKind::Set => Some(CollectionKind::Set),
            TypeKind::Map => Some(CollectionKind::Map),
            _ => None,
        }
    }

    /// Referenced target type for composite kinds.
    pub fn target(&self) -> Option<&QualifiedName> {
        match self {
            TypeKind::Composite(name) => Some(name),
            _ => None,
        }
    }

    /// Whether a field of this kind can hold the absent value.
    pub fn is_nullable(&self) -> bool {
        !matches!(self, TypeKind::Integer32 | TypeKind::Integer64)
    }
}

/// Temporal kinds, each backed by a dedicated helper factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemporalKind {
    Instant,
    CalendarDate,
    WallClockTime,
    DateTime,
}

impl TemporalKind {
    /// Name used when naming helper factories.
    pub fn label(&self) -> &'static str {
        match self {
            TemporalKind::Instant => "Instant",
            TemporalKind::CalendarDate => "CalendarDate",
            TemporalKind::WallClockTime => "WallClockTime",
            TemporalKind::DateTime => "DateTime",
        }
    }
}

/// Collection kinds, each backed by an empty-collection helper factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectionKind {
    List,
    Set,
    Map,
}

impl CollectionKind {
    /// Name used when naming helper factories.
    pub fn label(&self) -> &'static str {
        match self {
            CollectionKind::List => "List",
            CollectionKind::Set => "Set",
            CollectionKind::Map => "Map",
        }
    }
}

/// One declared field of a target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field identifier.
    pub name: String,

    /// Resolved kind of the declared type.
    pub kind: TypeKind,
}

impl FieldDescriptor {
    /// Create a field descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_at_last_dot() {
        let name = QualifiedName::parse("sample.nested.MyData");
        assert_eq!(name.package, "sample.nested");
        assert_eq!(name.name, "MyData");
        assert_eq!(name.to_string(), "sample.nested.MyData");
    }

    #[test]
    fn test_parse_default_package() {
        let name = QualifiedName::parse("MyData");
        assert_eq!(name.package, "");
        assert_eq!(name.to_string(), "MyData");
    }

    #[test]
    fn test_nested_names() {
        let name = QualifiedName::new("sample", "MyEnclosing.MyEnclosed");
        assert_eq!(name.simple_name(), "MyEnclosed");
        assert_eq!(name.flat_name(), "MyEnclosing_MyEnclosed");
        assert_eq!(name.to_string(), "sample.MyEnclosing.MyEnclosed");
    }

    #[test]
    fn test_kind_flavours() {
        assert_eq!(TypeKind::Instant.temporal(), Some(TemporalKind::Instant));
        assert_eq!(TypeKind::Map.collection(), Some(CollectionKind::Map));
        assert_eq!(TypeKind::String.temporal(), None);

        let target = QualifiedName::parse("sample.Other");
        assert_eq!(
            TypeKind::composite(target.clone()).target(),
            Some(&target)
        );
    }

    #[test]
    fn test_primitives_are_not_nullable() {
        assert!(!TypeKind::Integer32.is_nullable());
        assert!(!TypeKind::Integer64.is_nullable());
        assert!(TypeKind::BoxedInteger32.is_nullable());
        assert!(TypeKind::Unknown.is_nullable());
    }
}
