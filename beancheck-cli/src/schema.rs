//! Manifest reader for Lombok-style data classes.
//!
//! A manifest lists Java types with their annotations and fields:
//!
//! ```toml
//! [[types]]
//! name = "sample.MyHashEq"
//! annotations = ["Data"]
//! equals_and_hash_code = { of = ["name", "value"] }
//!
//! [[types.fields]]
//! name = "name"
//! type = "String"
//! ```
//!
//! Declarations are resolved into a [`TargetCatalog`]: annotations decide
//! which types are targets and which contracts they want, field type names
//! map to [`TypeKind`]s, and names of other targets become composite kinds.

use beancheck::{
    ConstructionStrategy, EqualityFilter, FieldDescriptor, QualifiedName, TargetCatalog,
    TargetType, TypeKind,
};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::SchemaError;
use crate::scanner::{ManifestFile, ManifestFormat};

/// Top-level manifest document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Declared types.
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

/// One declared type.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
    /// Type name; split at the last dot into package and name unless
    /// `package` is given.
    pub name: String,

    /// Package, for nested types whose name contains dots.
    #[serde(default)]
    pub package: Option<String>,

    /// Declared visibility.
    #[serde(default)]
    pub visibility: Visibility,

    /// Annotation names (`Data`, `@Value`, `lombok.ToString`, ...).
    #[serde(default)]
    pub annotations: Vec<String>,

    /// Arguments of an `EqualsAndHashCode` annotation.
    #[serde(default)]
    pub equals_and_hash_code: Option<EqualityDecl>,

    /// Explicit construction discipline.
    #[serde(default)]
    pub construction: Option<ConstructionStrategy>,

    /// Fields in declared order.
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

/// Arguments of an equality annotation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EqualityDecl {
    /// Fields that take part in equality.
    #[serde(default)]
    pub of: Vec<String>,

    /// Fields left out of equality.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// One declared field.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    /// Field name.
    pub name: String,

    /// Declared Java type, generic arguments allowed.
    #[serde(rename = "type")]
    pub ty: String,

    /// Static fields are not part of an instance.
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

/// Declared visibility of a type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

/// Annotations that affect generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Annotation {
    Data,
    Value,
    ToString,
    EqualsAndHashCode,
    NoArgsConstructor,
    AllArgsConstructor,
}

impl Annotation {
    /// Parse an annotation name, ignoring a leading `@` and `lombok.` prefix.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().trim_start_matches('@');
        let name = name.strip_prefix("lombok.").unwrap_or(name);
        match name {
            "Data" => Some(Annotation::Data),
            "Value" => Some(Annotation::Value),
            "ToString" => Some(Annotation::ToString),
            "EqualsAndHashCode" => Some(Annotation::EqualsAndHashCode),
            "NoArgsConstructor" => Some(Annotation::NoArgsConstructor),
            "AllArgsConstructor" => Some(Annotation::AllArgsConstructor),
            _ => None,
        }
    }
}

/// A type declaration with its resolved name and origin.
#[derive(Debug, Clone)]
pub struct DeclaredType {
    /// Qualified name.
    pub name: QualifiedName,

    /// The declaration.
    pub decl: TypeDecl,

    /// Manifest the declaration came from.
    pub source: PathBuf,
}

impl DeclaredType {
    fn annotations(&self) -> BTreeSet<Annotation> {
        let mut found = BTreeSet::new();
        for raw in &self.decl.annotations {
            match Annotation::parse(raw) {
                Some(annotation) => {
                    found.insert(annotation);
                }
                None => debug!(
                    target_type = %self.name,
                    annotation = %raw,
                    "ignoring annotation"
                ),
            }
        }
        if self.decl.equals_and_hash_code.is_some() {
            found.insert(Annotation::EqualsAndHashCode);
        }
        found
    }
}

/// Reader turning manifest files into a target catalog.
#[derive(Debug, Default)]
pub struct SchemaReader;

impl SchemaReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Parse one manifest.
    pub fn parse_manifest(&self, file: &ManifestFile) -> Result<Vec<DeclaredType>, SchemaError> {
        let manifest: Manifest = match file.format {
            ManifestFormat::Toml => toml::from_str(&file.content)
                .map_err(|e| SchemaError::syntax(file.path.clone(), e.to_string()))?,
            ManifestFormat::Json => serde_json::from_str(&file.content)
                .map_err(|e| SchemaError::syntax(file.path.clone(), e.to_string()))?,
        };

        manifest
            .types
            .into_iter()
            .map(|decl| {
                let name = qualify(&decl).ok_or_else(|| {
                    SchemaError::declaration(file.path.clone(), "type with an empty name")
                })?;
                if let Some(field) = decl.fields.iter().find(|f| f.name.trim().is_empty()) {
                    return Err(SchemaError::declaration(
                        file.path.clone(),
                        format!("type '{}' has a field of type '{}' without a name", name, field.ty),
                    ));
                }
                Ok(DeclaredType {
                    name,
                    decl,
                    source: file.path.clone(),
                })
            })
            .collect()
    }

    /// Parse several manifests, collecting errors.
    pub fn parse_files(&self, files: &[ManifestFile]) -> (Vec<DeclaredType>, Vec<SchemaError>) {
        let mut types = Vec::new();
        let mut errors = Vec::new();

        for file in files {
            match self.parse_manifest(file) {
                Ok(parsed) => types.extend(parsed),
                Err(e) => errors.push(e),
            }
        }

        (types, errors)
    }

    /// Resolve declarations into the catalog of one generation pass.
    pub fn resolve(&self, types: &[DeclaredType]) -> Result<TargetCatalog, SchemaError> {
        let selected: Vec<(&DeclaredType, BTreeSet<Annotation>)> = types
            .iter()
            .filter_map(|declared| {
                let annotations = declared.annotations();
                let has = |a: Annotation| annotations.contains(&a);
                let is_target = has(Annotation::ToString)
                    || has(Annotation::Data)
                    || has(Annotation::Value)
                    || has(Annotation::EqualsAndHashCode);
                if !is_target {
                    debug!(target_type = %declared.name, "not a target, skipping");
                    return None;
                }
                if declared.decl.visibility == Visibility::Private {
                    warn!(
                        target_type = %declared.name,
                        source = %declared.source.display(),
                        "private type cannot be reached from a generated suite, skipping"
                    );
                    return None;
                }
                Some((declared, annotations))
            })
            .collect();

        let known: HashMap<String, QualifiedName> = selected
            .iter()
            .map(|(declared, _)| (declared.name.to_string(), declared.name.clone()))
            .collect();

        let targets = selected
            .iter()
            .map(|(declared, annotations)| build_target(declared, annotations, &known))
            .collect();

        Ok(TargetCatalog::new(targets)?)
    }
}

fn qualify(decl: &TypeDecl) -> Option<QualifiedName> {
    let name = decl.name.trim();
    if name.is_empty() {
        return None;
    }
    Some(match &decl.package {
        Some(package) => QualifiedName::new(package.trim(), name),
        None => QualifiedName::parse(name),
    })
}

fn build_target(
    declared: &DeclaredType,
    annotations: &BTreeSet<Annotation>,
    known: &HashMap<String, QualifiedName>,
) -> TargetType {
    let has = |a: Annotation| annotations.contains(&a);
    let decl = &declared.decl;

    let wants_to_string = has(Annotation::ToString) || has(Annotation::Data) || has(Annotation::Value);
    let wants_equality =
        has(Annotation::EqualsAndHashCode) || has(Annotation::Data) || has(Annotation::Value);

    let construction = decl.construction.unwrap_or_else(|| {
        let fill = has(Annotation::Value)
            || (has(Annotation::AllArgsConstructor) && !has(Annotation::NoArgsConstructor));
        if fill {
            ConstructionStrategy::FillConstructor
        } else {
            ConstructionStrategy::DefaultConstructThenSet
        }
    });

    let fields: Vec<FieldDescriptor> = decl
        .fields
        .iter()
        .filter(|f| !f.is_static)
        .map(|f| FieldDescriptor::new(f.name.trim(), resolve_kind(&f.ty, &declared.name, known)))
        .collect();

    let equality = equality_filter(declared, &fields);

    let mut target = TargetType::new(declared.name.clone())
        .with_construction(construction)
        .with_equality(equality)
        .with_contracts(wants_to_string, wants_equality);
    target.fields = fields;
    target
}

fn equality_filter(declared: &DeclaredType, fields: &[FieldDescriptor]) -> EqualityFilter {
    let Some(decl) = &declared.decl.equals_and_hash_code else {
        return EqualityFilter::All;
    };

    let filter = if !decl.of.is_empty() {
        EqualityFilter::include_only(decl.of.iter().map(|s| s.trim()))
    } else if !decl.exclude.is_empty() {
        EqualityFilter::exclude_only(decl.exclude.iter().map(|s| s.trim()))
    } else {
        EqualityFilter::All
    };

    for named in filter.named_fields() {
        if !fields.iter().any(|f| f.name == named) {
            warn!(
                target_type = %declared.name,
                field = %named,
                "equality filter names a field the type does not declare"
            );
        }
    }
    filter
}

/// Map a declared Java type name to a field kind.
///
/// Generic arguments are ignored. A name matching another target, fully
/// qualified or relative to the enclosing package, becomes a composite kind.
pub fn resolve_kind(
    type_name: &str,
    enclosing: &QualifiedName,
    known: &HashMap<String, QualifiedName>,
) -> TypeKind {
    let raw = type_name.trim();
    let base = raw.split('<').next().unwrap_or(raw).trim();

    match base {
        "String" | "java.lang.String" => return TypeKind::String,
        "int" => return TypeKind::Integer32,
        "long" => return TypeKind::Integer64,
        "Integer" | "java.lang.Integer" => return TypeKind::BoxedInteger32,
        "Long" | "java.lang.Long" => return TypeKind::BoxedInteger64,
        "Date" | "java.util.Date" => return TypeKind::Instant,
        "LocalDate" | "java.time.LocalDate" => return TypeKind::CalendarDate,
        "LocalTime" | "java.time.LocalTime" => return TypeKind::WallClockTime,
        "LocalDateTime" | "java.time.LocalDateTime" => return TypeKind::DateTime,
        "List" | "java.util.List" => return TypeKind::List,
        "Set" | "java.util.Set" => return TypeKind::Set,
        "Map" | "java.util.Map" => return TypeKind::Map,
        _ => {}
    }

    if let Some(name) = known.get(base) {
        return TypeKind::composite(name.clone());
    }
    if !enclosing.package.is_empty() {
        if let Some(name) = known.get(&format!("{}.{}", enclosing.package, base)) {
            return TypeKind::composite(name.clone());
        }
    }

    debug!(target_type = %enclosing, type_name = %raw, "unsupported field type");
    TypeKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(content: &str) -> ManifestFile {
        ManifestFile {
            path: PathBuf::from("test.beancheck.toml"),
            relative_path: PathBuf::from("test.beancheck.toml"),
            format: ManifestFormat::Toml,
            content: content.to_string(),
        }
    }

    fn resolve(content: &str) -> TargetCatalog {
        let reader = SchemaReader::new();
        let types = reader.parse_manifest(&manifest(content)).unwrap();
        reader.resolve(&types).unwrap()
    }

    fn name(s: &str) -> QualifiedName {
        QualifiedName::parse(s)
    }

    #[test]
    fn test_annotation_parse() {
        assert_eq!(Annotation::parse("Data"), Some(Annotation::Data));
        assert_eq!(Annotation::parse("@Value"), Some(Annotation::Value));
        assert_eq!(
            Annotation::parse("lombok.AllArgsConstructor"),
            Some(Annotation::AllArgsConstructor)
        );
        assert_eq!(Annotation::parse("Getter"), None);
    }

    #[test]
    fn test_data_class() {
        let catalog = resolve(
            r#"
[[types]]
name = "sample.MyData"
annotations = ["Data"]

[[types.fields]]
name = "name"
type = "String"

[[types.fields]]
name = "n"
type = "int"

[[types.fields]]
name = "list"
type = "List<String>"

[[types.fields]]
name = "INSTANCES"
type = "int"
static = true
"#,
        );

        let target = catalog.get(&name("sample.MyData")).unwrap();
        assert!(target.wants_to_string);
        assert!(target.wants_equality);
        assert_eq!(target.construction, ConstructionStrategy::DefaultConstructThenSet);
        assert_eq!(target.equality, EqualityFilter::All);
        let kinds: Vec<_> = target.fields.iter().map(|f| f.kind.clone()).collect();
        assert_eq!(kinds, vec![TypeKind::String, TypeKind::Integer32, TypeKind::List]);
    }

    #[test]
    fn test_construction_rules() {
        let catalog = resolve(
            r#"
[[types]]
name = "p.Immutable"
annotations = ["Value"]

[[types]]
name = "p.AllArgs"
annotations = ["Data", "AllArgsConstructor"]

[[types]]
name = "p.Both"
annotations = ["Data", "AllArgsConstructor", "NoArgsConstructor"]

[[types]]
name = "p.Forced"
annotations = ["Data"]
construction = "fill-constructor"
"#,
        );

        let strategy = |n: &str| catalog.get(&name(n)).unwrap().construction;
        assert_eq!(strategy("p.Immutable"), ConstructionStrategy::FillConstructor);
        assert_eq!(strategy("p.AllArgs"), ConstructionStrategy::FillConstructor);
        assert_eq!(strategy("p.Both"), ConstructionStrategy::DefaultConstructThenSet);
        assert_eq!(strategy("p.Forced"), ConstructionStrategy::FillConstructor);
    }

    #[test]
    fn test_contract_flags_and_filters() {
        let catalog = resolve(
            r#"
[[types]]
name = "p.OnlyText"
annotations = ["ToString"]

[[types]]
name = "p.HashEq"
equals_and_hash_code = { of = ["name"] }
fields = [{ name = "name", type = "String" }, { name = "ignore", type = "String" }]

[[types]]
name = "p.Excluding"
annotations = ["Data"]
equals_and_hash_code = { exclude = ["cache"] }

[[types]]
name = "p.Plain"
annotations = ["Getter"]
"#,
        );

        assert_eq!(catalog.len(), 3);
        assert!(!catalog.contains(&name("p.Plain")));

        let only_text = catalog.get(&name("p.OnlyText")).unwrap();
        assert!(only_text.wants_to_string && !only_text.wants_equality);

        let hash_eq = catalog.get(&name("p.HashEq")).unwrap();
        assert!(!hash_eq.wants_to_string && hash_eq.wants_equality);
        assert_eq!(hash_eq.equality, EqualityFilter::include_only(["name"]));

        let excluding = catalog.get(&name("p.Excluding")).unwrap();
        assert_eq!(excluding.equality, EqualityFilter::exclude_only(["cache"]));
    }

    #[test]
    fn test_nested_and_private_types() {
        let catalog = resolve(
            r#"
[[types]]
package = "sample"
name = "MyEnclosing.MyPrivateEnclosed"
visibility = "private"
annotations = ["Data"]

[[types]]
package = "sample"
name = "MyEnclosing.MyEnclosed"
annotations = ["Data"]
fields = [{ name = "str", type = "String" }]
"#,
        );

        assert_eq!(catalog.len(), 1);
        let target = catalog.iter().next().unwrap();
        assert_eq!(target.name.package, "sample");
        assert_eq!(target.name.name, "MyEnclosing.MyEnclosed");
    }

    #[test]
    fn test_composite_resolution() {
        let catalog = resolve(
            r#"
[[types]]
name = "shop.Order"
annotations = ["Data"]
fields = [
    { name = "customer", type = "Customer" },
    { name = "address", type = "shop.geo.Address" },
    { name = "payload", type = "byte[]" },
]

[[types]]
name = "shop.Customer"
annotations = ["Data"]

[[types]]
name = "shop.geo.Address"
annotations = ["Value"]
"#,
        );

        let order = catalog.get(&name("shop.Order")).unwrap();
        assert_eq!(
            order.fields[0].kind,
            TypeKind::composite(name("shop.Customer"))
        );
        assert_eq!(
            order.fields[1].kind,
            TypeKind::composite(name("shop.geo.Address"))
        );
        assert_eq!(order.fields[2].kind, TypeKind::Unknown);
    }

    #[test]
    fn test_resolve_kind_mapping() {
        let known = HashMap::new();
        let owner = name("p.T");
        let cases = [
            ("java.lang.String", TypeKind::String),
            ("long", TypeKind::Integer64),
            ("Integer", TypeKind::BoxedInteger32),
            ("java.lang.Long", TypeKind::BoxedInteger64),
            ("java.util.Date", TypeKind::Instant),
            ("LocalDate", TypeKind::CalendarDate),
            ("java.time.LocalTime", TypeKind::WallClockTime),
            ("LocalDateTime", TypeKind::DateTime),
            ("Set<Integer>", TypeKind::Set),
            ("java.util.Map<String, String>", TypeKind::Map),
            ("BigDecimal", TypeKind::Unknown),
        ];
        for (type_name, expected) in cases {
            assert_eq!(resolve_kind(type_name, &owner, &known), expected, "{}", type_name);
        }
    }

    #[test]
    fn test_json_manifest() {
        let file = ManifestFile {
            path: PathBuf::from("types.beancheck.json"),
            relative_path: PathBuf::from("types.beancheck.json"),
            format: ManifestFormat::Json,
            content: r#"{"types": [{"name": "p.J", "annotations": ["Data"],
                "fields": [{"name": "when", "type": "LocalDateTime"}]}]}"#
                .to_string(),
        };
        let reader = SchemaReader::new();
        let types = reader.parse_manifest(&file).unwrap();
        let catalog = reader.resolve(&types).unwrap();
        assert_eq!(
            catalog.get(&name("p.J")).unwrap().fields[0].kind,
            TypeKind::DateTime
        );
    }

    #[test]
    fn test_errors_are_collected() {
        let reader = SchemaReader::new();
        let files = vec![
            manifest("[[types]\nname ="),
            manifest("[[types]]\nname = \"p.Ok\"\nannotations = [\"Data\"]\n"),
            manifest("[[types]]\nname = \"  \"\n"),
        ];
        let (types, errors) = reader.parse_files(&files);
        assert_eq!(types.len(), 1);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], SchemaError::Syntax { .. }));
        assert!(matches!(errors[1], SchemaError::Declaration { .. }));
        assert!(errors[0]
            .to_string()
            .starts_with("Invalid manifest test.beancheck.toml"));
    }

    #[test]
    fn test_duplicate_targets_are_rejected() {
        let reader = SchemaReader::new();
        let content = "[[types]]\nname = \"p.A\"\nannotations = [\"Data\"]\n";
        let mut types = reader.parse_manifest(&manifest(content)).unwrap();
        types.extend(reader.parse_manifest(&manifest(content)).unwrap());

        let err = reader.resolve(&types).unwrap_err();
        assert!(matches!(err, SchemaError::Catalog(_)));
    }
}
