//! Target types and the catalog of one generation pass.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::CatalogError;
use crate::model::graph::CompositeGraph;
use crate::model::types::{FieldDescriptor, QualifiedName, TypeKind};

/// How an instance of a target type is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstructionStrategy {
    /// One constructor call taking every field in declared order.
    FillConstructor,

    /// No-argument constructor followed by one setter call per field.
    #[default]
    DefaultConstructThenSet,
}

/// Which fields take part in equality and hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "fields", rename_all = "kebab-case")]
pub enum EqualityFilter {
    /// Every field participates.
    #[default]
    All,

    /// Only the named fields participate.
    IncludeOnly(BTreeSet<String>),

    /// Every field except the named ones participates.
    ExcludeOnly(BTreeSet<String>),
}

impl EqualityFilter {
    /// Filter admitting only the given fields.
    pub fn include_only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EqualityFilter::IncludeOnly(names.into_iter().map(Into::into).collect())
    }

    /// Filter admitting every field except the given ones.
    pub fn exclude_only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EqualityFilter::ExcludeOnly(names.into_iter().map(Into::into).collect())
    }

    /// Whether `field` participates in equality.
    pub fn admits(&self, field: &str) -> bool {
        match self {
            EqualityFilter::All => true,
            EqualityFilter::IncludeOnly(names) => names.contains(field),
            EqualityFilter::ExcludeOnly(names) => !names.contains(field),
        }
    }

    /// Field names the filter mentions explicitly.
    pub fn named_fields(&self) -> impl Iterator<Item = &str> {
        let names = match self {
            EqualityFilter::All => None,
            EqualityFilter::IncludeOnly(names) | EqualityFilter::ExcludeOnly(names) => Some(names),
        };
        names.into_iter().flatten().map(String::as_str)
    }
}

/// A data-holder type selected for generated contract tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetType {
    /// Qualified name of the type.
    pub name: QualifiedName,

    /// Fields in declared order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,

    /// Construction discipline.
    #[serde(default)]
    pub construction: ConstructionStrategy,

    /// Equality-relevant field filter.
    #[serde(default)]
    pub equality: EqualityFilter,

    /// Whether a toString test is wanted.
    #[serde(default)]
    pub wants_to_string: bool,

    /// Whether equals and hashCode tests are wanted.
    #[serde(default)]
    pub wants_equality: bool,
}

impl TargetType {
    /// Create a target with no fields that wants every contract tested.
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            fields: Vec::new(),
            construction: ConstructionStrategy::default(),
            equality: EqualityFilter::default(),
            wants_to_string: true,
            wants_equality: true,
        }
    }

    /// Append a field.
    pub fn with_field(mut self, name: impl Into<String>, kind: TypeKind) -> Self {
        self.fields.push(FieldDescriptor::new(name, kind));
        self
    }

    /// Set the construction discipline.
    pub fn with_construction(mut self, construction: ConstructionStrategy) -> Self {
        self.construction = construction;
        self
    }

    /// Set the equality filter.
    pub fn with_equality(mut self, equality: EqualityFilter) -> Self {
        self.equality = equality;
        self
    }

    /// Set which contracts are wanted.
    pub fn with_contracts(mut self, to_string: bool, equality: bool) -> Self {
        self.wants_to_string = to_string;
        self.wants_equality = equality;
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields admitted by the equality filter.
    pub fn equality_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| self.equality.admits(&f.name))
    }

    /// Target types referenced by composite fields.
    pub fn composite_dependencies(&self) -> impl Iterator<Item = &QualifiedName> {
        self.fields.iter().filter_map(|f| f.kind.target())
    }
}

/// Read-only set of target types for one generation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<TargetType>", into = "Vec<TargetType>")]
pub struct TargetCatalog {
    targets: Vec<TargetType>,
    index: HashMap<QualifiedName, usize>,
    graph: CompositeGraph,
}

impl TargetCatalog {
    /// Build a catalog, rejecting duplicate targets and duplicate fields.
    pub fn new(targets: Vec<TargetType>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(targets.len());

        for (position, target) in targets.iter().enumerate() {
            if index.insert(target.name.clone(), position).is_some() {
                return Err(CatalogError::duplicate_target(target.name.clone()));
            }

            let mut seen = BTreeSet::new();
            for field in &target.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(CatalogError::duplicate_field(
                        target.name.clone(),
                        &field.name,
                    ));
                }
            }
        }

        let graph = CompositeGraph::build(&targets);

        Ok(Self {
            targets,
            index,
            graph,
        })
    }

    /// Look up a target by name.
    pub fn get(&self, name: &QualifiedName) -> Option<&TargetType> {
        self.index.get(name).map(|&i| &self.targets[i])
    }

    /// Check whether a type is a target.
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.index.contains_key(name)
    }

    /// Targets in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, TargetType> {
        self.targets.iter()
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Whether a composite field of type `to` inside `from` closes a cycle.
    ///
    /// True when `to` is `from` itself or reaches `from` through composite
    /// fields. Such fields are never materialized.
    pub fn is_cyclic_edge(&self, from: &QualifiedName, to: &QualifiedName) -> bool {
        self.graph.same_component(from, to)
    }

    /// Groups of targets that reach each other through composite fields.
    pub fn cycles(&self) -> Vec<Vec<QualifiedName>> {
        self.graph.cyclic_components()
    }
}

impl<'a> IntoIterator for &'a TargetCatalog {
    type Item = &'a TargetType;
    type IntoIter = std::slice::Iter<'a, TargetType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<Vec<TargetType>> for TargetCatalog {
    type Error = CatalogError;

    fn try_from(targets: Vec<TargetType>) -> Result<Self, Self::Error> {
        Self::new(targets)
    }
}

impl From<TargetCatalog> for Vec<TargetType> {
    fn from(catalog: TargetCatalog) -> Self {
        catalog.targets
    }
}
