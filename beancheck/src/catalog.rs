//! Value catalog: representative sample values per field kind.
//!
//! Candidate lists are ordered. The first entry is the baseline, later
//! non-absent entries are observably distinct alternates, and the last entry
//! is conventionally the absent sentinel when the kind is nullable.
//! Values that need a helper procedure are returned as [`FactoryKey`]s; the
//! [`FactoryRegistry`](crate::registry::FactoryRegistry) materializes them only
//! when a construction actually references them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{
    CollectionKind, EqualityFilter, QualifiedName, TargetCatalog, TargetType, TemporalKind,
    TypeKind,
};

/// Variant index of the baseline instance of a helper-backed value.
pub const PRIMARY_VARIANT: u8 = 1;

/// Variant index of the alternate instance of a helper-backed value.
pub const ALTERNATE_VARIANT: u8 = 2;

/// How a sample value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Quoted string literal.
    Quoted,
    /// Raw literal.
    Raw,
    /// Call of a helper procedure.
    Call,
    /// The absent literal.
    Null,
}

/// What a helper factory produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FactorySubject {
    Temporal(TemporalKind),
    Collection(CollectionKind),
    Target(QualifiedName),
}

/// Identity of a helper factory within one suite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactoryKey {
    pub subject: FactorySubject,
    pub variant: u8,
}

impl FactoryKey {
    /// Temporal helper of the given variant.
    pub fn temporal(kind: TemporalKind, variant: u8) -> Self {
        Self {
            subject: FactorySubject::Temporal(kind),
            variant,
        }
    }

    /// Empty-collection helper.
    pub fn collection(kind: CollectionKind) -> Self {
        Self {
            subject: FactorySubject::Collection(kind),
            variant: PRIMARY_VARIANT,
        }
    }

    /// Helper building an instance of another target.
    pub fn target(name: QualifiedName, variant: u8) -> Self {
        Self {
            subject: FactorySubject::Target(name),
            variant,
        }
    }
}

/// Candidate value for one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleValue {
    Text(String),
    Int32(i32),
    Int64(i64),
    Factory(FactoryKey),
    Absent,
}

impl SampleValue {
    /// Rendering placeholder for this value.
    pub fn placeholder(&self) -> Placeholder {
        match self {
            SampleValue::Text(_) => Placeholder::Quoted,
            SampleValue::Int32(_) | SampleValue::Int64(_) => Placeholder::Raw,
            SampleValue::Factory(_) => Placeholder::Call,
            SampleValue::Absent => Placeholder::Null,
        }
    }

    /// Check whether this is the absent sentinel.
    pub fn is_absent(&self) -> bool {
        matches!(self, SampleValue::Absent)
    }

    /// Helper key, for factory-backed values.
    pub fn factory_key(&self) -> Option<&FactoryKey> {
        match self {
            SampleValue::Factory(key) => Some(key),
            _ => None,
        }
    }
}

/// How many distinguishable instances a composite field can draw on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeSupport {
    /// Unknown type, or a field that would recurse into its own cycle.
    Unavailable,
    /// One instance; both variants would compare equal.
    Single,
    /// Two instances that differ under the type's own equality rule.
    Pair,
}

/// Ordered candidate list of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCandidates {
    /// Field name.
    pub name: String,
    values: Vec<SampleValue>,
}

impl FieldCandidates {
    /// Create a candidate list; an empty list collapses to the absent value.
    pub fn new(name: impl Into<String>, mut values: Vec<SampleValue>) -> Self {
        if values.is_empty() {
            values.push(SampleValue::Absent);
        }
        Self {
            name: name.into(),
            values,
        }
    }

    /// All candidates in order.
    pub fn values(&self) -> &[SampleValue] {
        &self.values
    }

    /// Baseline candidate.
    pub fn first(&self) -> &SampleValue {
        &self.values[0]
    }

    /// Last candidate (the absent sentinel for nullable kinds).
    pub fn last(&self) -> &SampleValue {
        &self.values[self.values.len() - 1]
    }

    /// Second candidate, or the baseline if there is none.
    pub fn alternate(&self) -> &SampleValue {
        self.values.get(1).unwrap_or(&self.values[0])
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Never true: a list holds at least the absent value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether this field can vary between assignments.
    pub fn discriminates(&self) -> bool {
        self.values.len() > 1
    }

    /// Truncate to the baseline when the filter excludes this field.
    pub fn restrict(mut self, filter: &EqualityFilter) -> Self {
        if !filter.admits(&self.name) {
            self.values.truncate(1);
        }
        self
    }
}

/// Candidate values for a field of the given kind.
///
/// `enclosing` is the type declaring the field; composite fields that would
/// close a cycle through it get only the absent value.
pub fn candidates_for(
    kind: &TypeKind,
    field_name: &str,
    enclosing: &QualifiedName,
    targets: &TargetCatalog,
) -> Vec<SampleValue> {
    match kind {
        TypeKind::String => vec![
            SampleValue::Text(format!("{}{}", field_name, 1)),
            SampleValue::Text(format!("{}{}", field_name, 2)),
            SampleValue::Absent,
        ],
        TypeKind::Integer32 => vec![SampleValue::Int32(1), SampleValue::Int32(2)],
        TypeKind::Integer64 => vec![SampleValue::Int64(1), SampleValue::Int64(2)],
        TypeKind::BoxedInteger32 => vec![
            SampleValue::Int32(1),
            SampleValue::Int32(2),
            SampleValue::Absent,
        ],
        TypeKind::BoxedInteger64 => vec![
            SampleValue::Int64(1),
            SampleValue::Int64(2),
            SampleValue::Absent,
        ],
        TypeKind::Composite(dependency) => {
            match composite_support(enclosing, dependency, targets) {
                CompositeSupport::Pair => vec![
                    SampleValue::Factory(FactoryKey::target(dependency.clone(), PRIMARY_VARIANT)),
                    SampleValue::Factory(FactoryKey::target(
                        dependency.clone(),
                        ALTERNATE_VARIANT,
                    )),
                    SampleValue::Absent,
                ],
                CompositeSupport::Single => vec![
                    SampleValue::Factory(FactoryKey::target(dependency.clone(), PRIMARY_VARIANT)),
                    SampleValue::Absent,
                ],
                CompositeSupport::Unavailable => vec![SampleValue::Absent],
            }
        }
        TypeKind::Unknown => {
            debug!(
                target_type = %enclosing,
                field = %field_name,
                "no sample values for field kind, using absent only"
            );
            vec![SampleValue::Absent]
        }
        other => match (other.temporal(), other.collection()) {
            (Some(temporal), _) => vec![
                SampleValue::Factory(FactoryKey::temporal(temporal, PRIMARY_VARIANT)),
                SampleValue::Factory(FactoryKey::temporal(temporal, ALTERNATE_VARIANT)),
                SampleValue::Absent,
            ],
            (None, Some(collection)) => vec![
                SampleValue::Factory(FactoryKey::collection(collection)),
                SampleValue::Absent,
            ],
            (None, None) => vec![SampleValue::Absent],
        },
    }
}

/// Decide how a composite field of type `dependency` inside `enclosing` can vary.
pub fn composite_support(
    enclosing: &QualifiedName,
    dependency: &QualifiedName,
    targets: &TargetCatalog,
) -> CompositeSupport {
    let Some(target) = targets.get(dependency) else {
        debug!(
            target_type = %enclosing,
            dependency = %dependency,
            "composite field references a type outside the catalog"
        );
        return CompositeSupport::Unavailable;
    };

    if targets.is_cyclic_edge(enclosing, dependency) {
        debug!(
            target_type = %enclosing,
            dependency = %dependency,
            "composite field closes a cycle, using absent only"
        );
        return CompositeSupport::Unavailable;
    }

    // Without value equality two separately built instances never compare
    // equal, so the enclosing diagonal could not hold.
    if !target.wants_equality {
        debug!(
            target_type = %enclosing,
            dependency = %dependency,
            "composite type has no equality contract, using absent only"
        );
        return CompositeSupport::Unavailable;
    }

    // The alternate variant switches every admitted field to its second
    // candidate, so one admitted field with two candidates is enough.
    let varies = target.equality_fields().any(|field| match &field.kind {
        TypeKind::Unknown => false,
        TypeKind::Composite(inner) => {
            targets.get(inner).is_some_and(|t| t.wants_equality)
                && !targets.is_cyclic_edge(dependency, inner)
        }
        _ => true,
    });

    if varies {
        CompositeSupport::Pair
    } else {
        CompositeSupport::Single
    }
}

/// Candidate lists of every field, in declared order, unfiltered.
pub fn field_candidates(target: &TargetType, targets: &TargetCatalog) -> Vec<FieldCandidates> {
    target
        .fields
        .iter()
        .map(|field| {
            FieldCandidates::new(
                &field.name,
                candidates_for(&field.kind, &field.name, &target.name, targets),
            )
        })
        .collect()
}

/// Candidate lists with equality-excluded fields collapsed to their baseline.
pub fn restricted_candidates(target: &TargetType, targets: &TargetCatalog) -> Vec<FieldCandidates> {
    field_candidates(target, targets)
        .into_iter()
        .map(|candidates| candidates.restrict(&target.equality))
        .collect()
}
