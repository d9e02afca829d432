//! Factory Registry for helper procedures of one suite.
//!
//! The registry memoizes helper factories by [`FactoryKey`]. A factory is
//! synthesized the first time a construction references its key, so a suite
//! carries exactly the helpers it uses. Target-backed factories recurse into
//! the construction strategy; an in-progress stack stops any recursion that
//! would revisit a type already being built.

use chrono::{DateTime, Datelike, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::catalog::{restricted_candidates, FactoryKey, FactorySubject};
use crate::combination::{threshold_assignment, variant_threshold};
use crate::construction::build_instance;
use crate::error::{GenerateError, GenerateResult};
use crate::ir::{Expr, Procedure, Statement, TemporalValue, TypeRef};
use crate::model::{QualifiedName, TargetCatalog, TemporalKind};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Seconds each variant step adds to a time of day.
const SECONDS_PER_VARIANT: u32 = 1000;

/// Local variable a target factory builds into.
const FACTORY_BINDING: &str = "obj";

/// Instant that temporal helper values are offset from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalAnchor {
    instant: DateTime<Utc>,
}

impl TemporalAnchor {
    /// Anchor at the current time.
    pub fn now() -> Self {
        Self {
            instant: Utc::now(),
        }
    }

    /// Anchor at a fixed instant, for reproducible output.
    pub fn fixed(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Parse `now` or an RFC 3339 timestamp.
    pub fn parse(value: &str) -> Result<Self, chrono::ParseError> {
        if value.trim().eq_ignore_ascii_case("now") {
            return Ok(Self::now());
        }
        let instant = DateTime::parse_from_rfc3339(value.trim())?.with_timezone(&Utc);
        Ok(Self::fixed(instant))
    }

    /// The anchor instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Value of the given temporal kind for a factory variant.
    pub fn value_for(&self, kind: TemporalKind, variant: u8) -> TemporalValue {
        let step = i64::from(variant);
        let epoch_day =
            i64::from(self.instant.date_naive().num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE;
        let second_of_day = (u32::from(variant) * SECONDS_PER_VARIANT) % 86_400;

        match kind {
            TemporalKind::Instant => TemporalValue::Instant {
                epoch_millis: self.instant.timestamp_millis() + step * 1000,
            },
            TemporalKind::CalendarDate => TemporalValue::CalendarDate {
                epoch_day: epoch_day + step,
            },
            TemporalKind::WallClockTime => TemporalValue::WallClockTime { second_of_day },
            TemporalKind::DateTime => TemporalValue::DateTime {
                epoch_day: epoch_day + step,
                second_of_day,
            },
        }
    }
}

impl Default for TemporalAnchor {
    fn default() -> Self {
        Self::now()
    }
}

/// A generated zero-argument helper procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperFactory {
    /// Identity of the factory.
    pub key: FactoryKey,

    /// Procedure name, unique within the suite.
    pub name: String,

    /// Type of the returned value.
    pub returns: TypeRef,

    /// Body statements, ending with a return.
    pub body: Vec<Statement>,
}

impl HelperFactory {
    /// Convert into a helper procedure.
    pub fn into_procedure(self) -> Procedure {
        Procedure::helper(self.name, self.returns, self.body)
    }
}

/// Memoizing registry of helper factories, scoped to one suite.
#[derive(Debug)]
pub struct FactoryRegistry<'a> {
    /// Target types of the pass.
    targets: &'a TargetCatalog,

    /// Anchor for temporal helpers.
    anchor: TemporalAnchor,

    /// Factories in completion order.
    built: Vec<HelperFactory>,

    /// Key -> position in `built`.
    index: HashMap<FactoryKey, usize>,

    /// Procedure names handed out so far.
    names: HashSet<String>,

    /// Target types currently under construction, outermost first.
    in_progress: Vec<QualifiedName>,
}

impl<'a> FactoryRegistry<'a> {
    /// Create an empty registry for the suite of `root`.
    ///
    /// `root` counts as under construction for the whole lifetime of the
    /// registry, so no helper ever builds the suite's own type.
    pub fn new(targets: &'a TargetCatalog, anchor: TemporalAnchor, root: QualifiedName) -> Self {
        Self {
            targets,
            anchor,
            built: Vec::new(),
            index: HashMap::new(),
            names: HashSet::new(),
            in_progress: vec![root],
        }
    }

    /// Target types of the pass.
    pub fn targets(&self) -> &'a TargetCatalog {
        self.targets
    }

    /// Get the factory for `key`, synthesizing it on first request.
    ///
    /// Returns `None` when building it would revisit a type that is already
    /// under construction.
    pub fn get(&mut self, key: &FactoryKey) -> GenerateResult<Option<&HelperFactory>> {
        let position = self.ensure(key)?;
        Ok(position.map(|i| &self.built[i]))
    }

    /// Expression that yields the value of `key`: a helper call, or the
    /// absent value when the cycle guard trips.
    pub fn call(&mut self, key: &FactoryKey) -> GenerateResult<Expr> {
        match self.get(key)? {
            Some(factory) => Ok(Expr::Call(factory.name.clone())),
            None => Ok(Expr::Absent),
        }
    }

    /// Whether a factory for `key` has been synthesized.
    pub fn contains(&self, key: &FactoryKey) -> bool {
        self.index.contains_key(key)
    }

    /// Number of synthesized factories.
    pub fn len(&self) -> usize {
        self.built.len()
    }

    /// Check if no factory has been synthesized yet.
    pub fn is_empty(&self) -> bool {
        self.built.is_empty()
    }

    /// Synthesized factories in completion order.
    pub fn factories(&self) -> &[HelperFactory] {
        &self.built
    }

    /// Consume the registry, yielding helper procedures with dependencies
    /// before their dependents.
    pub fn into_helpers(self) -> Vec<Procedure> {
        self.built
            .into_iter()
            .map(HelperFactory::into_procedure)
            .collect()
    }

    fn ensure(&mut self, key: &FactoryKey) -> GenerateResult<Option<usize>> {
        if let Some(&position) = self.index.get(key) {
            return Ok(Some(position));
        }

        let (returns, body, base) = match &key.subject {
            FactorySubject::Temporal(kind) => {
                let value = self.anchor.value_for(*kind, key.variant);
                (
                    TypeRef::Temporal(*kind),
                    vec![Statement::Return(Expr::Temporal(value))],
                    format!("create{}{}", kind.label(), key.variant),
                )
            }
            FactorySubject::Collection(kind) => (
                TypeRef::Collection(*kind),
                vec![Statement::Return(Expr::EmptyCollection(*kind))],
                format!("create{}", kind.label()),
            ),
            FactorySubject::Target(name) => {
                let Some(body) = self.build_target(name, key.variant)? else {
                    return Ok(None);
                };
                (
                    TypeRef::Target(name.clone()),
                    body,
                    format!("create{}{}", name.simple_name(), key.variant),
                )
            }
        };

        let name = self.unique_name(base);
        debug!(factory = %name, variant = key.variant, "synthesized helper factory");

        let position = self.built.len();
        self.built.push(HelperFactory {
            key: key.clone(),
            name,
            returns,
            body,
        });
        self.index.insert(key.clone(), position);
        Ok(Some(position))
    }

    fn build_target(
        &mut self,
        name: &QualifiedName,
        variant: u8,
    ) -> GenerateResult<Option<Vec<Statement>>> {
        if self.in_progress.contains(name) {
            warn!(
                target_type = %name,
                chain = ?self.in_progress.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "recursive construction detected, using absent value"
            );
            return Ok(None);
        }

        let targets = self.targets;
        let target = targets
            .get(name)
            .ok_or_else(|| GenerateError::unknown_target(name.clone()))?;

        let fields = restricted_candidates(target, targets);
        let assignment = threshold_assignment(&fields, variant_threshold(variant));

        self.in_progress.push(name.clone());
        let built = build_instance(target, FACTORY_BINDING, &assignment, self);
        self.in_progress.pop();

        let mut body = vec![Statement::Declare {
            ty: TypeRef::Target(name.clone()),
            name: FACTORY_BINDING.to_string(),
        }];
        body.extend(built?);
        body.push(Statement::Return(Expr::var(FACTORY_BINDING)));
        Ok(Some(body))
    }

    fn unique_name(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut suffix = 2;
        while self.names.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        self.names.insert(candidate.clone());
        candidate
    }
}
